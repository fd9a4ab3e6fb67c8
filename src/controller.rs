//! Session controller: turns timeline actions into side effects.
//!
//! The event loop only forwards ticks and signals here and obeys the
//! returned [`Directive`]; sound playback and PID file cleanup happen inside.

use tracing::{debug, info, warn};

use crate::audio::AudioError;
use crate::params::SessionConfig;
use crate::pidfile::PidFile;
use crate::session::{RenderState, TickAction, Timeline};

/// Something that can play the completion sound
pub trait CompletionSound {
    fn play(&mut self) -> Result<(), AudioError>;
}

/// What the event loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// Repaint the scene for this state, then present
    Repaint(RenderState),
    /// Scene is frozen; present again at the current opacity
    Present,
    /// Leave the event loop
    Exit,
}

pub struct Controller<S> {
    config: SessionConfig,
    timeline: Timeline,
    sound: S,
    pid_file: PidFile,
    shut_down: bool,
}

impl<S: CompletionSound> Controller<S> {
    pub fn new(config: SessionConfig, sound: S, pid_file: PidFile) -> Self {
        Self {
            timeline: Timeline::new(config.clone()),
            config,
            sound,
            pid_file,
            shut_down: false,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn render_state(&self, elapsed: f64) -> RenderState {
        RenderState::at(elapsed, self.config.duration_secs)
    }

    pub fn window_opacity(&self, elapsed: f64) -> f32 {
        self.timeline.window_opacity(elapsed)
    }

    /// Advance to `elapsed` seconds and run the resulting side effect
    pub fn tick(&mut self, elapsed: f64) -> Directive {
        if self.shut_down {
            return Directive::Exit;
        }

        match self.timeline.advance(elapsed) {
            TickAction::PlayBowl => {
                info!("Session complete");
                // Playback failure never holds up the timeline
                if let Err(e) = self.sound.play() {
                    warn!("Bowl playback failed: {}", e);
                }
            }
            TickAction::BeginFade => info!("Fading out"),
            TickAction::Exit => {
                self.shutdown();
                return Directive::Exit;
            }
            TickAction::Continue => {}
        }

        if self.timeline.is_fading() {
            Directive::Present
        } else {
            Directive::Repaint(self.render_state(elapsed))
        }
    }

    /// Release the PID file; safe to call more than once
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if let Err(e) = self.pid_file.remove() {
            debug!("Could not remove PID file: {}", e);
        }
    }
}
