//! Session clock and the completion/fade phase machine.
//!
//! Everything here works on elapsed seconds since the session started, so the
//! event loop owns the wall clock and the logic stays deterministic.

use std::time::Instant;

use crate::params::SessionConfig;

/// Immutable session: when it started and how long it runs
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SessionConfig,
    start: Instant,
}

/// Time-derived view of the session, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Seconds since the session started
    pub elapsed: f64,

    /// Fraction of the session elapsed, in [0, 1]
    pub progress: f64,

    /// Fraction of water remaining, `1 - progress`
    pub level: f64,
}

impl RenderState {
    pub fn at(elapsed: f64, duration_secs: f64) -> Self {
        let progress = if duration_secs > 0.0 {
            (elapsed / duration_secs).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            elapsed,
            progress,
            level: 1.0 - progress,
        }
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    pub fn starting_at(config: SessionConfig, start: Instant) -> Self {
        Self { config, start }
    }

    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64()
    }
}

/// Lifecycle phase; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Running,
    /// Bowl triggered at `at` (elapsed seconds)
    Completed { at: f64 },
    /// Opacity animation started at `since` (elapsed seconds)
    FadingOut { since: f64 },
    Terminated,
}

/// What the event loop must do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    Continue,
    PlayBowl,
    BeginFade,
    Exit,
}

/// Phase machine driven by elapsed time
#[derive(Debug, Clone)]
pub struct Timeline {
    config: SessionConfig,
    phase: Phase,
}

impl Timeline {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: Phase::Running,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the scene is frozen and only the window opacity animates
    pub fn is_fading(&self) -> bool {
        matches!(self.phase, Phase::FadingOut { .. } | Phase::Terminated)
    }

    /// Advance the phase machine to `elapsed` seconds
    ///
    /// At most one transition happens per call; each action is returned
    /// exactly once per session no matter how often this is called.
    pub fn advance(&mut self, elapsed: f64) -> TickAction {
        match self.phase {
            Phase::Running => {
                let state = RenderState::at(elapsed, self.config.duration_secs);
                if state.progress >= 1.0 {
                    self.phase = Phase::Completed { at: elapsed };
                    TickAction::PlayBowl
                } else {
                    TickAction::Continue
                }
            }
            Phase::Completed { at } => {
                if elapsed - at >= self.config.completion_grace_secs {
                    self.phase = Phase::FadingOut { since: elapsed };
                    TickAction::BeginFade
                } else {
                    TickAction::Continue
                }
            }
            Phase::FadingOut { since } => {
                if elapsed - since >= self.config.exit_after_fade_secs {
                    self.phase = Phase::Terminated;
                    TickAction::Exit
                } else {
                    TickAction::Continue
                }
            }
            Phase::Terminated => TickAction::Continue,
        }
    }

    /// Window opacity in [0, 1]: 1 until the fade starts, then an
    /// ease-in-out ramp to 0 over `fade_secs`
    pub fn window_opacity(&self, elapsed: f64) -> f32 {
        match self.phase {
            Phase::Running | Phase::Completed { .. } => 1.0,
            Phase::FadingOut { since } => {
                let t = if self.config.fade_secs > 0.0 {
                    ((elapsed - since) / self.config.fade_secs).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let eased = t * t * (3.0 - 2.0 * t);
                (1.0 - eased) as f32
            }
            Phase::Terminated => 0.0,
        }
    }
}
