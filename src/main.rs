//! zen-timer - a gentle visual timer
//!
//! A small borderless overlay in the corner of the screen slowly drains like
//! a glass of water, strikes a singing bowl when the session is over, then
//! fades away.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId, WindowLevel},
};

use zen_timer::audio::{self, BowlSound};
use zen_timer::cli::{self, Args, Invocation};
use zen_timer::controller::{Controller, Directive};
use zen_timer::params::{BowlConfig, OverlayStyle, SessionConfig};
use zen_timer::pidfile::{self, PidFile};
use zen_timer::rendering::{self, paint_scene, Canvas, RenderSystem};
use zen_timer::session::{Phase, RenderState, Session};
use zen_timer::water::FloaterField;

/// Events posted to the event loop from other threads
#[derive(Debug, Clone, Copy)]
enum UserEvent {
    /// SIGINT or SIGTERM: leave now, skipping the remaining phases
    Shutdown,
}

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    canvas: Option<Canvas>,

    // Session
    session: Session,
    controller: Controller<BowlSound>,
    floaters: FloaterField,
    style: OverlayStyle,
    next_tick: Instant,
}

impl App {
    fn new(config: SessionConfig, pid_file: PidFile) -> Self {
        let style = OverlayStyle::default();
        let floaters = FloaterField::new(style.floater_count, &mut rand::thread_rng());

        // Rendered once up front so completion only has to start playback
        let bowl_path = match audio::write_bowl(&BowlConfig::default(), &audio::bowl_temp_path())
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Bowl sound unavailable: {}", e);
                None
            }
        };

        Self {
            window: None,
            render_system: None,
            canvas: None,
            controller: Controller::new(config.clone(), BowlSound::new(bowl_path), pid_file),
            session: Session::new(config),
            floaters,
            style,
            next_tick: Instant::now(),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let size = self.style.window_size();
        let mut window_attributes = Window::default_attributes()
            .with_title("zen-timer")
            .with_inner_size(LogicalSize::new(size.x as f64, size.y as f64))
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop);

        // Bottom-right corner of the primary screen. winit exposes no work
        // area, so this is measured from the full screen and may sit under
        // a dock or taskbar.
        if let Some(monitor) = event_loop.primary_monitor() {
            let scale = monitor.scale_factor();
            let screen = monitor.size();
            let origin = monitor.position();
            let right = (size.x + self.style.edge_margin) as f64 * scale;
            let bottom = (size.y + self.style.edge_margin) as f64 * scale;
            window_attributes = window_attributes.with_position(PhysicalPosition::new(
                origin.x + (screen.width as f64 - right) as i32,
                origin.y + (screen.height as f64 - bottom) as i32,
            ));
        }

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );

        // Clicks pass through to whatever is underneath
        if let Err(e) = window.set_cursor_hittest(false) {
            debug!("Click-through unavailable: {}", e);
        }

        let render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window)))?;

        let physical = window.inner_size();
        self.canvas = Some(Canvas::new(
            physical.width.max(1),
            physical.height.max(1),
            window.scale_factor() as f32,
        ));
        self.render_system = Some(render_system);
        self.window = Some(window);
        Ok(())
    }

    /// One step of the 30 Hz clock
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let period = Duration::from_secs_f64(self.session.config.tick_interval_secs());
        self.next_tick += period;
        if self.next_tick <= now {
            // Fell behind (e.g. the machine slept): skip, don't burst
            self.next_tick = now + period;
        }

        let elapsed = self.session.elapsed_secs(now);
        match self.controller.tick(elapsed) {
            Directive::Repaint(state) => self.repaint(state),
            Directive::Present => {}
            Directive::Exit => {
                event_loop.exit();
                return;
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn repaint(&mut self, state: RenderState) {
        if let Some(canvas) = self.canvas.as_mut() {
            paint_scene(canvas, &state, &self.style, &self.floaters);
        }
    }

    fn present(&mut self) {
        let (Some(render_system), Some(canvas)) = (self.render_system.as_mut(), &self.canvas)
        else {
            return;
        };

        let opacity = self
            .controller
            .window_opacity(self.session.elapsed_secs(Instant::now()));
        if let Err(e) = render_system.present(canvas, opacity) {
            warn!("Render error: {:?}", e);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(window) = &self.window else {
            return;
        };
        if let Some(render_system) = self.render_system.as_mut() {
            render_system.resize(width, height);
        }
        self.canvas = Some(Canvas::new(
            width.max(1),
            height.max(1),
            window.scale_factor() as f32,
        ));

        // A frozen (fading) scene is repainted at its freeze point
        let elapsed = self.session.elapsed_secs(Instant::now());
        let state = match self.controller.timeline().phase() {
            Phase::FadingOut { since } => self.controller.render_state(since),
            _ => self.controller.render_state(elapsed),
        };
        self.repaint(state);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.controller.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::Init) {
            return;
        }
        if Instant::now() >= self.next_tick {
            self.tick(event_loop);
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.create_window(event_loop) {
            error!("{:#}", e);
            self.shutdown(event_loop);
            return;
        }

        self.next_tick = Instant::now();
        self.tick(event_loop);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Shutdown => {
                info!("Interrupted");
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.present(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

fn build_event_loop() -> anyhow::Result<EventLoop<UserEvent>> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::<UserEvent>::with_user_event();

    // No dock icon or menu bar, like a menu-bar utility
    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }

    builder.build().context("failed to create event loop")
}

fn run_overlay(config: SessionConfig, pid_file: PidFile) -> anyhow::Result<()> {
    // Best-effort bookkeeping for `zen-timer stop`
    if let Err(e) = pid_file.write_current() {
        warn!("Could not write PID file: {}", e);
    }

    let event_loop = build_event_loop()?;

    // SIGINT and SIGTERM both end the session immediately
    let proxy = event_loop.create_proxy();
    ctrlc::set_handler(move || {
        let _ = proxy.send_event(UserEvent::Shutdown);
    })
    .context("failed to install signal handler")?;

    println!("{}", cli::status_line(&config));

    let mut app = App::new(config, pid_file);
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}

fn run_snapshot(
    config: &SessionConfig,
    path: &Path,
    at_secs: f64,
    scale: f32,
) -> anyhow::Result<()> {
    let style = OverlayStyle::default();
    let floaters = FloaterField::new(style.floater_count, &mut rand::thread_rng());
    let state = RenderState::at(at_secs, config.duration_secs);

    rendering::save_frame(path, &state, &style, &floaters, scale)?;
    println!("zen-timer: wrote {}", path.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_lenient(std::env::args_os());
    let pid_file = PidFile::new(args.pid_path());

    let result = match args.invocation() {
        Invocation::Stop => {
            let outcome = pidfile::stop_running(&pid_file, pidfile::send_terminate);
            println!("{}", outcome.message());
            Ok(())
        }
        Invocation::Snapshot {
            config,
            path,
            at_secs,
            scale,
        } => run_snapshot(&config, &path, at_secs, scale),
        Invocation::Run(config) => run_overlay(config, pid_file),
    };

    // Every path exits 0; failures are only reported
    if let Err(e) = result {
        error!("{:#}", e);
    }
}
