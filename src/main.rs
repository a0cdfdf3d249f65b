use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use sphere_tracer::camera::Camera;
use sphere_tracer::cli::Cli;
use sphere_tracer::controls::MotionInput;
use sphere_tracer::core::{Button, Controller, WinitController};
use sphere_tracer::frame::{FpsCounter, FrameClock};
use sphere_tracer::renderer::Renderer;
use sphere_tracer::scene::default_scene;
use sphere_tracer::session::Session;
use sphere_tracer::ui::{self, UiEvent};

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    session: Session,
    controller: WinitController,
    clock: FrameClock,
    fps: FpsCounter,
}

impl App {
    fn new(cli: Cli, session: Session) -> Self {
        Self {
            cli,
            window: None,
            renderer: None,
            session,
            controller: WinitController::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::default(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Self {
            cli,
            window: Some(window),
            renderer: Some(renderer),
            session,
            controller,
            clock,
            fps,
        } = self
        else {
            return;
        };
        let window: &Window = window;

        if controller.was_pressed(Button::Escape) {
            event_loop.exit();
            return;
        }

        let delta = clock.tick();
        if fps.update(delta) {
            window.set_title(&format!(
                "Fps: {:.1}  Current frame render time: {:.2}s",
                fps.fps(),
                session.accumulation().elapsed()
            ));
        }

        let mut events = Vec::new();
        let bounce_step = i32::from(controller.was_pressed(Button::ArrowUp))
            - i32::from(controller.was_pressed(Button::ArrowDown));
        if bounce_step != 0 {
            let settings = session.settings().with_bounce_step(bounce_step);
            log::debug!("Max bounces: {}", settings.max_bounce_limit);
            events.push(UiEvent::Render(settings));
        }

        if !cli.no_ui {
            let mut ui_events = Vec::new();
            let state: &Session = session;
            renderer.run_ui(window, |ctx| {
                ui_events = ui::show(ctx, state, delta);
            });
            events.extend(ui_events);
        }

        let mut motion =
            MotionInput::from_controller(&*controller, session.camera().tuning.sensitivity);
        if renderer.wants_keyboard_input() {
            motion.direction = Vec3::ZERO;
            motion.sprint = false;
        }
        controller.reset_deltas();

        if let Err(e) = session.frame(&motion, delta, events) {
            log::error!("Frame update failed: {:#}", e);
        }

        match renderer.render(session.uniforms_mut()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
            }
            Err(e) => {
                // Nothing was blended, so this frame's tick must not count
                session.frame_dropped();
                if matches!(e, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    log::warn!("Surface lost, reconfiguring");
                    renderer.reconfigure();
                } else {
                    log::warn!("Render error: {}", e);
                }
            }
        }
    }
}

/// Releases must always reach the input state, even over egui widgets
fn is_release(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => event.state == ElementState::Released,
        WindowEvent::MouseInput { state, .. } => *state == ElementState::Released,
        WindowEvent::Focused(false) => true,
        _ => false,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Sphere Tracer")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = renderer.size();
        self.session.resize(width, height);

        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        let consumed = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_event(window, &event),
            _ => false,
        };
        if !consumed || is_release(&event) {
            self.controller.process_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                self.session.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut camera = Camera::default();
    camera.tuning = cli.camera_tuning();

    let session = Session::new(default_scene(), cli.width, cli.height)?
        .with_camera(camera)
        .with_settings(cli.render_settings())
        .with_accumulation(!cli.no_accumulation);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, session);

    log::info!(
        "Sphere Tracer - Controls: WASD move, Space/Ctrl up/down, Shift sprint, \
         hold right mouse to look, Up/Down bounces, Escape to quit"
    );
    event_loop.run_app(&mut app)?;

    Ok(())
}
