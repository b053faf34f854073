//! Application window and event loop management.

use std::sync::Arc;
use std::time::{Duration, Instant};

use egui_wgpu::ScreenDescriptor;
use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use wavescope_core::ViewerConfig;
use wavescope_render::{RenderEngine, SliceMeshRenderData};
use wavescope_ui::{build_control_panel, EguiIntegration, PanelAction, PanelModel};

use crate::error::ViewerError;
use crate::viewer::{LoadState, QuantumViewer};

/// How often the background loader is polled while no other wakeup is due.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the event loop does once it runs out of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    /// A deadline has passed: draw now.
    Redraw,
    /// Sleep until the instant, then draw.
    At(Instant),
    /// Nothing scheduled; sleep until the next input event.
    Idle,
}

/// Picks the earliest pending deadline.
fn next_wake(now: Instant, deadlines: impl IntoIterator<Item = Option<Instant>>) -> Wake {
    match deadlines.into_iter().flatten().min() {
        Some(at) if at <= now => Wake::Redraw,
        Some(at) => Wake::At(at),
        None => Wake::Idle,
    }
}

/// The windowed viewer: one [`QuantumViewer`] session plus its GPU and UI state.
pub struct App {
    viewer: QuantumViewer,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    egui: Option<EguiIntegration>,
    /// One entry per slice grid, in `SliceSet` order.
    slice_meshes: Vec<SliceMeshRenderData>,
    /// Set once the camera has been framed on real geometry.
    camera_framed: bool,
    close_requested: bool,
    fatal: Option<ViewerError>,
    last_render: Instant,
    /// When egui asked to be repainted, if it did.
    ui_repaint_at: Option<Instant>,
    // Physical button state, tracked even when egui consumes the event
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    right_mouse_down: bool,
    shift_down: bool,
}

impl App {
    /// Creates the application and starts the dataset load.
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        Ok(Self {
            viewer: QuantumViewer::new(config)?,
            window: None,
            engine: None,
            egui: None,
            slice_meshes: Vec::new(),
            camera_framed: false,
            close_requested: false,
            fatal: None,
            last_render: Instant::now(),
            ui_repaint_at: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            shift_down: false,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let config = self.viewer.config();
        let height = config.display_height.max(200);
        let width = height * 16 / 9;
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let mut engine = RenderEngine::new_windowed(window.clone()).block_on()?;
        let egui = EguiIntegration::new(&engine.device, engine.surface_config.format, &window);

        let (min, max) = self.viewer.slices().bounding_box();
        engine.camera.look_at_box(min, max);
        self.slice_meshes = self
            .viewer
            .slices()
            .iter()
            .map(|(_, grid)| engine.create_slice_render_data(grid))
            .collect();

        self.window = Some(window);
        self.engine = Some(engine);
        self.egui = Some(egui);
        Ok(())
    }

    fn apply_actions(&mut self, actions: Vec<PanelAction>, now: Instant) {
        for action in actions {
            match action {
                PanelAction::TogglePlay => self.viewer.toggle_play(now),
                PanelAction::Reset => self.viewer.reset(),
                PanelAction::Scrub(frame) => self.viewer.scrub(frame),
                PanelAction::SetFps(fps) => self.viewer.set_fps(fps, now),
                PanelAction::SetParams(params) => self.viewer.set_params(params),
                PanelAction::ResetView => {
                    if let Some(engine) = &mut self.engine {
                        engine.camera.reset();
                    }
                }
            }
        }
    }

    /// Uploads grids whose geometry changed since the last frame.
    fn upload_dirty_slices(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let mut uploaded = false;
        for ((_, grid), mesh) in self.viewer.slices_mut().iter_mut().zip(&self.slice_meshes) {
            if grid.take_dirty() {
                mesh.update_vertices(&engine.queue, grid);
                uploaded = true;
            }
        }

        if uploaded && !self.camera_framed {
            let (min, max) = self.viewer.slices().bounding_box();
            if let Some(engine) = &mut self.engine {
                engine.camera.look_at_box(min, max);
            }
            self.camera_framed = true;
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        self.last_render = now;

        // UI first, so this frame's actions land in the same update pass
        let ui_pass = {
            let (Some(egui), Some(window)) = (&mut self.egui, &self.window) else {
                return;
            };
            let playback = self.viewer.playback();
            let model = PanelModel {
                title: &self.viewer.config().title,
                status: self.viewer.status(),
                notice: self.viewer.notice(),
                playing: playback.is_playing(),
                frame: playback.frame(),
                frame_count: self.viewer.frame_count(),
                fps: playback.fps(),
                params: *self.viewer.params(),
                ranges: &self.viewer.config().options.ranges,
            };
            let mut actions = Vec::new();
            let output = egui.run(window, |ctx| {
                actions = build_control_panel(ctx, &model);
            });
            let repaint_at = output
                .viewport_output
                .values()
                .map(|viewport| viewport.repaint_delay)
                .min()
                .and_then(|delay| now.checked_add(delay));
            self.ui_repaint_at = repaint_at;
            (actions, output)
        };
        let (actions, ui_output) = ui_pass;
        self.apply_actions(actions, now);

        if let Err(err) = self.viewer.update(now) {
            log::error!("frame update failed: {err}");
        }
        self.upload_dirty_slices();

        let (Some(engine), Some(egui), Some(window)) =
            (&mut self.engine, &mut self.egui, &self.window)
        else {
            return;
        };
        engine.update_camera_uniforms();

        let target = match engine.begin_frame() {
            Ok(target) => target,
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return;
            }
        };

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        let slices: &[SliceMeshRenderData] = if self.viewer.is_ready() {
            &self.slice_meshes
        } else {
            &[]
        };
        engine.render_slices(
            &mut encoder,
            &target.view,
            slices,
            self.viewer.config().options.background_color,
        );

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [engine.width, engine.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        egui.render(
            &engine.device,
            &engine.queue,
            &mut encoder,
            &target.view,
            &screen_descriptor,
            ui_output,
        );

        engine.end_frame(encoder, target);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match self.init_window(event_loop) {
            Ok(()) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(err) => {
                log::error!("{err}");
                self.fatal = Some(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        let now = Instant::now();
        let load_poll = matches!(self.viewer.load_state(), LoadState::Loading(_))
            .then_some(self.last_render + LOAD_POLL_INTERVAL);
        let deadlines = [self.viewer.next_deadline(), self.ui_repaint_at, load_poll];

        match next_wake(now, deadlines) {
            Wake::Redraw => {
                window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Wake::At(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            Wake::Idle => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => self.left_mouse_down = true,
                (MouseButton::Left, ElementState::Released) => self.left_mouse_down = false,
                (MouseButton::Right, ElementState::Pressed) => self.right_mouse_down = true,
                (MouseButton::Right, ElementState::Released) => self.right_mouse_down = false,
                _ => {}
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            _ => {}
        }

        let egui_consumed = if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            egui.handle_event(window, &event)
        } else {
            false
        };
        let egui_wants_pointer = self.egui.as_ref().is_some_and(EguiIntegration::wants_pointer);
        // Frames are drawn on demand: input redraws once, playback wakes via about_to_wait
        let mut redraw = true;

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                redraw = false;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.mouse_pos.0) as f32;
                let delta_y = (position.y - self.mouse_pos.1) as f32;
                self.mouse_pos = (position.x, position.y);

                if let (false, Some(engine)) = (egui_wants_pointer, &mut self.engine) {
                    let is_pan = self.right_mouse_down || (self.left_mouse_down && self.shift_down);
                    if is_pan {
                        let scale = engine.camera.position.distance(engine.camera.target) * 0.002;
                        engine.camera.pan(-delta_x * scale, delta_y * scale);
                    } else if self.left_mouse_down {
                        engine.camera.orbit(delta_x * 0.01, delta_y * 0.01);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let captured = egui_consumed || egui_wants_pointer;
                if let (false, Some(engine)) = (captured, &mut self.engine) {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                    };
                    let scale = engine.camera.position.distance(engine.camera.target) * 0.1;
                    engine.camera.zoom(scroll * scale);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !egui_consumed && event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        match code {
                            KeyCode::Escape => self.close_requested = true,
                            KeyCode::Space => self.viewer.toggle_play(Instant::now()),
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }

        if redraw {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        if self.close_requested {
            self.viewer.teardown();
            event_loop.exit();
        }
    }
}

/// Runs the viewer until its window closes.
pub fn run_app(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;

    event_loop.run_app(&mut app)?;
    app.viewer.teardown();
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_without_deadlines() {
        let now = Instant::now();
        assert_eq!(next_wake(now, [None, None, None]), Wake::Idle);
    }

    #[test]
    fn test_waits_for_earliest_deadline() {
        let now = Instant::now();
        let tick = now + Duration::from_millis(33);
        let poll = now + LOAD_POLL_INTERVAL;
        assert_eq!(next_wake(now, [Some(tick), None, Some(poll)]), Wake::At(tick));
        assert_eq!(next_wake(now, [Some(poll), Some(tick)]), Wake::At(tick));
    }

    #[test]
    fn test_redraws_once_deadline_passes() {
        let now = Instant::now();
        let overdue = now.checked_sub(Duration::from_millis(1)).unwrap_or(now);
        assert_eq!(next_wake(now, [Some(overdue)]), Wake::Redraw);
        assert_eq!(next_wake(now, [Some(now), Some(now + LOAD_POLL_INTERVAL)]), Wake::Redraw);
    }
}
