use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::config::ViewerOptions;
use crate::error::{GpuError, ViewerError};
use crate::gfx::{
    gpu::GpuContext,
    renderer::{Renderer, ViewDirection},
    scene::DrawStyle,
    RenderEngine,
};

/// Wheel angle of one line step, in 1/8 degree units
const WHEEL_LINE_ANGLE: f32 = 120.0;

/// Pointer travel in pixels after which a press counts as a drag
const CLICK_TOLERANCE: f64 = 3.0;

/// Populates the world once the GPU is ready
pub type SetupCallback = Box<dyn FnOnce(&mut dyn GpuContext, &mut Renderer) -> Result<(), GpuError>>;

pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate { moved: bool },
    Pan,
}

struct AppState {
    options: ViewerOptions,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    renderer: Option<Renderer>,
    setup: Option<SetupCallback>,
    cursor: PhysicalPosition<f64>,
    press_position: PhysicalPosition<f64>,
    drag: Option<Drag>,
    error: Option<ViewerError>,
}

impl ViewerApp {
    /// Create a new viewer application
    pub fn new(options: ViewerOptions) -> Result<Self, ViewerError> {
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                options,
                window: None,
                render_engine: None,
                renderer: None,
                setup: None,
                cursor: PhysicalPosition::new(0.0, 0.0),
                press_position: PhysicalPosition::new(0.0, 0.0),
                drag: None,
                error: None,
            },
        })
    }

    /// Set a callback that adds actors to the world once the GPU is ready
    pub fn set_setup<F>(&mut self, setup: F)
    where
        F: FnOnce(&mut dyn GpuContext, &mut Renderer) -> Result<(), GpuError> + 'static,
    {
        self.app_state.setup = Some(Box::new(setup));
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.app_state.options
    }

    /// Run the application until its window closes
    pub fn run(mut self) -> Result<(), ViewerError> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| ViewerError::EventLoop("event loop already consumed".into()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn initialize(&mut self, window: Arc<Window>) -> Result<(), ViewerError> {
        let PhysicalSize { width, height } = window.inner_size();

        let mut render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.options,
        ))?;
        let mut renderer = Renderer::new(&mut render_engine, &self.options)?;
        renderer.resize(width, height, window.scale_factor());

        if let Some(setup) = self.setup.take() {
            setup(&mut render_engine, &mut renderer)?;
        }

        log::info!("Viewer started at {}x{}", width, height);
        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match key_code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Digit1 => renderer.set_view(ViewDirection::Front),
            KeyCode::Digit2 => renderer.set_view(ViewDirection::Back),
            KeyCode::Digit3 => renderer.set_view(ViewDirection::Left),
            KeyCode::Digit4 => renderer.set_view(ViewDirection::Right),
            KeyCode::Digit5 => renderer.set_view(ViewDirection::Top),
            KeyCode::Digit6 => renderer.set_view(ViewDirection::Bottom),
            KeyCode::KeyP => {
                let lens = renderer.lens().toggled();
                renderer.set_lens(lens);
            }
            KeyCode::KeyW => renderer.set_draw_style(DrawStyle::Wireframe),
            KeyCode::KeyS => renderer.set_draw_style(DrawStyle::Solid),
            KeyCode::KeyE => renderer.set_draw_style(DrawStyle::SolidWithEdges),
            KeyCode::KeyV => renderer.set_draw_style(DrawStyle::Points),
            KeyCode::KeyL => {
                let lighting = !renderer.scene().lighting();
                renderer.set_lighting(lighting);
            }
            KeyCode::KeyF => {
                let shading = renderer.scene().shading().toggled();
                renderer.set_shading(shading);
            }
            KeyCode::KeyA => {
                let animating = !renderer.is_animating();
                renderer.enable_animation(animating);
            }
            KeyCode::KeyG => {
                let world = renderer.world_mut();
                let enabled = !world.grid_lines_enabled();
                world.enable_grid_lines(enabled);
            }
            KeyCode::KeyX => {
                let world = renderer.world_mut();
                let enabled = !world.axes_enabled();
                world.enable_axes(enabled);
            }
            KeyCode::Home => renderer.reset_camera(),
            KeyCode::KeyC => renderer.store_camera(),
            KeyCode::KeyR => {
                if !renderer.recall_camera() {
                    log::info!("No stored camera to recall");
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);

        match (button, state, self.drag) {
            (MouseButton::Left, ElementState::Pressed, None) => {
                self.press_position = self.cursor;
                self.drag = Some(Drag::Rotate { moved: false });
                renderer.rotate_start(x, y);
            }
            (MouseButton::Left, ElementState::Released, Some(Drag::Rotate { moved })) => {
                self.drag = None;
                renderer.rotate_end(x, y);
                if !moved {
                    match renderer.select_at(x, y) {
                        Some(name) => log::info!("Selected '{}'", name),
                        None => log::debug!("Selection cleared"),
                    }
                }
            }
            (MouseButton::Right, ElementState::Pressed, None) => {
                self.drag = Some(Drag::Pan);
                renderer.pan_start(x, y);
            }
            (MouseButton::Right, ElementState::Released, Some(Drag::Pan)) => {
                self.drag = None;
                renderer.pan_end();
            }
            _ => {}
        }
    }

    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let (x, y) = (position.x as f32, position.y as f32);

        match self.drag {
            Some(Drag::Rotate { moved }) => {
                let dx = position.x - self.press_position.x;
                let dy = position.y - self.press_position.y;
                let moved = moved || dx.hypot(dy) > CLICK_TOLERANCE;
                self.drag = Some(Drag::Rotate { moved });
                renderer.rotate_to(x, y);
            }
            Some(Drag::Pan) => renderer.pan_to(x, y),
            None => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.options.title.clone())
            .with_inner_size(LogicalSize::new(self.options.width, self.options.height));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                if let Err(error) = self.initialize(Arc::new(window)) {
                    self.fail(event_loop, error);
                }
            }
            Err(e) => self.fail(event_loop, ViewerError::EventLoop(e.to_string())),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.render_engine.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(button, state)
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor_moved(position),
            WindowEvent::MouseWheel { delta, .. } => {
                let angle = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * WHEEL_LINE_ANGLE,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.wheel(angle);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height, scale_factor);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(renderer) = self.renderer.as_mut() {
                    let (width, height) = renderer.size();
                    renderer.resize(width, height, scale_factor);
                }
            }
            WindowEvent::CloseRequested => {
                if let (Some(renderer), Some(render_engine)) =
                    (self.renderer.as_mut(), self.render_engine.as_mut())
                {
                    renderer.destroy(render_engine);
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let (Some(renderer), Some(render_engine)) =
                    (self.renderer.as_mut(), self.render_engine.as_mut())
                else {
                    return;
                };
                if let Err(error) = renderer.render(render_engine) {
                    self.fail(event_loop, error.into());
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
