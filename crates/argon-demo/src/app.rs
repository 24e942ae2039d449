use std::time::Instant;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::config::DemoConfig;
use crate::context::WindowContext;
use crate::scene::Scene;

/// Live window state. `scene` is declared first so its GL objects are
/// deleted while the context is still alive.
struct Running {
    scene: Scene,
    target: WindowContext,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &DemoConfig) -> Result<Self> {
        let (target, gl) = WindowContext::create(event_loop, config)?;
        let size = target.window().inner_size();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;

        let mut scene = Scene::load(gl, config, aspect)?;
        scene.resize(size.width, size.height);
        Ok(Self { scene, target })
    }
}

pub struct DemoApp {
    config: DemoConfig,
    running: Option<Running>,
    started: Instant,
    failure: Option<anyhow::Error>,
}

impl DemoApp {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            running: None,
            started: Instant::now(),
            failure: None,
        }
    }

    /// Reports a startup failure once the event loop has returned.
    pub fn finish(self) -> Result<()> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.running = None;
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        match code {
            KeyCode::Escape => self.shut_down(event_loop),
            KeyCode::KeyF => {
                if let Some(running) = &self.running {
                    running.scene.set_wireframe(true);
                }
            }
            KeyCode::KeyP => {
                if let Some(running) = &self.running {
                    running.scene.set_wireframe(false);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match Running::start(event_loop, &self.config) {
            Ok(running) => {
                running.target.window().request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                log::error!("failed to start demo: {e:#}");
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the cubes spin.
        if let Some(running) = &self.running {
            running.target.window().request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => self.shut_down(event_loop),

            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, event),

            WindowEvent::Resized(size) => {
                if let Some(running) = &mut self.running {
                    running.target.resize(*size);
                    running.scene.resize(size.width, size.height);
                    running.target.window().request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(running) = &self.running else {
                    return;
                };
                running.scene.draw(self.started.elapsed().as_secs_f32());
                if let Err(e) = running.target.swap_buffers() {
                    log::error!("{e:#}");
                }
            }

            _ => {}
        }
    }
}
