use std::num::NonZeroU32;

use anyhow::{Context, Result, anyhow};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::config::DemoConfig;

/// A window with a current OpenGL 3.3 core context.
///
/// Fields drop in declaration order: surface, then context, then window.
pub struct WindowContext {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl WindowContext {
    /// Creates the window and context, makes it current and loads GL entry
    /// points into a `glow::Context`.
    pub fn create(
        event_loop: &ActiveEventLoop,
        config: &DemoConfig,
    ) -> Result<(Self, glow::Context)> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let template = ConfigTemplateBuilder::new().with_depth_size(24);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("failed to create GL display: {e}"))?;
        let window = window.context("GL display created without a window")?;

        log::debug!(
            "GL config: {} samples, depth {}",
            gl_config.num_samples(),
            gl_config.depth_size()
        );

        let raw_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();
        let display = gl_config.display();

        let context_attrs = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_handle));

        let not_current = unsafe { display.create_context(&gl_config, &context_attrs) }
            .context("failed to create OpenGL 3.3 core context")?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs) }
            .context("failed to create window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("vsync unavailable: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol))
        };

        Ok((
            Self {
                surface,
                context,
                window,
            },
            gl,
        ))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the default framebuffer. Zero-sized (minimized) windows are
    /// ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let width = NonZeroU32::new(size.width);
        let height = NonZeroU32::new(size.height);
        let (Some(width), Some(height)) = (width, height) else {
            return;
        };
        self.surface.resize(&self.context, width, height);
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

/// Prefers the config with the most MSAA samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, candidate| {
            if candidate.num_samples() > best.num_samples() {
                candidate
            } else {
                best
            }
        })
        .expect("glutin offers at least one config matching the template")
}
