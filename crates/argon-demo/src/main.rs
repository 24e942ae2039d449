//! Textured cube demo.
//!
//! Opens an OpenGL 3.3 core window and draws ten cubes sampling two textures,
//! the second one rotated half a turn at load time.
//!
//! Usage: `argon-demo [ASSET_DIR]`. Esc quits, F switches to wireframe,
//! P back to filled polygons.

mod app;
mod config;
mod context;
mod scene;

use anyhow::{Context, Result};
use argon_engine::logging::{LoggingConfig, init_logging};
use winit::event_loop::EventLoop;

use crate::app::DemoApp;
use crate::config::DemoConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_args(std::env::args_os().skip(1));
    log::info!("starting argon demo (assets in {})", config.asset_root.display());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = DemoApp::new(config);

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    app.finish()
}
