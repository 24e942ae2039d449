//! Argon engine crate.
//!
//! This crate owns the graphics resource pipeline: shader programs built from
//! vertex/fragment sources, and textures decoded from image files (optionally
//! rotated) and uploaded for sampling. Window and render-loop concerns live in
//! the host.

pub mod device;
pub mod error;
pub mod logging;
pub mod math;
pub mod raster;
pub mod shader;
pub mod texture;

pub use device::{GlowDevice, Gpu, GraphicsDevice, HeadlessDevice};
pub use error::{Error, Result};
pub use raster::{CanvasSizing, DecodedImage, RotationRequest};
pub use shader::{ShaderProgram, ShaderSource, ShaderStage};
pub use texture::{FilterMode, PixelFormat, Texture, TextureConfig, WrapMode};
