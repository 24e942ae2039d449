//! 2D texture loading.
//!
//! A texture is built in one pass: decode the file, optionally rotate the
//! pixels, then allocate the GPU object, set sampler state, upload level 0
//! and generate mipmaps. Nothing is allocated on the device until the pixels
//! are ready, so a bad file never leaks a texture object.

mod config;
mod texture2d;

pub use config::{FilterMode, PixelFormat, TextureConfig, WrapMode};
pub use texture2d::Texture;
