use std::path::PathBuf;

use crate::shader::ShaderStage;

/// Failures surfaced while building shader programs and textures.
///
/// Every variant is terminal for the construction attempt that produced it;
/// nothing in this crate retries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File missing or unreadable.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported or corrupt image container.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Decoded pixels do not have the tightly packed RGBA layout the upload
    /// path expects.
    #[error("unsupported pixel layout: row stride {stride} bytes for width {width}")]
    UnsupportedFormat { width: u32, stride: usize },

    /// Shader source rejected by the compiler.
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// Program linking rejected.
    #[error("shader program failed to link: {log}")]
    Link { log: String },

    /// The device refused to allocate an object.
    #[error("graphics device could not create {object}: {reason}")]
    Device { object: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
