//! Graphics device seam.
//!
//! This module is responsible for:
//! - the `GraphicsDevice` contract the shader and texture builders rely on
//! - pinning a device to the thread that owns its context (`Gpu`)
//! - the OpenGL backend (`GlowDevice`) and an in-memory one (`HeadlessDevice`)
//!
//! Bound program/texture state is global inside a GL context. Routing every
//! call through an explicit `Gpu<D>` keeps that state reachable only from the
//! context thread and lets tests swap the driver for `HeadlessDevice`.

mod gl;
mod gpu;
pub mod headless;
mod traits;

pub use gl::GlowDevice;
pub use gpu::Gpu;
pub use headless::HeadlessDevice;
pub use traits::{GraphicsDevice, ObjectName, TextureParameter};
