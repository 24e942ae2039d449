//! CPU-side pixel buffers.
//!
//! Decoding turns an image file into a tightly packed RGBA8 `DecodedImage`;
//! `rotate` resamples one through an inverse rotation. Neither touches the
//! graphics device, so both are tested directly.

mod decoded;
mod rotate;

pub use decoded::DecodedImage;
pub use rotate::{CanvasSizing, RotationRequest, rotate};
