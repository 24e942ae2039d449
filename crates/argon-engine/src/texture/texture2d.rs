use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

use super::{PixelFormat, TextureConfig};
use crate::device::{Gpu, GraphicsDevice, ObjectName, TextureParameter};
use crate::error::{Error, Result};
use crate::raster::DecodedImage;

/// A 2D texture with a complete mip chain.
///
/// Dropping the value deletes the GPU object.
pub struct Texture<'g, D: GraphicsDevice> {
    gpu: &'g Gpu<D>,
    texture: D::Texture,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'g, D: GraphicsDevice> Texture<'g, D> {
    /// Decodes the image at `path` and uploads it.
    ///
    /// PNG and JPEG are the supported inputs; any format the decoder
    /// recognizes is accepted and expanded to RGBA.
    pub fn load(gpu: &'g Gpu<D>, path: impl AsRef<Path>, config: &TextureConfig) -> Result<Self> {
        let path = path.as_ref();
        let image = DecodedImage::load(path)?;
        log::debug!(
            "decoded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_image(gpu, image, config)
    }

    /// Uploads already decoded pixels.
    pub fn from_image(
        gpu: &'g Gpu<D>,
        image: DecodedImage,
        config: &TextureConfig,
    ) -> Result<Self> {
        let image = config.rotation.apply(image);
        let device = gpu.device();

        let handle = device.create_texture().map_err(|reason| {
            log::error!("couldn't create texture: {reason}");
            Error::Device {
                object: "texture",
                reason,
            }
        })?;
        let texture = Self {
            gpu,
            texture: handle,
            width: image.width(),
            height: image.height(),
            format: PixelFormat::Rgba8,
        };

        if let Some(unit) = config.unit {
            device.active_texture(unit);
        }
        device.bind_texture_2d(Some(handle));

        device.tex_parameter_2d(TextureParameter::WrapS, config.wrap_s.to_gl());
        device.tex_parameter_2d(TextureParameter::WrapT, config.wrap_t.to_gl());
        device.tex_parameter_2d(TextureParameter::MinFilter, config.min_filter.to_gl());
        device.tex_parameter_2d(TextureParameter::MagFilter, config.mag_filter.to_gl());

        device.tex_image_2d_rgba8(image.width(), image.height(), image.pixels());
        device.generate_mipmap_2d();

        // Without a unit the caller binds later; don't leave it on whatever
        // unit happened to be active.
        if config.unit.is_none() {
            device.bind_texture_2d(None);
        }

        log::debug!(
            "uploaded texture {} ({}x{}, unit {:?})",
            handle.name(),
            texture.width,
            texture.height,
            config.unit
        );
        Ok(texture)
    }

    /// Binds to whichever texture unit is active.
    pub fn bind(&self) {
        self.gpu.device().bind_texture_2d(Some(self.texture));
    }

    /// Activates `unit` (0-based) and binds this texture there.
    pub fn bind_to_unit(&self, unit: u32) {
        let device = self.gpu.device();
        device.active_texture(unit);
        device.bind_texture_2d(Some(self.texture));
    }

    /// Driver object name.
    pub fn id(&self) -> NonZeroU32 {
        self.texture.name()
    }

    pub fn handle(&self) -> D::Texture {
        self.texture
    }

    /// Width of level 0, after rotation.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

impl<D: GraphicsDevice> Drop for Texture<'_, D> {
    fn drop(&mut self) {
        log::debug!("deleting texture {}", self.texture.name());
        self.gpu.device().delete_texture(self.texture);
    }
}

impl<D: GraphicsDevice> fmt::Debug for Texture<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("texture", &self.texture)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish()
    }
}
