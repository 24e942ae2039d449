use std::path::Path;

use crate::error::{Error, Result};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A decoded image: `width * height` RGBA8 pixels, rows top to bottom, no
/// row padding.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wraps an RGBA8 buffer. Fails when the buffer length does not match a
    /// row stride of exactly `width * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * BYTES_PER_PIXEL;
        let stride = match height {
            0 if pixels.is_empty() => expected,
            0 => pixels.len(),
            rows => pixels.len() / rows as usize,
        };
        if stride != expected || pixels.len() != expected * height as usize {
            return Err(Error::UnsupportedFormat { width, stride });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Reads and decodes an image file. The container format is detected
    /// from the content, not the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            log::error!("couldn't find image at path {}: {source}", path.display());
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::decode_named(&bytes, path)
    }

    /// Decodes an in-memory image container.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_named(bytes, Path::new("<memory>"))
    }

    fn decode_named(bytes: &[u8], origin: &Path) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|source| {
            log::error!("couldn't decode image {}: {source}", origin.display());
            Error::Decode {
                path: origin.to_path_buf(),
                source,
            }
        })?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        let image = Self::from_rgba8(width, height, rgba.into_raw()).inspect_err(|err| {
            log::error!("{}: {err}", origin.display());
        })?;
        log::debug!("decoded {width}x{height} image from {}", origin.display());
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes; always `width * 4`.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        self.pixels[i..i + BYTES_PER_PIXEL].try_into().ok()
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img.clone())
                .into_rgb8()
                .write_to(&mut out, format)
                .unwrap(),
            _ => img.write_to(&mut out, format).unwrap(),
        }
        out.into_inner()
    }

    #[test]
    fn png_decodes_to_tightly_packed_rgba() {
        let img = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let decoded = DecodedImage::decode(&encode(&img, ImageFormat::Png)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert_eq!(decoded.pixels().len(), 5 * 3 * 4);
        assert_eq!(decoded.stride(), 20);
        assert_eq!(decoded.pixel(4, 2), Some([4, 2, 7, 255]));
    }

    #[test]
    fn jpeg_decodes_with_opaque_alpha() {
        let img = RgbaImage::from_pixel(8, 4, Rgba([200, 30, 30, 255]));
        let decoded = DecodedImage::decode(&encode(&img, ImageFormat::Jpeg)).unwrap();
        assert_eq!(decoded.pixels().len(), 8 * 4 * 4);
        let [r, _, _, a] = decoded.pixel(3, 2).unwrap();
        assert_eq!(a, 255);
        // Lossy; only check the dominant channel survived.
        assert!(r > 150);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DecodedImage::load(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn corrupt_file_is_decode_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        match DecodedImage::load(&path).unwrap_err() {
            Error::Decode { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn from_rgba8_rejects_padded_rows() {
        // 3 pixels wide with 4 bytes of row padding.
        let err = DecodedImage::from_rgba8(3, 2, vec![0; 32]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { width: 3, stride: 16 }));
    }

    #[test]
    fn pixel_outside_is_none() {
        let img = DecodedImage::transparent(2, 2);
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(1, 1), Some([0; 4]));
    }

    #[test]
    fn from_rgba8_accepts_zero_rows() {
        let empty = DecodedImage::from_rgba8(3, 0, Vec::new()).unwrap();
        assert_eq!(empty.stride(), 12);
        assert_eq!(empty.pixels(), DecodedImage::transparent(3, 0).pixels());

        let err = DecodedImage::from_rgba8(3, 0, vec![0; 12]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { width: 3, stride: 12 }));
    }
}
