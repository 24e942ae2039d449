//! Inverse-mapped image rotation.
//!
//! Every destination pixel centre is carried back through the inverse
//! rotation into source space and sampled there, so the output has no holes.
//! Coordinates are y-down, so a positive angle turns the picture clockwise
//! as displayed.

use super::DecodedImage;
use crate::math;

/// Tolerance for source coordinates that land on the image border.
const EDGE_EPSILON: f64 = 1e-6;

/// Destination canvas size for a non-zero rotation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CanvasSizing {
    /// `height x width` of the source. Exact for quarter turns; other angles
    /// clip the corners that leave the canvas.
    #[default]
    Swapped,
    /// Smallest canvas holding the whole rotated source.
    Bounding,
}

impl CanvasSizing {
    fn canvas(self, width: u32, height: u32, radians: f64) -> (u32, u32) {
        match self {
            CanvasSizing::Swapped => (height, width),
            CanvasSizing::Bounding => {
                let (sin, cos) = radians.sin_cos();
                let (w, h) = (f64::from(width), f64::from(height));
                let fit = |extent: f64| (extent - EDGE_EPSILON).ceil().max(0.0) as u32;
                (
                    fit(w * cos.abs() + h * sin.abs()),
                    fit(w * sin.abs() + h * cos.abs()),
                )
            }
        }
    }
}

/// Rotation applied to a texture image before upload.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RotationRequest {
    radians: f64,
    sizing: CanvasSizing,
}

impl RotationRequest {
    /// No rotation; the decoded buffer is uploaded as is.
    pub const NONE: Self = Self {
        radians: 0.0,
        sizing: CanvasSizing::Swapped,
    };

    pub fn radians(radians: f64) -> Self {
        Self {
            radians,
            ..Self::NONE
        }
    }

    pub fn degrees(degrees: f64) -> Self {
        Self::radians(math::degrees_to_radians(degrees))
    }

    pub fn with_sizing(mut self, sizing: CanvasSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn angle(&self) -> f64 {
        self.radians
    }

    pub fn sizing(&self) -> CanvasSizing {
        self.sizing
    }

    pub fn is_identity(&self) -> bool {
        self.radians == 0.0
    }

    /// Rotates `image`, handing it back untouched for a zero angle.
    pub fn apply(&self, image: DecodedImage) -> DecodedImage {
        if self.is_identity() {
            return image;
        }
        rotate(&image, self.radians, self.sizing)
    }
}

/// Rotates `source` by `radians` about its centre onto a canvas sized by
/// `sizing`, resampling bilinearly.
///
/// Destination pixels whose inverse-mapped centre falls outside the source
/// stay transparent black, as does the whole canvas for an empty source. A
/// zero angle returns a copy of `source`.
pub fn rotate(source: &DecodedImage, radians: f64, sizing: CanvasSizing) -> DecodedImage {
    if radians == 0.0 {
        return source.clone();
    }

    let (width, height) = sizing.canvas(source.width(), source.height(), radians);
    let mut canvas = DecodedImage::transparent(width, height);
    if source.width() == 0 || source.height() == 0 {
        return canvas;
    }

    let (sin, cos) = radians.sin_cos();
    let src_cx = f64::from(source.width()) / 2.0;
    let src_cy = f64::from(source.height()) / 2.0;
    let dst_cx = f64::from(width) / 2.0;
    let dst_cy = f64::from(height) / 2.0;

    for y in 0..height {
        let dy = f64::from(y) + 0.5 - dst_cy;
        for x in 0..width {
            let dx = f64::from(x) + 0.5 - dst_cx;
            // R(-theta) applied to the offset from the canvas centre.
            let sx = cos * dx + sin * dy + src_cx;
            let sy = -sin * dx + cos * dy + src_cy;
            if let Some(rgba) = sample_bilinear(source, sx, sy) {
                canvas.put_pixel(x, y, rgba);
            }
        }
    }

    log::debug!(
        "rotated {}x{} image by {radians:.4} rad onto {width}x{height} canvas",
        source.width(),
        source.height()
    );
    canvas
}

/// Samples `image` at continuous coordinates (pixel centres at `i + 0.5`).
///
/// Colour is interpolated premultiplied so transparent neighbours do not
/// bleed their RGB into the result.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 4]> {
    let (w, h) = (f64::from(image.width()), f64::from(image.height()));
    let inside = |p: f64, extent: f64| p >= -EDGE_EPSILON && p < extent + EDGE_EPSILON;
    if !(inside(x, w) && inside(y, h)) {
        return None;
    }

    let u = x - 0.5;
    let v = y - 0.5;
    let (x0, y0) = (u.floor(), v.floor());
    let (fx, fy) = (u - x0, v - y0);

    let max_x = i64::from(image.width()) - 1;
    let max_y = i64::from(image.height()) - 1;
    let clamp_x = |i: i64| i.clamp(0, max_x) as u32;
    let clamp_y = |i: i64| i.clamp(0, max_y) as u32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (clamp_x(x0), clamp_y(y0), (1.0 - fx) * (1.0 - fy)),
        (clamp_x(x0 + 1), clamp_y(y0), fx * (1.0 - fy)),
        (clamp_x(x0), clamp_y(y0 + 1), (1.0 - fx) * fy),
        (clamp_x(x0 + 1), clamp_y(y0 + 1), fx * fy),
    ];

    let mut alpha = 0.0;
    let mut color = [0.0f64; 3];
    for (tx, ty, weight) in taps {
        let [r, g, b, a] = image.pixel(tx, ty)?;
        let wa = weight * f64::from(a);
        alpha += wa;
        color[0] += wa * f64::from(r);
        color[1] += wa * f64::from(g);
        color[2] += wa * f64::from(b);
    }

    if alpha <= 0.0 {
        return Some([0; 4]);
    }
    let channel = |c: f64| (c / alpha).round().clamp(0.0, 255.0) as u8;
    Some([
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    /// Every pixel distinct: R = x, G = y.
    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8 * 10, y as u8 * 10, 0, 255]);
            }
        }
        DecodedImage::from_rgba8(width, height, pixels).unwrap()
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
        let pixels = rgba.repeat((width * height) as usize);
        DecodedImage::from_rgba8(width, height, pixels).unwrap()
    }

    #[test]
    fn zero_angle_is_identity() {
        let img = gradient(4, 3);
        assert_eq!(rotate(&img, 0.0, CanvasSizing::Swapped), img);
        assert_eq!(RotationRequest::NONE.apply(img.clone()), img);
        assert!(RotationRequest::degrees(0.0).is_identity());
    }

    #[test]
    fn non_zero_angle_swaps_dimensions() {
        let out = rotate(&gradient(4, 2), 0.3, CanvasSizing::Swapped);
        assert_eq!((out.width(), out.height()), (2, 4));
        assert_eq!(out.pixels().len(), 2 * 4 * 4);
    }

    #[test]
    fn there_and_back_restores_dimensions() {
        let img = gradient(6, 3);
        let there = RotationRequest::radians(0.7).apply(img.clone());
        let back = RotationRequest::radians(-0.7).apply(there);
        assert_eq!((back.width(), back.height()), (img.width(), img.height()));
    }

    #[test]
    fn there_and_back_keeps_the_interior_roughly() {
        let img = solid(9, 9, [40, 120, 200, 255]);
        let back = rotate(&rotate(&img, 0.4, CanvasSizing::Swapped), -0.4, CanvasSizing::Swapped);
        let [r, g, b, a] = back.pixel(4, 4).unwrap();
        for (got, want) in [(r, 40), (g, 120), (b, 200), (a, 255)] {
            assert!(got.abs_diff(want) <= 2, "{got} vs {want}");
        }
    }

    #[test]
    fn quarter_turn_maps_pixels_exactly() {
        let img = gradient(3, 2);
        let out = rotate(&img, FRAC_PI_2, CanvasSizing::Swapped);
        assert_eq!((out.width(), out.height()), (2, 3));
        for y in 0..out.height() {
            for x in 0..out.width() {
                // Clockwise on screen: source (i, j) lands on (H - 1 - j, i).
                let expected = img.pixel(y, img.height() - 1 - x);
                assert_eq!(out.pixel(x, y), expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn half_turn_on_square_mirrors_both_axes() {
        let img = gradient(3, 3);
        let out = RotationRequest::degrees(180.0).apply(img.clone());
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(out.pixel(x, y), img.pixel(2 - x, 2 - y));
            }
        }
    }

    #[test]
    fn corners_outside_the_source_are_transparent() {
        let out = rotate(&solid(8, 8, [255, 0, 0, 255]), FRAC_PI_4, CanvasSizing::Swapped);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(7, 7), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(4, 4), Some([255, 0, 0, 255]));
    }

    #[test]
    fn transparent_neighbours_do_not_bleed() {
        let mut pixels = Vec::new();
        for _y in 0..6 {
            for x in 0..6 {
                let px = if x < 3 { [255, 0, 0, 255] } else { [0, 255, 0, 0] };
                pixels.extend_from_slice(&px);
            }
        }
        let img = DecodedImage::from_rgba8(6, 6, pixels).unwrap();
        let out = rotate(&img, 0.2, CanvasSizing::Swapped);
        for chunk in out.pixels().chunks_exact(4) {
            if chunk[3] > 0 {
                assert_eq!(chunk[1], 0, "green leaked into {chunk:?}");
            }
        }
    }

    #[test]
    fn bounding_canvas_holds_the_whole_image() {
        let diagonal = RotationRequest::radians(FRAC_PI_4)
            .with_sizing(CanvasSizing::Bounding)
            .apply(solid(4, 2, [0, 0, 255, 255]));
        assert_eq!((diagonal.width(), diagonal.height()), (5, 5));

        let quarter = rotate(&solid(4, 2, [0, 0, 255, 255]), FRAC_PI_2, CanvasSizing::Bounding);
        assert_eq!((quarter.width(), quarter.height()), (2, 4));

        let half = rotate(&gradient(4, 2), PI, CanvasSizing::Bounding);
        assert_eq!((half.width(), half.height()), (4, 2));
        assert_eq!(half.pixel(0, 0), gradient(4, 2).pixel(3, 1));
    }

    #[test]
    fn empty_source_rotates_to_transparent_canvas() {
        let empty = DecodedImage::transparent(0, 4);

        let bounded = rotate(&empty, FRAC_PI_4, CanvasSizing::Bounding);
        assert_eq!((bounded.width(), bounded.height()), (3, 3));
        assert!(bounded.pixels().iter().all(|&b| b == 0));

        let swapped = rotate(&empty, FRAC_PI_4, CanvasSizing::Swapped);
        assert_eq!((swapped.width(), swapped.height()), (4, 0));
        assert!(swapped.pixels().is_empty());
    }
}
