use crate::raster::RotationRequest;

/// Texture coordinate wrapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

impl WrapMode {
    /// GL enum passed to `glTexParameteri`.
    pub fn to_gl(self) -> i32 {
        let value = match self {
            WrapMode::Repeat => glow::REPEAT,
            WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
            WrapMode::ClampToBorder => glow::CLAMP_TO_BORDER,
        };
        value as i32
    }
}

/// Minification/magnification filter.
///
/// The `*Mipmap*` variants only make sense as a minification filter; GL
/// rejects them for magnification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl FilterMode {
    pub fn to_gl(self) -> i32 {
        let value = match self {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
            FilterMode::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
            FilterMode::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
            FilterMode::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
            FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        };
        value as i32
    }
}

/// Pixel layout of texture storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PixelFormat {
    /// 8-bit RGBA, unsigned normalized.
    #[default]
    Rgba8,
}

/// How a texture is sampled and prepared.
///
/// Defaults match the common case: repeat on both axes, linear filtering,
/// no unit selection, no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureConfig {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,

    /// Texture unit to leave the texture bound to after creation, for
    /// shaders sampling several textures at once.
    pub unit: Option<u32>,

    /// Applied to the decoded pixels before upload.
    pub rotation: RotationRequest,
}

impl TextureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrap(mut self, s: WrapMode, t: WrapMode) -> Self {
        self.wrap_s = s;
        self.wrap_t = t;
        self
    }

    pub fn with_filters(mut self, min: FilterMode, mag: FilterMode) -> Self {
        self.min_filter = min;
        self.mag_filter = mag;
        self
    }

    pub fn with_unit(mut self, unit: u32) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_rotation(mut self, rotation: RotationRequest) -> Self {
        self.rotation = rotation;
        self
    }
}
