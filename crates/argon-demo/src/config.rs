use std::ffi::OsString;
use std::path::PathBuf;

use argon_engine::{RotationRequest, TextureConfig};
use winit::dpi::LogicalSize;

/// Demo window and asset configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Directory holding `shaders/` and `textures/`.
    pub asset_root: PathBuf,

    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,

    /// Sampled as `texture1` on unit 0.
    pub base_texture: PathBuf,
    /// Sampled as `texture2` on unit 1, rotated by `overlay_rotation`.
    pub overlay_texture: PathBuf,
    pub overlay_rotation: RotationRequest,

    /// Weight of the overlay in the fragment shader's mix.
    pub mix_ratio: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::with_asset_root(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")))
    }
}

impl DemoConfig {
    pub fn with_asset_root(asset_root: PathBuf) -> Self {
        Self {
            title: "argon".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            vertex_shader: asset_root.join("shaders/simple_vert.glsl"),
            fragment_shader: asset_root.join("shaders/simple_frag.glsl"),
            base_texture: asset_root.join("textures/container.png"),
            overlay_texture: asset_root.join("textures/face.png"),
            overlay_rotation: RotationRequest::degrees(180.0),
            mix_ratio: 0.2,
            asset_root,
        }
    }

    /// First positional argument overrides the asset directory.
    pub fn from_args(mut args: impl Iterator<Item = OsString>) -> Self {
        match args.next() {
            Some(root) => Self::with_asset_root(PathBuf::from(root)),
            None => Self::default(),
        }
    }

    pub fn base_texture_config(&self) -> TextureConfig {
        TextureConfig::default().with_unit(0)
    }

    pub fn overlay_texture_config(&self) -> TextureConfig {
        TextureConfig::default()
            .with_unit(1)
            .with_rotation(self.overlay_rotation)
    }
}
