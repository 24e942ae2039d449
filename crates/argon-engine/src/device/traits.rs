use std::fmt;
use std::num::NonZeroU32;

use crate::shader::ShaderStage;

/// Driver-visible object name of a device handle.
///
/// GL object names are never zero once allocated; zero means "no object".
pub trait ObjectName {
    fn name(&self) -> NonZeroU32;
}

/// Sampler state settable on a 2D texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureParameter {
    WrapS,
    WrapT,
    MinFilter,
    MagFilter,
}

/// Operations the resource pipeline needs from a graphics context.
///
/// The shape follows OpenGL 3.3 core: shader and program objects with
/// status/log queries, name-based uniform lookup, and the 2D texture target.
/// Implementations are single-context and single-thread; `Gpu` enforces that.
///
/// Object creation may fail (context lost, out of names). Everything else is
/// fire-and-forget, matching how GL reports errors out of band.
pub trait GraphicsDevice {
    type Shader: ObjectName + Copy + Eq + fmt::Debug;
    type Program: ObjectName + Copy + Eq + fmt::Debug;
    type Texture: ObjectName + Copy + Eq + fmt::Debug;
    type UniformLocation: fmt::Debug;

    // ── shader objects ────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // ── program objects ───────────────────────────────────────────────────

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Resolves a uniform by name. `None` when the program has no active
    /// uniform with that name.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    /// Uniform setters apply to the program currently in use.
    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32);
    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32);

    /// Uploads a column-major 4x4 matrix.
    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, value: &[f32; 16]);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn delete_texture(&self, texture: Self::Texture);

    /// Selects texture unit `unit` (0-based) for subsequent binds.
    fn active_texture(&self, unit: u32);
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    fn tex_parameter_2d(&self, parameter: TextureParameter, value: i32);

    /// Uploads level 0 of the bound 2D texture as RGBA / unsigned byte.
    /// `pixels` is tightly packed, `width * height * 4` bytes.
    fn tex_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    fn generate_mipmap_2d(&self);
}
