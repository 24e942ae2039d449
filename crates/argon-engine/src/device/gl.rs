use std::num::NonZeroU32;

use glow::HasContext;

use super::{GraphicsDevice, ObjectName, TextureParameter};
use crate::shader::ShaderStage;

/// OpenGL backend over a `glow::Context`.
///
/// The context must be current on the calling thread for every call. Wrap the
/// device in `Gpu` to have that checked.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Raw context for host-side work (vertex arrays, buffers, draw calls).
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

impl std::fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowDevice").finish_non_exhaustive()
    }
}

impl ObjectName for glow::NativeShader {
    fn name(&self) -> NonZeroU32 {
        self.0
    }
}

impl ObjectName for glow::NativeProgram {
    fn name(&self) -> NonZeroU32 {
        self.0
    }
}

impl ObjectName for glow::NativeTexture {
    fn name(&self) -> NonZeroU32 {
        self.0
    }
}

fn stage_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn parameter_name(parameter: TextureParameter) -> u32 {
    match parameter {
        TextureParameter::WrapS => glow::TEXTURE_WRAP_S,
        TextureParameter::WrapT => glow::TEXTURE_WRAP_T,
        TextureParameter::MinFilter => glow::TEXTURE_MIN_FILTER,
        TextureParameter::MagFilter => glow::TEXTURE_MAG_FILTER,
    }
}

// Safety (all methods): glow entry points are unsafe because they require a
// current context on this thread. `Gpu` pins the device to that thread, and
// every handle passed in was produced by this same context.
impl GraphicsDevice for GlowDevice {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Texture = glow::NativeTexture;
    type UniformLocation = glow::NativeUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage_kind(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), value) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, value: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, value.as_slice())
        }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { self.gl.create_texture() }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn tex_parameter_2d(&self, parameter: TextureParameter, value: i32) {
        unsafe {
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, parameter_name(parameter), value)
        }
    }

    fn tex_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            // Rows are tightly packed.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width.min(i32::MAX as u32) as i32,
                height.min(i32::MAX as u32) as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn generate_mipmap_2d(&self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }
}
