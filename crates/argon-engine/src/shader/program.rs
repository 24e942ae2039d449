use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

use cgmath::Matrix4;

use super::{ShaderSource, ShaderStage};
use crate::device::{Gpu, GraphicsDevice, ObjectName};
use crate::error::{Error, Result};

/// Size of the buffer diagnostics are read into, terminator included.
///
/// Logs longer than this are cut at `INFO_LOG_CAPACITY - 1` bytes.
pub const INFO_LOG_CAPACITY: usize = 512;

/// A linked vertex + fragment program.
///
/// Either fully linked or never handed out: every failure path releases the
/// objects created so far. Dropping the value deletes the program.
pub struct ShaderProgram<'g, D: GraphicsDevice> {
    gpu: &'g Gpu<D>,
    program: D::Program,
}

impl<'g, D: GraphicsDevice> ShaderProgram<'g, D> {
    /// Builds a program from two stage sources.
    pub fn new(gpu: &'g Gpu<D>, vertex: &ShaderSource, fragment: &ShaderSource) -> Result<Self> {
        let vertex = vertex.text()?;
        let fragment = fragment.text()?;
        Self::from_sources(gpu, &vertex, &fragment)
    }

    /// Reads both stages from disk and builds the program.
    pub fn from_files(
        gpu: &'g Gpu<D>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::new(
            gpu,
            &ShaderSource::file(vertex_path.as_ref()),
            &ShaderSource::file(fragment_path.as_ref()),
        )
    }

    /// Builds a program from in-memory GLSL.
    pub fn from_sources(gpu: &'g Gpu<D>, vertex: &str, fragment: &str) -> Result<Self> {
        let device = gpu.device();

        let vertex = StageObject::compile(device, ShaderStage::Vertex, vertex)?;
        let fragment = StageObject::compile(device, ShaderStage::Fragment, fragment)?;

        let handle = device.create_program().map_err(|reason| {
            log::error!("couldn't create shader program: {reason}");
            Error::Device {
                object: "shader program",
                reason,
            }
        })?;
        // Owns the program from here on; an early return deletes it.
        let program = Self {
            gpu,
            program: handle,
        };

        device.attach_shader(handle, vertex.shader);
        device.attach_shader(handle, fragment.shader);
        device.link_program(handle);
        device.detach_shader(handle, vertex.shader);
        device.detach_shader(handle, fragment.shader);

        if !device.program_link_status(handle) {
            let log = diagnostic(device.program_info_log(handle), "program linking failed");
            log::error!("shader program linking failed:\n{log}");
            return Err(Error::Link { log });
        }

        log::debug!("linked shader program {}", handle.name());
        Ok(program)
    }

    /// Makes this program current for subsequent draw calls.
    pub fn use_program(&self) {
        self.gpu.device().use_program(Some(self.program));
    }

    /// Sets a `bool` uniform (uploaded as an integer, as GL requires).
    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_int(name, i32::from(value));
    }

    /// Sets an `int` or sampler uniform.
    ///
    /// Like every setter here this targets the program in use and is a
    /// no-op when `name` is not an active uniform.
    pub fn set_int(&self, name: &str, value: i32) {
        if let Some(location) = self.location(name) {
            self.gpu.device().uniform_1_i32(&location, value);
        }
    }

    pub fn set_float(&self, name: &str, value: f32) {
        if let Some(location) = self.location(name) {
            self.gpu.device().uniform_1_f32(&location, value);
        }
    }

    /// Sets a `mat4` uniform from a column-major matrix.
    pub fn set_mat4(&self, name: &str, value: &Matrix4<f32>) {
        if let Some(location) = self.location(name) {
            let columns: &[f32; 16] = value.as_ref();
            self.gpu.device().uniform_matrix_4_f32(&location, columns);
        }
    }

    /// Driver object name.
    pub fn id(&self) -> NonZeroU32 {
        self.program.name()
    }

    pub fn handle(&self) -> D::Program {
        self.program
    }

    fn location(&self, name: &str) -> Option<D::UniformLocation> {
        let location = self.gpu.device().uniform_location(self.program, name);
        if location.is_none() {
            log::trace!("program {}: no active uniform `{name}`", self.program.name());
        }
        location
    }
}

impl<D: GraphicsDevice> Drop for ShaderProgram<'_, D> {
    fn drop(&mut self) {
        log::debug!("deleting shader program {}", self.program.name());
        self.gpu.device().delete_program(self.program);
    }
}

impl<D: GraphicsDevice> fmt::Debug for ShaderProgram<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .finish()
    }
}

/// A compiled stage, deleted on drop.
struct StageObject<'d, D: GraphicsDevice> {
    device: &'d D,
    shader: D::Shader,
}

impl<'d, D: GraphicsDevice> StageObject<'d, D> {
    fn compile(device: &'d D, stage: ShaderStage, source: &str) -> Result<Self> {
        let shader = device.create_shader(stage).map_err(|reason| {
            log::error!("couldn't create {stage} shader: {reason}");
            Error::Device {
                object: match stage {
                    ShaderStage::Vertex => "vertex shader",
                    ShaderStage::Fragment => "fragment shader",
                },
                reason,
            }
        })?;
        let object = Self { device, shader };

        device.shader_source(shader, source);
        device.compile_shader(shader);

        if !device.shader_compile_status(shader) {
            let log = diagnostic(device.shader_info_log(shader), "compilation failed");
            log::error!("failed to compile {stage} shader:\n{log}");
            return Err(Error::Compile { stage, log });
        }
        Ok(object)
    }
}

impl<D: GraphicsDevice> Drop for StageObject<'_, D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.shader);
    }
}

/// Cuts `log` to what fits in an `INFO_LOG_CAPACITY` buffer. An empty log
/// (some drivers report failure without text) becomes `fallback`.
fn diagnostic(log: String, fallback: &str) -> String {
    let log = bounded_log(log);
    if log.trim().is_empty() {
        format!("{fallback} (no driver diagnostic)")
    } else {
        log
    }
}

fn bounded_log(mut log: String) -> String {
    if let Some(nul) = log.find('\0') {
        log.truncate(nul);
    }
    let limit = INFO_LOG_CAPACITY - 1;
    if log.len() > limit {
        let mut end = limit;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessDevice;
    use crate::device::headless::{ShaderScript, UniformKind, UniformValue};

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aTexCoord;

out vec2 TexCoord;

uniform mat4 mvp;

void main()
{
    gl_Position = mvp * vec4(aPos, 1.0);
    TexCoord = aTexCoord;
}
";

    const FRAGMENT: &str = "#version 330 core
out vec4 FragColor;

in vec2 TexCoord;

uniform sampler2D texture1;
uniform sampler2D texture2;
uniform float mixRatio;
uniform bool flipped;

void main()
{
    FragColor = mix(texture(texture1, TexCoord), texture(texture2, TexCoord), mixRatio);
}
";

    const FRAGMENT_MISSING_SEMICOLON: &str = "#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0, 0.0, 0.0, 1.0)
}
";

    const MISSING_SEMICOLON_LOG: &str =
        "0:7(1): error: syntax error, unexpected '}', expecting ',' or ';'\n";

    fn gpu() -> Gpu<HeadlessDevice> {
        let device = HeadlessDevice::new();
        device.script(VERTEX, ShaderScript::compiles().with_uniform("mvp", UniformKind::Mat4));
        device.script(
            FRAGMENT,
            ShaderScript::compiles()
                .with_uniform("texture1", UniformKind::Sampler2D)
                .with_uniform("texture2", UniformKind::Sampler2D)
                .with_uniform("mixRatio", UniformKind::Float)
                .with_uniform("flipped", UniformKind::Bool),
        );
        device.script(
            FRAGMENT_MISSING_SEMICOLON,
            ShaderScript::fails_to_compile(MISSING_SEMICOLON_LOG),
        );
        Gpu::new(device)
    }

    #[test]
    fn builds_and_releases_stage_objects() {
        let gpu = gpu();
        let program = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap();
        assert!(program.id().get() > 0);
        assert_eq!(gpu.device().live_shaders(), 0);
        assert_eq!(gpu.device().live_programs(), 1);
    }

    #[test]
    fn fragment_failure_after_vertex_success() {
        let gpu = gpu();
        let err =
            ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT_MISSING_SEMICOLON).unwrap_err();
        match err {
            Error::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, MISSING_SEMICOLON_LOG);
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert_eq!(gpu.device().live_shaders(), 0);
        assert_eq!(gpu.device().live_programs(), 0);
    }

    #[test]
    fn vertex_failure_reports_vertex_stage() {
        let gpu = gpu();
        let broken = VERTEX.replace("TexCoord = aTexCoord;", "TexCoord = aTexCoord");
        gpu.device().script(
            broken.as_str(),
            ShaderScript::fails_to_compile("0:13(1): error: syntax error\n"),
        );
        let err = ShaderProgram::from_sources(&gpu, &broken, FRAGMENT).unwrap_err();
        assert!(matches!(err, Error::Compile { stage: ShaderStage::Vertex, .. }));
        assert!(err.to_string().starts_with("vertex shader failed to compile"));
        assert_eq!(gpu.device().live_shaders(), 0);
    }

    #[test]
    fn link_failure_leaves_nothing_behind() {
        let gpu = gpu();
        let fragment = FRAGMENT.replace("in vec2 TexCoord;", "in vec3 TexCoord;");
        let log = "error: `TexCoord' declared as type `vec2' in vertex shader \
                   and type `vec3' in fragment shader\n";
        gpu.device()
            .script(fragment.as_str(), ShaderScript::compiles().with_link_error(log));

        let err = ShaderProgram::from_sources(&gpu, VERTEX, &fragment).unwrap_err();
        match err {
            Error::Link { log: reported } => assert_eq!(reported, log),
            other => panic!("expected link error, got {other:?}"),
        }
        assert_eq!(gpu.device().live_programs(), 0);
        assert_eq!(gpu.device().live_shaders(), 0);
    }

    #[test]
    fn empty_driver_log_still_explains_failure() {
        let gpu = gpu();
        gpu.device().script("silent", ShaderScript::fails_to_compile(""));
        let err = ShaderProgram::from_sources(&gpu, VERTEX, "silent").unwrap_err();
        let Error::Compile { log, .. } = err else {
            panic!("expected compile error");
        };
        assert!(log.contains("no driver diagnostic"), "{log}");
    }

    #[test]
    fn drop_deletes_program() {
        let gpu = gpu();
        let program = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap();
        drop(program);
        assert_eq!(gpu.device().live_programs(), 0);
    }

    #[test]
    fn use_program_makes_it_current() {
        let gpu = gpu();
        let program = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap();
        program.use_program();
        assert_eq!(gpu.device().current_program(), Some(program.handle()));
    }

    #[test]
    fn unknown_uniform_is_a_no_op() {
        let gpu = gpu();
        let program = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap();
        program.use_program();
        program.set_int("doesNotExist", 3);
        program.set_float("doesNotExist", 1.0);
        program.set_bool("doesNotExist", true);
        program.set_mat4("doesNotExist", &Matrix4::from_scale(2.0));
        assert!(gpu.device().errors().is_empty());
    }

    #[test]
    fn uniform_values_reach_the_program() {
        let gpu = gpu();
        let program = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap();
        program.use_program();

        program.set_int("texture2", 1);
        program.set_float("mixRatio", 0.2);
        program.set_bool("flipped", true);
        let mvp = Matrix4::from_translation(cgmath::vec3(1.0, 2.0, 3.0));
        program.set_mat4("mvp", &mvp);

        let device = gpu.device();
        let id = program.handle();
        assert_eq!(device.uniform_value(id, "texture2"), Some(UniformValue::Int(1)));
        assert_eq!(device.uniform_value(id, "mixRatio"), Some(UniformValue::Float(0.2)));
        assert_eq!(device.uniform_value(id, "flipped"), Some(UniformValue::Int(1)));
        let Some(UniformValue::Mat4(m)) = device.uniform_value(id, "mvp") else {
            panic!("mvp not set");
        };
        // Column-major: translation lives in the last column.
        assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
        assert!(device.errors().is_empty());
    }

    #[test]
    fn from_files_reads_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("simple_vert.glsl");
        let fs = dir.path().join("simple_frag.glsl");
        std::fs::write(&vs, VERTEX).unwrap();
        std::fs::write(&fs, FRAGMENT).unwrap();

        let gpu = gpu();
        let program = ShaderProgram::from_files(&gpu, &vs, &fs).unwrap();
        assert!(gpu.device().uniform_location(program.handle(), "mvp").is_some());

        let missing = dir.path().join("missing.glsl");
        let err = ShaderProgram::from_files(&gpu, &vs, missing).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(gpu.device().live_shaders(), 0);
    }

    #[test]
    fn device_refusal_is_reported() {
        let gpu = gpu();
        gpu.device().set_out_of_names(true);
        let err = ShaderProgram::from_sources(&gpu, VERTEX, FRAGMENT).unwrap_err();
        assert!(matches!(err, Error::Device { object: "vertex shader", .. }));
    }

    #[test]
    fn logs_are_bounded() {
        let long = "é".repeat(600);
        let bounded = bounded_log(long);
        assert!(bounded.len() <= INFO_LOG_CAPACITY - 1);
        assert!(bounded.chars().all(|c| c == 'é'));

        assert_eq!(bounded_log("short\0garbage".to_string()), "short");
    }

    #[test]
    fn empty_log_gets_fallback_text() {
        assert_eq!(
            diagnostic(String::new(), "compilation failed"),
            "compilation failed (no driver diagnostic)"
        );
    }
}
