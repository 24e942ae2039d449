use anyhow::{Context, Result};
use argon_engine::math::multi_rotate_3d;
use argon_engine::{GlowDevice, Gpu, ShaderProgram, Texture};
use bytemuck::{Pod, Zeroable};
use cgmath::{Deg, Matrix4, Rad, Vector3, perspective, vec3};
use glow::HasContext;
use ouroboros::self_referencing;

use crate::config::DemoConfig;

/// Everything the demo draws, owned together with the device it lives on.
///
/// Resources borrow the `Gpu`, and are dropped before it. The GL context must
/// still be current when a `Scene` is dropped.
#[self_referencing]
pub struct Scene {
    gpu: Gpu<GlowDevice>,

    #[borrows(gpu)]
    #[covariant]
    resources: SceneResources<'this>,
}

pub struct SceneResources<'g> {
    program: ShaderProgram<'g, GlowDevice>,
    base: Texture<'g, GlowDevice>,
    overlay: Texture<'g, GlowDevice>,
    cube: CubeMesh<'g>,
    projection: Matrix4<f32>,
}

impl Scene {
    pub fn load(gl: glow::Context, config: &DemoConfig, aspect: f32) -> Result<Self> {
        SceneTryBuilder {
            gpu: Gpu::new(GlowDevice::new(gl)),
            resources_builder: |gpu| SceneResources::load(gpu, config, aspect),
        }
        .try_build()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let gl = self.borrow_gpu().device().gl();
        unsafe { gl.viewport(0, 0, width as i32, height as i32) };

        let aspect = width as f32 / height as f32;
        self.with_resources_mut(|resources| resources.projection = projection(aspect));
    }

    pub fn set_wireframe(&self, wireframe: bool) {
        let mode = if wireframe { glow::LINE } else { glow::FILL };
        let gl = self.borrow_gpu().device().gl();
        unsafe { gl.polygon_mode(glow::FRONT_AND_BACK, mode) };
    }

    /// Draws one frame; `seconds` drives the spin.
    pub fn draw(&self, seconds: f32) {
        let gl = self.borrow_gpu().device().gl();
        let resources = self.borrow_resources();

        unsafe {
            gl.clear_color(0.2, 0.3, 0.3, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        resources.program.use_program();
        resources.base.bind_to_unit(0);
        resources.overlay.bind_to_unit(1);

        let view = Matrix4::from_translation(vec3(0.0, 0.0, -3.0));
        let view_projection = resources.projection * view;

        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            let angle = Deg(20.0 * i as f32 + 25.0 * seconds);
            let model = Matrix4::from_translation(Vector3::from(*position))
                * multi_rotate_3d(Rad::from(angle), 1.0, 0.3, 0.5);
            resources.program.set_mat4("mvp", &(view_projection * model));
            resources.cube.draw();
        }
    }
}

impl<'g> SceneResources<'g> {
    fn load(gpu: &'g Gpu<GlowDevice>, config: &DemoConfig, aspect: f32) -> Result<Self> {
        let program = ShaderProgram::from_files(gpu, &config.vertex_shader, &config.fragment_shader)
            .context("failed to build cube shader")?;

        let base = Texture::load(gpu, &config.base_texture, &config.base_texture_config())
            .with_context(|| format!("failed to load {}", config.base_texture.display()))?;
        let overlay = Texture::load(gpu, &config.overlay_texture, &config.overlay_texture_config())
            .with_context(|| format!("failed to load {}", config.overlay_texture.display()))?;

        let cube = CubeMesh::upload(gpu.device().gl())?;

        // Samplers are fixed to units for the whole run.
        program.use_program();
        program.set_int("texture1", 0);
        program.set_int("texture2", 1);
        program.set_float("mixRatio", config.mix_ratio);

        unsafe { gpu.device().gl().enable(glow::DEPTH_TEST) };

        Ok(Self {
            program,
            base,
            overlay,
            cube,
            projection: projection(aspect),
        })
    }
}

fn projection(aspect: f32) -> Matrix4<f32> {
    perspective(Deg(45.0), aspect, 0.1, 100.0)
}

// ── cube geometry ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

const fn v(x: f32, y: f32, z: f32, u: f32, t: f32) -> Vertex {
    Vertex {
        position: [x, y, z],
        uv: [u, t],
    }
}

#[rustfmt::skip]
const CUBE_VERTICES: [Vertex; 36] = [
    v(-0.5, -0.5, -0.5, 0.0, 0.0), v( 0.5, -0.5, -0.5, 1.0, 0.0), v( 0.5,  0.5, -0.5, 1.0, 1.0),
    v( 0.5,  0.5, -0.5, 1.0, 1.0), v(-0.5,  0.5, -0.5, 0.0, 1.0), v(-0.5, -0.5, -0.5, 0.0, 0.0),

    v(-0.5, -0.5,  0.5, 0.0, 0.0), v( 0.5, -0.5,  0.5, 1.0, 0.0), v( 0.5,  0.5,  0.5, 1.0, 1.0),
    v( 0.5,  0.5,  0.5, 1.0, 1.0), v(-0.5,  0.5,  0.5, 0.0, 1.0), v(-0.5, -0.5,  0.5, 0.0, 0.0),

    v(-0.5,  0.5,  0.5, 1.0, 0.0), v(-0.5,  0.5, -0.5, 1.0, 1.0), v(-0.5, -0.5, -0.5, 0.0, 1.0),
    v(-0.5, -0.5, -0.5, 0.0, 1.0), v(-0.5, -0.5,  0.5, 0.0, 0.0), v(-0.5,  0.5,  0.5, 1.0, 0.0),

    v( 0.5,  0.5,  0.5, 1.0, 0.0), v( 0.5,  0.5, -0.5, 1.0, 1.0), v( 0.5, -0.5, -0.5, 0.0, 1.0),
    v( 0.5, -0.5, -0.5, 0.0, 1.0), v( 0.5, -0.5,  0.5, 0.0, 0.0), v( 0.5,  0.5,  0.5, 1.0, 0.0),

    v(-0.5, -0.5, -0.5, 0.0, 1.0), v( 0.5, -0.5, -0.5, 1.0, 1.0), v( 0.5, -0.5,  0.5, 1.0, 0.0),
    v( 0.5, -0.5,  0.5, 1.0, 0.0), v(-0.5, -0.5,  0.5, 0.0, 0.0), v(-0.5, -0.5, -0.5, 0.0, 1.0),

    v(-0.5,  0.5, -0.5, 0.0, 1.0), v( 0.5,  0.5, -0.5, 1.0, 1.0), v( 0.5,  0.5,  0.5, 1.0, 0.0),
    v( 0.5,  0.5,  0.5, 1.0, 0.0), v(-0.5,  0.5,  0.5, 0.0, 0.0), v(-0.5,  0.5, -0.5, 0.0, 1.0),
];

const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

/// Vertex array + buffer for the unit cube, deleted on drop.
struct CubeMesh<'g> {
    gl: &'g glow::Context,
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
}

impl<'g> CubeMesh<'g> {
    fn upload(gl: &'g glow::Context) -> Result<Self> {
        let stride = size_of::<Vertex>() as i32;
        let uv_offset = size_of::<[f32; 3]>() as i32;

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| anyhow::anyhow!("couldn't create vertex array: {e}"))?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    anyhow::bail!("couldn't create vertex buffer: {e}");
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&CUBE_VERTICES),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, uv_offset);
            gl.enable_vertex_attrib_array(1);

            gl.bind_vertex_array(None);

            Ok(Self { gl, vao, vbo })
        }
    }

    fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, CUBE_VERTICES.len() as i32);
        }
    }
}

impl Drop for CubeMesh<'_> {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
        }
    }
}
