//! In-memory graphics device.
//!
//! `HeadlessDevice` behaves like a GL 3.3 core driver without a GPU: it
//! allocates object names, tracks attachment and deferred deletion, uniform
//! values and texture storage, and records what a real driver would report as
//! `GL_INVALID_OPERATION`. Compile and link outcomes are scripted per source
//! with [`ShaderScript`]. Tests and GPU-less tools run the real shader/texture
//! builders against it.

mod script;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU32;

use super::{GraphicsDevice, ObjectName, TextureParameter};
use crate::shader::ShaderStage;

pub use script::{ShaderScript, UniformKind};

/// Object name handed out by the headless device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(NonZeroU32);

impl ObjectName for ObjectId {
    fn name(&self) -> NonZeroU32 {
        self.0
    }
}

/// Resolved uniform: owning program plus location index.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UniformSlot {
    program: ObjectId,
    location: i32,
}

impl UniformSlot {
    pub fn location(&self) -> i32 {
        self.location
    }
}

/// Last value written to a uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Mat4([f32; 16]),
}

/// Snapshot of a texture object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureState {
    pub parameters: HashMap<TextureParameter, i32>,
    /// `(width, height)` of level 0, once uploaded.
    pub size: Option<(u32, u32)>,
    pub pixels: Vec<u8>,
    pub mipmapped: bool,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: Option<ShaderScript>,
    info_log: String,
    /// Deleted while attached; freed once detached.
    delete_pending: bool,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ObjectId>,
    linked: bool,
    info_log: String,
    /// Location `i` is `uniforms[i]`.
    uniforms: Vec<(String, UniformKind)>,
    values: HashMap<i32, UniformValue>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    out_of_names: bool,
    scripts: HashMap<String, ShaderScript>,
    shaders: BTreeMap<ObjectId, ShaderObject>,
    programs: BTreeMap<ObjectId, ProgramObject>,
    textures: BTreeMap<ObjectId, TextureState>,
    current_program: Option<ObjectId>,
    active_unit: u32,
    unit_bindings: HashMap<u32, ObjectId>,
    errors: Vec<String>,
}

impl State {
    fn allocate(&mut self) -> Result<ObjectId, String> {
        if self.out_of_names {
            return Err("out of object names".to_string());
        }
        self.next_name += 1;
        NonZeroU32::new(self.next_name)
            .map(ObjectId)
            .ok_or_else(|| "object name space exhausted".to_string())
    }

    fn invalid_operation(&mut self, what: impl Into<String>) {
        let what = what.into();
        log::trace!("headless: GL_INVALID_OPERATION: {what}");
        self.errors.push(what);
    }

    fn bound_texture(&self) -> Option<ObjectId> {
        self.unit_bindings.get(&self.active_unit).copied()
    }

    fn release_shader_if_orphaned(&mut self, shader: ObjectId) {
        let attached = self.programs.values().any(|p| p.attached.contains(&shader));
        if !attached && self.shaders.get(&shader).is_some_and(|s| s.delete_pending) {
            self.shaders.remove(&shader);
        }
    }
}

/// GL-like device with no GPU behind it.
///
/// Interior mutability keeps the `&self` signature of `GraphicsDevice`; the
/// `RefCell` also keeps the type `!Sync`.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    state: RefCell<State>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outcome of compiling exactly `source`, replacing any earlier
    /// script for it.
    pub fn script(&self, source: impl Into<String>, script: ShaderScript) {
        self.state.borrow_mut().scripts.insert(source.into(), script);
    }

    /// Makes every subsequent object creation fail, as a lost context would.
    pub fn set_out_of_names(&self, out_of_names: bool) {
        self.state.borrow_mut().out_of_names = out_of_names;
    }

    /// Shader objects that still exist (including ones pending deletion).
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn current_program(&self) -> Option<ObjectId> {
        self.state.borrow().current_program
    }

    pub fn active_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    /// Texture bound to `GL_TEXTURE_2D` on `unit`.
    pub fn bound_texture(&self, unit: u32) -> Option<ObjectId> {
        self.state.borrow().unit_bindings.get(&unit).copied()
    }

    pub fn texture_state(&self, texture: ObjectId) -> Option<TextureState> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    /// Last value written to uniform `name` of `program`.
    pub fn uniform_value(&self, program: ObjectId, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|(n, _)| n == name)? as i32;
        program.values.get(&location).copied()
    }

    /// Errors a real driver would have raised, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

fn link(state: &State, program: &ProgramObject) -> Result<Vec<(String, UniformKind)>, String> {
    let mut vertex: Option<&ShaderScript> = None;
    let mut fragment: Option<&ShaderScript> = None;

    for id in &program.attached {
        let Some(shader) = state.shaders.get(id) else {
            continue;
        };
        let Some(script) = shader.compiled.as_ref() else {
            return Err(format!(
                "error: linking with uncompiled/unspecialized {} shader\n",
                shader.stage
            ));
        };
        let slot = match shader.stage {
            ShaderStage::Vertex => &mut vertex,
            ShaderStage::Fragment => &mut fragment,
        };
        if slot.replace(script).is_some() {
            return Err(format!("error: multiple {} shaders attached\n", shader.stage));
        }
    }

    let vertex = vertex.ok_or("error: program lacks a vertex shader\n")?;
    let fragment = fragment.ok_or("error: program lacks a fragment shader\n")?;

    if let Some(log) = vertex.link_log.as_ref().or(fragment.link_log.as_ref()) {
        return Err(log.clone());
    }

    let mut uniforms: Vec<(String, UniformKind)> = Vec::new();
    for (name, kind) in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match uniforms.iter().find(|(existing, _)| existing == name) {
            Some((_, existing)) if existing != kind => {
                return Err(format!(
                    "error: uniform `{name}' declared as {existing:?} and {kind:?}\n"
                ));
            }
            Some(_) => {}
            None => uniforms.push((name.clone(), *kind)),
        }
    }
    Ok(uniforms)
}

impl HeadlessDevice {
    fn set_uniform(&self, slot: &UniformSlot, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        if state.current_program != Some(slot.program) {
            state.invalid_operation(format!(
                "uniform location {} does not belong to the program in use",
                slot.location
            ));
            return;
        }
        let Some(program) = state.programs.get_mut(&slot.program) else {
            return;
        };
        let Some((name, kind)) = program.uniforms.get(slot.location as usize) else {
            return;
        };
        if !kind.accepts(&value) {
            let message = format!("uniform `{name}' of type {kind:?} set with {value:?}");
            state.invalid_operation(message);
            return;
        }
        program.values.insert(slot.location, value);
    }
}

impl GraphicsDevice for HeadlessDevice {
    type Shader = ObjectId;
    type Program = ObjectId;
    type Texture = ObjectId;
    type UniformLocation = UniformSlot;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: None,
                info_log: String::new(),
                delete_pending: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader) {
            object.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        let State {
            scripts, shaders, ..
        } = &mut *state;
        let Some(object) = shaders.get_mut(&shader) else {
            return;
        };
        let script = scripts.get(&object.source).cloned().unwrap_or_default();
        match script.compile_log.clone() {
            None => {
                object.compiled = Some(script);
                object.info_log.clear();
            }
            Some(log) => {
                object.compiled = None;
                object.info_log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled.is_some())
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.delete_pending = true;
        }
        state.release_shader_if_orphaned(shader);
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.programs.insert(id, ProgramObject::default());
        Ok(id)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.invalid_operation("attach of unknown shader");
            return;
        }
        if let Some(object) = state.programs.get_mut(&program) {
            if !object.attached.contains(&shader) {
                object.attached.push(shader);
            }
        }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.retain(|s| *s != shader);
        }
        state.release_shader_if_orphaned(shader);
    }

    fn link_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        let Some(object) = state.programs.get(&program) else {
            return;
        };
        let result = link(&state, object);
        let Some(object) = state.programs.get_mut(&program) else {
            return;
        };
        object.values.clear();
        match result {
            Ok(uniforms) => {
                object.linked = true;
                object.uniforms = uniforms;
                object.info_log.clear();
            }
            Err(log) => {
                object.linked = false;
                object.uniforms.clear();
                object.info_log = log;
            }
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        let Some(object) = state.programs.remove(&program) else {
            return;
        };
        if state.current_program == Some(program) {
            state.current_program = None;
        }
        for shader in object.attached {
            state.release_shader_if_orphaned(shader);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = program {
            if !state.programs.get(&id).is_some_and(|p| p.linked) {
                state.invalid_operation("use of a program that is not linked");
                return;
            }
        }
        state.current_program = program;
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let state = self.state.borrow();
        let object = state.programs.get(&program).filter(|p| p.linked)?;
        let location = object.uniforms.iter().position(|(n, _)| n == name)?;
        Some(UniformSlot {
            program,
            location: location as i32,
        })
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32) {
        self.set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32) {
        self.set_uniform(location, UniformValue::Float(value));
    }

    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, value: &[f32; 16]) {
        self.set_uniform(location, UniformValue::Mat4(*value));
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.textures.insert(id, TextureState::default());
        Ok(id)
    }

    fn delete_texture(&self, texture: Self::Texture) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        state.unit_bindings.retain(|_, bound| *bound != texture);
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        match texture {
            Some(id) if !state.textures.contains_key(&id) => {
                state.invalid_operation("bind of a deleted texture");
            }
            Some(id) => {
                state.unit_bindings.insert(unit, id);
            }
            None => {
                state.unit_bindings.remove(&unit);
            }
        }
    }

    fn tex_parameter_2d(&self, parameter: TextureParameter, value: i32) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.bound_texture() else {
            state.invalid_operation("texture parameter set with no texture bound");
            return;
        };
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.parameters.insert(parameter, value);
        }
    }

    fn tex_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.bound_texture() else {
            state.invalid_operation("image upload with no texture bound");
            return;
        };
        let expected = width as usize * height as usize * 4;
        if pixels.len() < expected {
            state.invalid_operation(format!(
                "pixel buffer of {} bytes is smaller than {width}x{height} RGBA",
                pixels.len()
            ));
            return;
        }
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.size = Some((width, height));
            texture.pixels = pixels[..expected].to_vec();
            texture.mipmapped = false;
        }
    }

    fn generate_mipmap_2d(&self) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.bound_texture() else {
            state.invalid_operation("mipmap generation with no texture bound");
            return;
        };
        let has_level0 = state.textures.get(&bound).is_some_and(|t| t.size.is_some());
        if !has_level0 {
            state.invalid_operation("mipmap generation on a texture with no level 0");
            return;
        }
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.mipmapped = true;
        }
    }
}
