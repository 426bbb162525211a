//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders,
//! and the [`Uniform`] trait for uploading uniform variables.

use std::{path::Path, sync::Arc};

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

use crate::error::{Error, Result};

/// The pipeline stage a [`Shader`] is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Reads a shader source file.
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Represents an individual compiled OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self> {
        unsafe {
            let shader = gl.create_shader(stage.gl_enum()).map_err(Error::Gl)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            let log = gl.get_shader_info_log(shader);
            if !gl.get_shader_compile_status(shader) {
                gl.delete_shader(shader);
                return Err(Error::ShaderCompile { stage, log });
            }
            if !log.trim().is_empty() {
                log::warn!(target: "shader_loader", "{stage} shader compiled with messages:\n{log}");
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// A value that can be uploaded into a uniform slot.
pub trait Uniform {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for bool {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl Uniform for i32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for f32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for Vec2 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32(Some(location), self.x, self.y) }
    }
}

impl Uniform for Vec3 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for Vec4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w) }
    }
}

impl Uniform for Mat4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref()) }
    }
}

impl<T: Uniform> Uniform for &T {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).upload(gl, location);
    }
}

/// A linked vertex + fragment program.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self> {
        unsafe {
            let program = gl.create_program().map_err(Error::Gl)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            let log = gl.get_program_info_log(program);
            if !gl.get_program_link_status(program) {
                gl.delete_program(program);
                return Err(Error::ProgramLink(log));
            }
            if !log.trim().is_empty() {
                log::warn!(target: "shader_loader", "Program linked with messages:\n{log}");
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
            })
        }
    }

    /// Reads, compiles and links a vertex/fragment pair from disk.
    ///
    /// The intermediate [`Shader`] objects are deleted once the program is linked.
    pub fn from_files(
        gl: &Arc<glow::Context>,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self> {
        log::info!(target: "shader_loader", "Reading vertex shader {}", vertex_path.display());
        let vertex_source = read_source(vertex_path)?;
        log::info!(target: "shader_loader", "Reading fragment shader {}", fragment_path.display());
        let fragment_source = read_source(fragment_path)?;

        log::info!(target: "shader_loader", "Compiling vertex shader");
        let vertex = Shader::new(gl, ShaderStage::Vertex, &vertex_source)?;
        log::info!(target: "shader_loader", "Compiling fragment shader");
        let fragment = Shader::new(gl, ShaderStage::Fragment, &fragment_source)?;

        log::info!(target: "shader_loader", "Linking program");
        let program = Self::new(gl, &[&vertex, &fragment])?;
        log::info!(target: "shader_loader", "Linked successfully");

        Ok(program)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Looks up a uniform once so it can be uploaded every frame without a name lookup.
    ///
    /// `None` means the driver does not know the name, usually because the
    /// uniform was optimized out.
    pub fn uniform_location(&self, name: &str) -> Option<glow::UniformLocation> {
        let location = unsafe { self.gl.get_uniform_location(self.id, name) };
        if location.is_none() {
            log::warn!(target: "shader_loader", "Uniform '{name}' not found in program");
        }
        location
    }

    /// Uploads to a previously resolved location. A missing location is a no-op.
    pub fn set_uniform_at<T: Uniform>(&self, location: Option<&glow::UniformLocation>, value: T) {
        if let Some(location) = location {
            value.upload(&self.gl, location);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_and_enums() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
        assert_eq!(ShaderStage::Vertex.gl_enum(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_enum(), glow::FRAGMENT_SHADER);
    }

    #[test]
    fn test_bundled_sources_declare_mvp() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let vert = read_source(&root.join("shaders/SimpleVertexShader.vert")).unwrap();
        let frag = read_source(&root.join("shaders/SimpleFragmentShader.frag")).unwrap();
        assert!(vert.starts_with("#version 330 core"));
        assert!(vert.contains("uniform mat4 MVP;"));
        assert!(frag.contains("texture_sampler"));
    }

    #[test]
    fn test_missing_source_names_path() {
        let err = read_source(Path::new("shaders/missing.vert")).unwrap_err();
        assert!(err.to_string().contains("shaders/missing.vert"), "{err}");
    }
}
