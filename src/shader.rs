//! GLSL compilation and linking helpers.
//!
//! The demos keep their shader sources as string constants next to the code
//! that uses them, so all this module has to do is turn sources into program
//! objects and surface the driver's info log when that fails.

use std::ffi::CString;
use std::ptr;

use gl::types::*;

use crate::errors::Result;

/// Compiles a single shader stage from source.
pub unsafe fn compile(stage: GLenum, src: &str) -> Result<GLuint> {
    let shader = gl::CreateShader(stage);
    if shader == 0 {
        bail!("failed to create shader object for stage 0x{:04x}", stage);
    }

    let source = CString::new(src.as_bytes()).unwrap();
    gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    let mut status = GLint::from(gl::FALSE);
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
    if status != GLint::from(gl::TRUE) {
        let reason = shader_info_log(shader);
        gl::DeleteShader(shader);
        bail!("shader compilation failed:\n{}", reason);
    }

    Ok(shader)
}

/// Links shader stages into `program`, which the caller has already created
/// and configured. This is the entry point for programs that need pre-link
/// state such as transform feedback varyings.
pub unsafe fn link_into(program: GLuint, shaders: &[GLuint]) -> Result<()> {
    for &shader in shaders {
        gl::AttachShader(program, shader);
    }

    gl::LinkProgram(program);

    let mut status = GLint::from(gl::FALSE);
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
    if status != GLint::from(gl::TRUE) {
        bail!("program link failed:\n{}", program_info_log(program));
    }

    Ok(())
}

/// Links shader stages into a fresh program object.
pub unsafe fn link(shaders: &[GLuint]) -> Result<GLuint> {
    let program = gl::CreateProgram();
    if let Err(err) = link_into(program, shaders) {
        gl::DeleteProgram(program);
        return Err(err);
    }

    Ok(program)
}

/// Compiles all stages, links them, and releases the intermediate shader
/// objects. `stages` pairs a stage enum such as `gl::VERTEX_SHADER` with its
/// source.
pub unsafe fn program(stages: &[(GLenum, &str)]) -> Result<GLuint> {
    let mut shaders = Vec::with_capacity(stages.len());
    for &(stage, src) in stages {
        match compile(stage, src) {
            Ok(shader) => shaders.push(shader),
            Err(err) => {
                for &shader in &shaders {
                    gl::DeleteShader(shader);
                }
                return Err(err);
            }
        }
    }

    let linked = link(&shaders);
    for &shader in &shaders {
        gl::DeleteShader(shader);
    }

    linked
}

/// Looks up a uniform location, failing loudly when the uniform does not
/// exist or has been optimized away.
pub unsafe fn uniform_location(program: GLuint, name: &str) -> Result<GLint> {
    let c_name = CString::new(name.as_bytes()).unwrap();
    let location = gl::GetUniformLocation(program, c_name.as_ptr());
    if location < 0 {
        bail!("uniform `{}` not found in program {}", name, program);
    }

    Ok(location)
}

unsafe fn shader_info_log(shader: GLuint) -> String {
    let mut len = 0;
    gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
    truncate_at_nul(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn program_info_log(program: GLuint) -> String {
    let mut len = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
    truncate_at_nul(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn truncate_at_nul(buf: &mut Vec<u8>) {
    if let Some(pos) = buf.iter().position(|&v| v == 0) {
        buf.truncate(pos);
    }
}
