//! Shader subroutines: one fragment shader with two interchangeable
//! colouring functions, switched every second through a subroutine uniform
//! instead of by relinking or swapping programs. The subroutine indices are
//! queried once at startup and written with UniformSubroutinesuiv before
//! each draw, since that state is not retained by the program object.
//!
//! Press Escape to quit.

use std::ffi::CString;

use failure::bail;
use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::shader;

const VS_SRC: &str = r#"
#version 450 core

void main(void)
{
    const vec4 vertices[4] = vec4[4](vec4(-1.0, -1.0, 0.5, 1.0),
                                     vec4( 1.0, -1.0, 0.5, 1.0),
                                     vec4(-1.0,  1.0, 0.5, 1.0),
                                     vec4( 1.0,  1.0, 0.5, 1.0));

    gl_Position = vertices[gl_VertexID];
}
"#;

const FS_SRC: &str = r#"
#version 450 core

subroutine vec4 sub_mySubroutine(vec4 param);

subroutine (sub_mySubroutine) vec4 myFunction1(vec4 param)
{
    return param * vec4(1.0, 0.25, 0.25, 1.0);
}

subroutine (sub_mySubroutine) vec4 myFunction2(vec4 param)
{
    return param * vec4(0.25, 0.25, 1.0, 1.0);
}

subroutine uniform sub_mySubroutine mySubroutineUniform;

out vec4 color;

void main(void)
{
    color = mySubroutineUniform(vec4(1.0));
}
"#;

#[derive(Default)]
struct Subroutines {
    program: GLuint,
    vao: GLuint,
    subroutines: [GLuint; 2],
}

unsafe fn subroutine_index(program: GLuint, name: &str) -> Result<GLuint> {
    let c_name = CString::new(name).unwrap();
    let index = gl::GetSubroutineIndex(program, gl::FRAGMENT_SHADER, c_name.as_ptr());
    if index == gl::INVALID_INDEX {
        bail!("subroutine `{}` not found in program {}", name, program);
    }
    Ok(index)
}

impl App for Subroutines {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.subroutines[0] = subroutine_index(self.program, "myFunction1")?;
            self.subroutines[1] = subroutine_index(self.program, "myFunction2")?;

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, time: f64) -> Result<()> {
        let active = self.subroutines[time as u64 as usize & 1];

        unsafe {
            gl::UseProgram(self.program);
            gl::UniformSubroutinesuiv(gl::FRAGMENT_SHADER, 1, &active);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Fragment subroutines"), Subroutines::default())
}
