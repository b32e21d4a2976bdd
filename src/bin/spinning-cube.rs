//! A field of tumbling cubes, colored by their object-space position. The
//! projection matrix lives in the app state and is rebuilt whenever the
//! window is resized.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::math::*;
use glsamples::{color, mesh, shader};

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;

out VS_OUT
{
    vec4 color;
} vs_out;

uniform mat4 mv_matrix;
uniform mat4 proj_matrix;

void main(void)
{
    gl_Position = proj_matrix * mv_matrix * position;
    vs_out.color = position * 2.0 + vec4(0.5, 0.5, 0.5, 0.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

out vec4 color;

in VS_OUT
{
    vec4 color;
} fs_in;

void main(void)
{
    color = fs_in.color;
}
"#;

struct SpinningCube {
    program: GLuint,
    cube: Option<mesh::Mesh>,
    mv_location: GLint,
    proj_location: GLint,
    proj: Mat4,
}

impl SpinningCube {
    fn new() -> Self {
        SpinningCube {
            program: 0,
            cube: None,
            mv_location: -1,
            proj_location: -1,
            proj: Mat4::identity(),
        }
    }
}

impl App for SpinningCube {
    fn startup(&mut self, ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.mv_location = shader::uniform_location(self.program, "mv_matrix")?;
            self.proj_location = shader::uniform_location(self.program, "proj_matrix")?;

            self.cube = Some(mesh::Mesh::new(&mesh::cube(0.25))?);
            self.proj = perspective(Deg(50.0f32), ctx.aspect_ratio(), 0.1, 1000.0);

            gl::Enable(gl::CULL_FACE);
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32;

        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::DARK_GREEN.as_ptr());
            gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, 1.0, 0);

            gl::UseProgram(self.program);
            uniform_matrix(self.proj_location, &self.proj);

            if let Some(cube) = &self.cube {
                for i in 0..24 {
                    let f = i as f32 + t * 0.3;
                    let mv = translate(0.0, 0.0, -20.0)
                        * rotate(t * 45.0, 0.0, 1.0, 0.0)
                        * rotate(t * 21.0, 1.0, 0.0, 0.0)
                        * translate(
                            (2.1 * f).sin() * 2.0,
                            (1.7 * f).cos() * 2.0,
                            (1.3 * f).sin() * (1.5 * f).cos() * 2.0,
                        );
                    uniform_matrix(self.mv_location, &mv);
                    cube.render();
                }
            }
        }

        Ok(())
    }

    fn on_resize(&mut self, _ctx: &mut Context, width: u32, height: u32) {
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        self.proj = perspective(Deg(50.0f32), aspect, 0.1, 1000.0);
        unsafe {
            gl::Viewport(0, 0, width as GLsizei, height as GLsizei);
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(cube) = &mut self.cube {
                cube.delete();
            }
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Spinning cubes"), SpinningCube::new())
}
