//! The smallest complete pipeline: one triangle pushed through every
//! programmable stage. The tessellator subdivides it, the geometry shader
//! turns the patches into points, and the result shows up as a dot grid in
//! wireframe colors.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::{color, shader};

const VS_SRC: &str = r#"
#version 450 core

void main(void)
{
    const vec4 vertices[3] = vec4[3](vec4( 0.25, -0.25, 0.5, 1.0),
                                     vec4(-0.25, -0.25, 0.5, 1.0),
                                     vec4( 0.25,  0.25, 0.5, 1.0));

    gl_Position = vertices[gl_VertexID];
}
"#;

const TCS_SRC: &str = r#"
#version 450 core

layout (vertices = 3) out;

void main(void)
{
    if (gl_InvocationID == 0)
    {
        gl_TessLevelInner[0] = 5.0;
        gl_TessLevelOuter[0] = 5.0;
        gl_TessLevelOuter[1] = 5.0;
        gl_TessLevelOuter[2] = 5.0;
    }

    gl_out[gl_InvocationID].gl_Position = gl_in[gl_InvocationID].gl_Position;
}
"#;

const TES_SRC: &str = r#"
#version 450 core

layout (triangles, equal_spacing, cw) in;

void main(void)
{
    gl_Position = (gl_TessCoord.x * gl_in[0].gl_Position) +
                  (gl_TessCoord.y * gl_in[1].gl_Position) +
                  (gl_TessCoord.z * gl_in[2].gl_Position);
}
"#;

const GS_SRC: &str = r#"
#version 450 core

layout (triangles) in;
layout (points, max_vertices = 3) out;

void main(void)
{
    for (int i = 0; i < gl_in.length(); i++)
    {
        gl_Position = gl_in[i].gl_Position;
        EmitVertex();
    }
}
"#;

const FS_SRC: &str = r#"
#version 450 core

out vec4 color;

void main(void)
{
    color = vec4(0.0, 0.8, 1.0, 1.0);
}
"#;

#[derive(Default)]
struct FirstApp {
    program: GLuint,
    vao: GLuint,
}

impl App for FirstApp {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::TESS_CONTROL_SHADER, TCS_SRC),
                (gl::TESS_EVALUATION_SHADER, TES_SRC),
                (gl::GEOMETRY_SHADER, GS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            gl::PolygonMode(gl::FRONT_AND_BACK, gl::LINE);
            gl::PointSize(5.0);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::OLIVE.as_ptr());

            gl::UseProgram(self.program);
            gl::DrawArrays(gl::PATCHES, 0, 3);
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
    app::run(AppConfig::for_sample("Tessellated triangle"), FirstApp::default())
}
