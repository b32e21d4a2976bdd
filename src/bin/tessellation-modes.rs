//! The four tessellation domains side by side: quads, triangles, triangles
//! emitted as points, and isolines wound into a spiral. One patch is drawn
//! in wireframe with fixed tessellation levels so the domain differences
//! stay visible.
//!
//! Controls: M cycles through the modes. Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::{color, shader};
use log::info;

const VS_SRC: &str = r#"
#version 450 core

void main(void)
{
    const vec4 vertices[] = vec4[](vec4( 0.4, -0.4, 0.5, 1.0),
                                   vec4(-0.4, -0.4, 0.5, 1.0),
                                   vec4( 0.4,  0.4, 0.5, 1.0),
                                   vec4(-0.4,  0.4, 0.5, 1.0));

    gl_Position = vertices[gl_VertexID];
}
"#;

const QUADS_TCS: &str = r#"
#version 450 core

layout (vertices = 4) out;

void main(void)
{
    if (gl_InvocationID == 0)
    {
        gl_TessLevelInner[0] = 9.0;
        gl_TessLevelInner[1] = 7.0;
        gl_TessLevelOuter[0] = 3.0;
        gl_TessLevelOuter[1] = 5.0;
        gl_TessLevelOuter[2] = 3.0;
        gl_TessLevelOuter[3] = 5.0;
    }

    gl_out[gl_InvocationID].gl_Position = gl_in[gl_InvocationID].gl_Position;
}
"#;

const QUADS_TES: &str = r#"
#version 450 core

layout (quads, equal_spacing, cw) in;

void main(void)
{
    vec4 p1 = mix(gl_in[0].gl_Position, gl_in[1].gl_Position, gl_TessCoord.x);
    vec4 p2 = mix(gl_in[2].gl_Position, gl_in[3].gl_Position, gl_TessCoord.x);
    gl_Position = mix(p1, p2, gl_TessCoord.y);
}
"#;

const TRIANGLES_TCS: &str = r#"
#version 450 core

layout (vertices = 3) out;

void main(void)
{
    if (gl_InvocationID == 0)
    {
        gl_TessLevelInner[0] = 5.0;
        gl_TessLevelOuter[0] = 8.0;
        gl_TessLevelOuter[1] = 8.0;
        gl_TessLevelOuter[2] = 8.0;
    }

    gl_out[gl_InvocationID].gl_Position = gl_in[gl_InvocationID].gl_Position;
}
"#;

const TRIANGLES_TES: &str = r#"
#version 450 core

layout (triangles, equal_spacing, cw) in;

void main(void)
{
    gl_Position = (gl_TessCoord.x * gl_in[0].gl_Position) +
                  (gl_TessCoord.y * gl_in[1].gl_Position) +
                  (gl_TessCoord.z * gl_in[2].gl_Position);
}
"#;

const POINTS_TES: &str = r#"
#version 450 core

layout (triangles, equal_spacing, cw, point_mode) in;

void main(void)
{
    gl_Position = (gl_TessCoord.x * gl_in[0].gl_Position) +
                  (gl_TessCoord.y * gl_in[1].gl_Position) +
                  (gl_TessCoord.z * gl_in[2].gl_Position);
}
"#;

const ISOLINES_TCS: &str = r#"
#version 450 core

layout (vertices = 4) out;

void main(void)
{
    if (gl_InvocationID == 0)
    {
        gl_TessLevelOuter[0] = 5.0;
        gl_TessLevelOuter[1] = 8.0;
    }

    gl_out[gl_InvocationID].gl_Position = gl_in[gl_InvocationID].gl_Position;
}
"#;

const ISOLINES_TES: &str = r#"
#version 450 core

layout (isolines, equal_spacing, cw) in;

void main(void)
{
    float r = (gl_TessCoord.y + gl_TessCoord.x / gl_TessLevelOuter[0]);
    float t = gl_TessCoord.x * 2.0 * 3.14159;

    gl_Position = vec4(sin(t) * r, cos(t) * r, 0.5, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

out vec4 color;

void main(void)
{
    color = vec4(1.0);
}
"#;

const MODE_NAMES: [&str; 4] = ["quads", "triangles", "triangles as points", "isolines"];

#[derive(Default)]
struct TessellationModes {
    programs: [GLuint; 4],
    vao: GLuint,
    mode: usize,
}

impl App for TessellationModes {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        let stages: [(&str, &str); 4] = [
            (QUADS_TCS, QUADS_TES),
            (TRIANGLES_TCS, TRIANGLES_TES),
            (TRIANGLES_TCS, POINTS_TES),
            (ISOLINES_TCS, ISOLINES_TES),
        ];

        unsafe {
            for (program, &(tcs, tes)) in self.programs.iter_mut().zip(&stages) {
                *program = shader::program(&[
                    (gl::VERTEX_SHADER, VS_SRC),
                    (gl::TESS_CONTROL_SHADER, tcs),
                    (gl::TESS_EVALUATION_SHADER, tes),
                    (gl::FRAGMENT_SHADER, FS_SRC),
                ])?;
            }

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            gl::PatchParameteri(gl::PATCH_VERTICES, 4);
            gl::PolygonMode(gl::FRONT_AND_BACK, gl::LINE);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.programs[self.mode]);
            gl::DrawArrays(gl::PATCHES, 0, 4);
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if key == Key::M && action == Action::Press {
            self.mode = (self.mode + 1) % self.programs.len();
            info!("Tessellation mode: {}.", MODE_NAMES[self.mode]);
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            for &program in &self.programs {
                gl::DeleteProgram(program);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Tessellation modes"), TessellationModes::default())
}
