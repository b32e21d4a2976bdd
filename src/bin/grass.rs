//! Over a million grass blades from a single six-vertex strip, instanced
//! across a 1024 x 1024 field. Placement, orientation, blade length and
//! color are derived per instance inside the vertex shader, and the whole
//! field sways slowly while the camera orbits it.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::math::*;
use glsamples::{color, shader};

const NUM_BLADES: GLsizei = 1024 * 1024;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec2 blade_position;

uniform mat4 mvp_matrix;
uniform float time;

out GRASS_OUT
{
    vec4 color;
} vs_out;

// Cheap per-instance hash, just enough to break up the grid.
float hash(float n)
{
    return fract(sin(n) * 43758.5453123);
}

void main(void)
{
    int ix = gl_InstanceID & 1023;
    int iz = gl_InstanceID >> 10;

    float n0 = hash(float(gl_InstanceID) * 0.12345);
    float n1 = hash(float(gl_InstanceID) * 0.45321 + 7.0);
    float n2 = hash(float(gl_InstanceID) * 0.87341 + 3.0);
    float n3 = hash(float(gl_InstanceID) * 0.19873 + 11.0);

    // One blade per grid cell, jittered within the cell.
    vec2 cell = vec2(float(ix) - 512.0 + n0, float(iz) - 512.0 + n1);

    float angle = n2 * 6.283185;
    float c = cos(angle);
    float s = sin(angle);

    float length_scale = 0.7 + n3 * 0.6;
    float sway = sin(time * 1.5 + n0 * 6.283185) * 0.15;
    float bend = (n1 - 0.5) * 0.5 + sway * length_scale;

    vec2 blade = blade_position;
    blade.x += bend * blade_position.y * blade_position.y * 0.1;
    blade.y *= length_scale;

    vec3 world = vec3(blade.x * c, blade.y, -blade.x * s) + vec3(cell.x, 0.0, cell.y);

    gl_Position = mvp_matrix * vec4(world, 1.0);

    // Darker at the root, per-blade tint towards the tip.
    float shade = mix(0.25, 1.0, blade_position.y / 3.3);
    vec3 base = vec3(0.05 + n2 * 0.08, 0.3 + n3 * 0.4, 0.05);
    vs_out.color = vec4(base * shade, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

in GRASS_OUT
{
    vec4 color;
} fs_in;

out vec4 color;

void main(void)
{
    color = fs_in.color;
}
"#;

const GRASS_BLADE: [GLfloat; 12] = [
    -0.3, 0.0,
     0.3, 0.0,
    -0.2, 1.0,
     0.1, 1.3,
    -0.05, 2.3,
     0.0, 3.3,
];

#[derive(Default)]
struct Grass {
    program: GLuint,
    vao: GLuint,
    buffer: GLuint,
    mvp_location: GLint,
    time_location: GLint,
}

impl App for Grass {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.mvp_location = shader::uniform_location(self.program, "mvp_matrix")?;
            self.time_location = shader::uniform_location(self.program, "time")?;

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            gl::GenBuffers(1, &mut self.buffer);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.buffer);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(&GRASS_BLADE) as GLsizeiptr,
                GRASS_BLADE.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
            gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, 0, 0 as *const _);
            gl::EnableVertexAttribArray(0);

            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32 * 0.02;
        let r = 550.0;

        let mv = look_at(
            Vec3::new(t.sin() * r, 25.0, t.cos() * r),
            Vec3::new(0.0, -50.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let proj = perspective(Deg(45.0f32), ctx.aspect_ratio(), 0.1, 1000.0);
        let mvp = proj * mv;

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::SKY_BLUE.as_ptr());
            gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, 1.0, 0);

            gl::UseProgram(self.program);
            uniform_matrix(self.mvp_location, &mvp);
            gl::Uniform1f(self.time_location, time as GLfloat);

            gl::BindVertexArray(self.vao);
            gl::DrawArraysInstanced(gl::TRIANGLE_STRIP, 0, 6, NUM_BLADES);
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteBuffers(1, &self.buffer);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Grass field"), Grass::default())
}
