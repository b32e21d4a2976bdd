//! Instanced rendering driven entirely by vertex attributes: one quad, four
//! instances, with per-instance color and offset pulled from attributes
//! whose divisor is set to one. All three attribute streams share a single
//! buffer object, filled section by section with `glBufferSubData`.
//!
//! Press Escape to quit.

use std::mem;

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::{color, shader};

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 1) in vec4 instance_color;
layout (location = 2) in vec4 instance_position;

out Fragment
{
    vec4 color;
} fragment;

void main(void)
{
    gl_Position = (position + instance_position) * vec4(0.25, 0.25, 1.0, 1.0);
    fragment.color = instance_color;
}
"#;

const FS_SRC: &str = r#"
#version 450 core

in Fragment
{
    vec4 color;
} fragment;

out vec4 color;

void main(void)
{
    color = fragment.color;
}
"#;

const SQUARE_VERTICES: [GLfloat; 16] = [
    -1.0, -1.0, 0.0, 1.0,
     1.0, -1.0, 0.0, 1.0,
     1.0,  1.0, 0.0, 1.0,
    -1.0,  1.0, 0.0, 1.0,
];

const INSTANCE_COLORS: [GLfloat; 16] = [
    1.0, 0.0, 0.0, 1.0,
    0.0, 1.0, 0.0, 1.0,
    0.0, 0.0, 1.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
];

const INSTANCE_POSITIONS: [GLfloat; 16] = [
    -2.0, -2.0, 0.0, 0.0,
     2.0, -2.0, 0.0, 0.0,
     2.0,  2.0, 0.0, 0.0,
    -2.0,  2.0, 0.0, 0.0,
];

#[derive(Default)]
struct InstancedAttributes {
    program: GLuint,
    vao: GLuint,
    buffer: GLuint,
}

impl App for InstancedAttributes {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            let section = mem::size_of_val(&SQUARE_VERTICES) as GLsizeiptr;

            gl::GenBuffers(1, &mut self.buffer);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.buffer);
            gl::BufferData(gl::ARRAY_BUFFER, section * 3, std::ptr::null(), gl::STATIC_DRAW);
            gl::BufferSubData(gl::ARRAY_BUFFER, 0, section, SQUARE_VERTICES.as_ptr() as *const _);
            gl::BufferSubData(gl::ARRAY_BUFFER, section, section, INSTANCE_COLORS.as_ptr() as *const _);
            gl::BufferSubData(gl::ARRAY_BUFFER, section * 2, section, INSTANCE_POSITIONS.as_ptr() as *const _);

            gl::VertexAttribPointer(0, 4, gl::FLOAT, gl::FALSE, 0, 0 as *const _);
            gl::VertexAttribPointer(1, 4, gl::FLOAT, gl::FALSE, 0, section as *const _);
            gl::VertexAttribPointer(2, 4, gl::FLOAT, gl::FALSE, 0, (section * 2) as *const _);
            gl::EnableVertexAttribArray(0);
            gl::EnableVertexAttribArray(1);
            gl::EnableVertexAttribArray(2);

            // One color and one offset per instance rather than per vertex.
            gl::VertexAttribDivisor(1, 1);
            gl::VertexAttribDivisor(2, 1);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::BindVertexArray(self.vao);
            gl::DrawArraysInstanced(gl::TRIANGLE_FAN, 0, 4, 4);
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
    app::run(AppConfig::for_sample("Instanced attributes"), InstancedAttributes::default())
}
