//! A spring-mass cloth simulated entirely on the GPU with transform
//! feedback. Every vertex is a mass connected to its four neighbours, and a
//! vertex shader integrates the forces while rasterization is discarded,
//! ping-ponging between two sets of position and velocity buffers. Each
//! buffer doubles as a buffer texture so a vertex can fetch the positions
//! of its neighbours. The top row has no connections, which the integrator
//! treats as fixed.
//!
//! Controls: P and L toggle points and lines, + and - change the number of
//! simulation steps per frame. Press Escape to quit.

use std::ffi::CString;
use std::mem;

use failure::bail;
use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::{color, shader};
use log::info;

const POINTS_X: usize = 50;
const POINTS_Y: usize = 50;
const POINTS_TOTAL: usize = POINTS_X * POINTS_Y;
const CONNECTIONS_TOTAL: usize = (POINTS_X - 1) * POINTS_Y + POINTS_X * (POINTS_Y - 1);

const POSITION_A: usize = 0;
const VELOCITY_A: usize = 2;
const CONNECTION: usize = 4;

const UPDATE_VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position_mass;
layout (location = 1) in vec4 velocity;
layout (location = 2) in ivec4 connection;

layout (binding = 0) uniform samplerBuffer tex_position;

uniform float timestep = 0.07;
uniform float k = 7.1;
uniform float c = 2.8;
uniform float rest_length = 0.88;

const vec3 gravity = vec3(0.0, -0.08, 0.0);

out vec4 tf_position_mass;
out vec4 tf_velocity;

void main(void)
{
    vec3 p = position_mass.xyz;
    float m = position_mass.w;
    vec3 u = velocity.xyz;

    vec3 F = gravity * m - c * u;
    bool fixed_node = true;

    for (int i = 0; i < 4; i++)
    {
        if (connection[i] != -1)
        {
            vec3 q = texelFetch(tex_position, connection[i]).xyz;
            vec3 d = q - p;
            F += -k * (rest_length - length(d)) * normalize(d);
            fixed_node = false;
        }
    }

    if (fixed_node)
    {
        F = vec3(0.0);
        u = vec3(0.0);
    }

    vec3 a = F / m;
    vec3 s = clamp(u * timestep + 0.5 * a * timestep * timestep, vec3(-25.0), vec3(25.0));

    tf_position_mass = vec4(p + s, m);
    tf_velocity = vec4(u + a * timestep, 0.0);
}
"#;

const RENDER_VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position_mass;

void main(void)
{
    gl_Position = vec4(position_mass.xyz * (1.0 / 30.0), 1.0);
}
"#;

const RENDER_FS_SRC: &str = r#"
#version 450 core

out vec4 color;

void main(void)
{
    color = vec4(1.0);
}
"#;

struct SpringMass {
    update_program: GLuint,
    render_program: GLuint,
    vao: [GLuint; 2],
    vbo: [GLuint; 5],
    tbo: [GLuint; 2],
    index_buffer: GLuint,
    iteration: usize,
    iterations_per_frame: u32,
    draw_points: bool,
    draw_lines: bool,
}

impl Default for SpringMass {
    fn default() -> Self {
        SpringMass {
            update_program: 0,
            render_program: 0,
            vao: [0; 2],
            vbo: [0; 5],
            tbo: [0; 2],
            index_buffer: 0,
            iteration: 0,
            iterations_per_frame: 16,
            draw_points: true,
            draw_lines: true,
        }
    }
}

impl App for SpringMass {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            // The feedback varyings have to be in place before the link.
            let vs = shader::compile(gl::VERTEX_SHADER, UPDATE_VS_SRC)?;
            self.update_program = gl::CreateProgram();
            if self.update_program == 0 {
                gl::DeleteShader(vs);
                bail!("cannot create a program object");
            }
            let varyings = [
                CString::new("tf_position_mass").unwrap(),
                CString::new("tf_velocity").unwrap(),
            ];
            let pointers: Vec<*const GLchar> = varyings.iter().map(|v| v.as_ptr()).collect();
            gl::TransformFeedbackVaryings(self.update_program, 2, pointers.as_ptr(), gl::SEPARATE_ATTRIBS);
            let linked = shader::link_into(self.update_program, &[vs]);
            gl::DeleteShader(vs);
            linked?;

            self.render_program = shader::program(&[
                (gl::VERTEX_SHADER, RENDER_VS_SRC),
                (gl::FRAGMENT_SHADER, RENDER_FS_SRC),
            ])?;

            let mut initial_positions = Vec::with_capacity(POINTS_TOTAL);
            let mut connections: Vec<[i32; 4]> = Vec::with_capacity(POINTS_TOTAL);
            for iy in 0..POINTS_Y {
                for ix in 0..POINTS_X {
                    let n = (iy * POINTS_X + ix) as i32;
                    initial_positions.push([
                        ix as f32 - POINTS_X as f32 * 0.5 + 0.5,
                        iy as f32 - POINTS_Y as f32 * 0.5 + 0.5,
                        0.0f32,
                        1.0,
                    ]);
                    if iy == POINTS_Y - 1 {
                        connections.push([-1; 4]);
                    } else {
                        connections.push([
                            if ix > 0 { n - 1 } else { -1 },
                            if iy > 0 { n - POINTS_X as i32 } else { -1 },
                            if ix < POINTS_X - 1 { n + 1 } else { -1 },
                            n + POINTS_X as i32,
                        ]);
                    }
                }
            }

            let mut lines: Vec<u32> = Vec::with_capacity(CONNECTIONS_TOTAL * 2);
            for iy in 0..POINTS_Y {
                for ix in 0..POINTS_X - 1 {
                    let n = (iy * POINTS_X + ix) as u32;
                    lines.push(n);
                    lines.push(n + 1);
                }
            }
            for iy in 0..POINTS_Y - 1 {
                for ix in 0..POINTS_X {
                    let n = (iy * POINTS_X + ix) as u32;
                    lines.push(n);
                    lines.push(n + POINTS_X as u32);
                }
            }

            gl::GenVertexArrays(2, self.vao.as_mut_ptr());
            gl::GenBuffers(5, self.vbo.as_mut_ptr());
            gl::GenBuffers(1, &mut self.index_buffer);

            let zero_velocities = vec![[0.0f32; 4]; POINTS_TOTAL];
            for i in 0..2 {
                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[POSITION_A + i]);
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    (POINTS_TOTAL * mem::size_of::<[f32; 4]>()) as GLsizeiptr,
                    initial_positions.as_ptr() as *const _,
                    gl::DYNAMIC_COPY,
                );
                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[VELOCITY_A + i]);
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    (POINTS_TOTAL * mem::size_of::<[f32; 4]>()) as GLsizeiptr,
                    zero_velocities.as_ptr() as *const _,
                    gl::DYNAMIC_COPY,
                );
            }
            gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[CONNECTION]);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (POINTS_TOTAL * mem::size_of::<[i32; 4]>()) as GLsizeiptr,
                connections.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            for i in 0..2 {
                gl::BindVertexArray(self.vao[i]);

                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[POSITION_A + i]);
                gl::VertexAttribPointer(0, 4, gl::FLOAT, gl::FALSE, 0, 0 as *const _);
                gl::EnableVertexAttribArray(0);

                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[VELOCITY_A + i]);
                gl::VertexAttribPointer(1, 4, gl::FLOAT, gl::FALSE, 0, 0 as *const _);
                gl::EnableVertexAttribArray(1);

                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo[CONNECTION]);
                gl::VertexAttribIPointer(2, 4, gl::INT, 0, 0 as *const _);
                gl::EnableVertexAttribArray(2);

                // The element binding is part of VAO state, so record it in
                // both of them.
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.index_buffer);
                if i == 0 {
                    gl::BufferData(
                        gl::ELEMENT_ARRAY_BUFFER,
                        (lines.len() * mem::size_of::<u32>()) as GLsizeiptr,
                        lines.as_ptr() as *const _,
                        gl::STATIC_DRAW,
                    );
                }
            }

            gl::GenTextures(2, self.tbo.as_mut_ptr());
            for i in 0..2 {
                gl::BindTexture(gl::TEXTURE_BUFFER, self.tbo[i]);
                gl::TexBuffer(gl::TEXTURE_BUFFER, gl::RGBA32F, self.vbo[POSITION_A + i]);
            }

            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::UseProgram(self.update_program);
            gl::Enable(gl::RASTERIZER_DISCARD);

            for _ in 0..self.iterations_per_frame {
                let src = self.iteration & 1;
                let dst = src ^ 1;

                gl::BindVertexArray(self.vao[src]);
                gl::BindTexture(gl::TEXTURE_BUFFER, self.tbo[src]);
                gl::BindBufferBase(gl::TRANSFORM_FEEDBACK_BUFFER, 0, self.vbo[POSITION_A + dst]);
                gl::BindBufferBase(gl::TRANSFORM_FEEDBACK_BUFFER, 1, self.vbo[VELOCITY_A + dst]);

                gl::BeginTransformFeedback(gl::POINTS);
                gl::DrawArrays(gl::POINTS, 0, POINTS_TOTAL as GLsizei);
                gl::EndTransformFeedback();

                self.iteration += 1;
            }

            gl::Disable(gl::RASTERIZER_DISCARD);

            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.render_program);
            gl::BindVertexArray(self.vao[self.iteration & 1]);

            if self.draw_points {
                gl::PointSize(4.0);
                gl::DrawArrays(gl::POINTS, 0, POINTS_TOTAL as GLsizei);
            }
            if self.draw_lines {
                gl::DrawElements(
                    gl::LINES,
                    (CONNECTIONS_TOTAL * 2) as GLsizei,
                    gl::UNSIGNED_INT,
                    0 as *const _,
                );
            }
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if action != Action::Press {
            return;
        }

        match key {
            Key::P => {
                self.draw_points = !self.draw_points;
                return;
            }
            Key::L => {
                self.draw_lines = !self.draw_lines;
                return;
            }
            Key::Add | Key::Equals => {
                self.iterations_per_frame = (self.iterations_per_frame + 1).min(64);
            }
            Key::Subtract | Key::Minus => {
                self.iterations_per_frame = (self.iterations_per_frame - 1).max(1);
            }
            _ => return,
        }
        info!("{} simulation steps per frame.", self.iterations_per_frame);
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(2, self.tbo.as_ptr());
            gl::DeleteBuffers(1, &self.index_buffer);
            gl::DeleteBuffers(5, self.vbo.as_ptr());
            gl::DeleteVertexArrays(2, self.vao.as_ptr());
            gl::DeleteProgram(self.render_program);
            gl::DeleteProgram(self.update_program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Spring-mass cloth"), SpringMass::default())
}
