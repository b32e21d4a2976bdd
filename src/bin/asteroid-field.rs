//! Thirty thousand asteroids from a single draw call. The rock meshes are
//! packed into one vertex buffer, a command buffer holds one indirect draw
//! per asteroid, and a per-instance draw index drives procedural placement
//! in the vertex shader, so the whole field needs no per-object state on
//! the CPU at all.
//!
//! Controls: D switches between MultiDrawArraysIndirect and a loop of
//! individual draws, P pauses the motion. Press Escape to quit.

use std::mem;
use std::ptr;

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::math::*;
use glsamples::{color, mesh, shader};
use log::info;

const NUM_DRAWS: usize = 30000;
const ROCK_SHAPES: u32 = 16;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 1) in vec3 normal;
layout (location = 10) in uint draw_id;

uniform float time;
uniform mat4 viewproj_matrix;

out VS_OUT
{
    vec3 normal;
    vec4 color;
} vs_out;

float rand(uint seed)
{
    uint n = (seed << 13u) ^ seed;
    n = n * (n * n * 15731u + 789221u) + 1376312589u;
    return float(n & 0x7fffffffu) / float(0x7fffffff);
}

void main(void)
{
    float f0 = rand(draw_id * 4u + 0u);
    float f1 = rand(draw_id * 4u + 1u);
    float f2 = rand(draw_id * 4u + 2u);
    float f3 = rand(draw_id * 4u + 3u);

    float radius = 180.0 + f0 * 340.0;
    float speed = (0.02 + f1 * 0.04) * ((draw_id & 1u) == 0u ? 1.0 : -1.0);
    float angle = f3 * 6.283185 + time * speed;
    vec3 center = vec3(radius * cos(angle),
                       (f2 - 0.5) * 40.0,
                       radius * sin(angle) + 260.0);

    float spin = time * (0.2 + f2) * ((draw_id & 2u) == 0u ? 1.0 : -1.0) + f1 * 6.283185;
    float cs = cos(spin);
    float sn = sin(spin);
    mat3 rot = mat3(cs, 0.0, -sn,
                    0.0, 1.0, 0.0,
                    sn, 0.0, cs);

    float scale = 1.0 + f3 * 3.0;
    vec3 world = center + rot * (position.xyz * scale);

    vs_out.normal = rot * normal;
    vs_out.color = vec4(0.55 + f0 * 0.3, 0.45 + f1 * 0.3, 0.4 + f2 * 0.25, 1.0);
    gl_Position = viewproj_matrix * vec4(world, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

in VS_OUT
{
    vec3 normal;
    vec4 color;
} fs_in;

out vec4 color;

void main(void)
{
    vec3 n = normalize(fs_in.normal);
    float light = max(dot(n, normalize(vec3(0.3, 0.9, 0.2))), 0.0) * 0.8 + 0.2;
    color = vec4(fs_in.color.rgb * light, 1.0);
}
"#;

#[repr(C)]
struct DrawArraysIndirectCommand {
    count: u32,
    prim_count: u32,
    first: u32,
    base_instance: u32,
}

#[derive(Default)]
struct AsteroidField {
    program: GLuint,
    rocks: Option<mesh::Mesh>,
    indirect_buffer: GLuint,
    draw_index_buffer: GLuint,
    time_location: GLint,
    viewproj_location: GLint,
    manual_draw_loop: bool,
    paused: bool,
    total_time: f64,
    last_time: f64,
}

impl App for AsteroidField {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.time_location = shader::uniform_location(self.program, "time")?;
            self.viewproj_location = shader::uniform_location(self.program, "viewproj_matrix")?;

            let rocks = mesh::Mesh::new(&mesh::rock_set(ROCK_SHAPES, 0x5EED, 3))?;

            let commands: Vec<DrawArraysIndirectCommand> = (0..NUM_DRAWS)
                .map(|i| {
                    let sub = rocks.sub_object(i);
                    DrawArraysIndirectCommand {
                        count: sub.count,
                        prim_count: 1,
                        first: sub.first,
                        base_instance: i as u32,
                    }
                })
                .collect();

            gl::GenBuffers(1, &mut self.indirect_buffer);
            gl::BindBuffer(gl::DRAW_INDIRECT_BUFFER, self.indirect_buffer);
            gl::BufferData(
                gl::DRAW_INDIRECT_BUFFER,
                (commands.len() * mem::size_of::<DrawArraysIndirectCommand>()) as GLsizeiptr,
                commands.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            // The draw index feeds the shader the same value base_instance
            // carries on the indirect path, so both draw modes match.
            let draw_index: Vec<u32> = (0..NUM_DRAWS as u32).collect();

            gl::BindVertexArray(rocks.vao());
            gl::GenBuffers(1, &mut self.draw_index_buffer);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.draw_index_buffer);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (draw_index.len() * mem::size_of::<u32>()) as GLsizeiptr,
                draw_index.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
            gl::VertexAttribIPointer(10, 1, gl::UNSIGNED_INT, 0, 0 as *const _);
            gl::VertexAttribDivisor(10, 1);
            gl::EnableVertexAttribArray(10);

            self.rocks = Some(rocks);

            gl::Enable(gl::CULL_FACE);
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        if !self.paused {
            self.total_time += time - self.last_time;
        }
        self.last_time = time;
        let t = self.total_time as f32;

        let eye = Vec3::new(
            (t * 0.02).sin() * 120.0,
            (t * 0.023).cos() * 100.0,
            (t * 0.037).sin() * 300.0 - 600.0,
        );
        let up = Vec3::new(0.1 - (t * 0.1).cos() * 0.3, 1.0, 0.0).normalize();
        let view = look_at(eye, Vec3::new(0.0, 0.0, 260.0), up);
        let proj = perspective(Deg(50.0f32), ctx.aspect_ratio(), 1.0, 2000.0);
        let viewproj = proj * view;

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());
            gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, 1.0, 0);

            gl::UseProgram(self.program);
            gl::Uniform1f(self.time_location, t);
            uniform_matrix(self.viewproj_location, &viewproj);

            if let Some(rocks) = &self.rocks {
                gl::BindVertexArray(rocks.vao());
                if self.manual_draw_loop {
                    for i in 0..NUM_DRAWS {
                        let sub = rocks.sub_object(i);
                        gl::DrawArraysInstancedBaseInstance(
                            gl::TRIANGLES,
                            sub.first as GLint,
                            sub.count as GLsizei,
                            1,
                            i as GLuint,
                        );
                    }
                } else {
                    gl::MultiDrawArraysIndirect(gl::TRIANGLES, ptr::null(), NUM_DRAWS as GLsizei, 0);
                }
            }
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if action != Action::Press {
            return;
        }

        match key {
            Key::D => {
                self.manual_draw_loop = !self.manual_draw_loop;
                info!(
                    "Drawing with {}.",
                    if self.manual_draw_loop {
                        "one DrawArraysInstancedBaseInstance per asteroid"
                    } else {
                        "a single MultiDrawArraysIndirect"
                    }
                );
            }
            Key::P => {
                self.paused = !self.paused;
                info!("{}.", if self.paused { "Paused" } else { "Resumed" });
            }
            _ => {}
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(rocks) = &mut self.rocks {
                rocks.delete();
            }
            gl::DeleteBuffers(1, &self.draw_index_buffer);
            gl::DeleteBuffers(1, &self.indirect_buffer);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Asteroid field"), AsteroidField::default())
}
