//! A fly-through starfield rendered as textured point sprites. The vertex
//! shader scrolls the stars towards the viewer, sizes each point by its
//! depth and fades it in with `smoothstep`; the sprite texture is sampled
//! through `gl_PointCoord` and blended additively.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::math::*;
use glsamples::util::Lcg;
use glsamples::{color, ktx, shader};
use log::warn;

const NUM_STARS: usize = 2000;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 1) in vec4 color;

uniform float time;
uniform mat4 proj_matrix;

flat out vec4 starColor;

void main(void)
{
    vec4 newVertex = position;

    newVertex.z += time;
    newVertex.z = fract(newVertex.z);

    float size = (20.0 * newVertex.z * newVertex.z);

    starColor = smoothstep(1.0, 7.0, size) * color;

    newVertex.z = (999.9 * newVertex.z) - 1000.0;
    gl_Position = proj_matrix * newVertex;
    gl_PointSize = size;
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (location = 0) out vec4 color;

uniform sampler2D tex_star;
flat in vec4 starColor;

void main(void)
{
    color = starColor * texture(tex_star, gl_PointCoord);
}
"#;

#[repr(C)]
#[derive(Clone, Copy)]
struct Star {
    position: [f32; 3],
    color: [f32; 3],
}

#[derive(Default)]
struct StarField {
    program: GLuint,
    vao: GLuint,
    buffer: GLuint,
    texture: GLuint,
    time_location: GLint,
    proj_location: GLint,
}

/// A soft radial falloff sprite, used when no star texture ships with the
/// binary.
unsafe fn generated_star_sprite() -> GLuint {
    const SIZE: usize = 64;
    let mut data = vec![0u8; SIZE * SIZE * 4];
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = (x as f32 + 0.5) / SIZE as f32 - 0.5;
            let dy = (y as f32 + 0.5) / SIZE as f32 - 0.5;
            let d = (dx * dx + dy * dy).sqrt() * 2.0;
            let intensity = (1.0 - d).max(0.0).powi(2);
            let v = (intensity * 255.0) as u8;
            let p = (y * SIZE + x) * 4;
            data[p] = v;
            data[p + 1] = v;
            data[p + 2] = v;
            data[p + 3] = v;
        }
    }

    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(
        gl::TEXTURE_2D,
        ktx::mip_levels_for(SIZE as u32, SIZE as u32) as GLsizei,
        gl::RGBA8,
        SIZE as GLsizei,
        SIZE as GLsizei,
    );
    gl::TexSubImage2D(
        gl::TEXTURE_2D,
        0,
        0,
        0,
        SIZE as GLsizei,
        SIZE as GLsizei,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        data.as_ptr() as *const _,
    );
    gl::GenerateMipmap(gl::TEXTURE_2D);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
    texture
}

unsafe fn star_texture() -> GLuint {
    match ktx::load("media/textures/star.ktx") {
        Ok(texture) => texture.name,
        Err(err) => {
            warn!("Using a generated star sprite: {}.", err);
            generated_star_sprite()
        }
    }
}

impl App for StarField {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.time_location = shader::uniform_location(self.program, "time")?;
            self.proj_location = shader::uniform_location(self.program, "proj_matrix")?;

            self.texture = star_texture();

            let mut rng = Lcg::default();
            let mut stars = Vec::with_capacity(NUM_STARS);
            for _ in 0..NUM_STARS {
                stars.push(Star {
                    position: [
                        (rng.next_f32() * 2.0 - 1.0) * 100.0,
                        (rng.next_f32() * 2.0 - 1.0) * 100.0,
                        rng.next_f32(),
                    ],
                    color: [
                        0.8 + rng.next_f32() * 0.2,
                        0.8 + rng.next_f32() * 0.2,
                        0.8 + rng.next_f32() * 0.2,
                    ],
                });
            }

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            gl::GenBuffers(1, &mut self.buffer);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.buffer);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (NUM_STARS * std::mem::size_of::<Star>()) as GLsizeiptr,
                stars.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            let stride = std::mem::size_of::<Star>() as GLsizei;
            gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, stride, 0 as *const _);
            gl::VertexAttribPointer(1, 3, gl::FLOAT, gl::FALSE, stride, 12 as *const _);
            gl::EnableVertexAttribArray(0);
            gl::EnableVertexAttribArray(1);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        let t = (time * 0.1).fract() as f32;
        let proj = perspective(Deg(50.0f32), ctx.aspect_ratio(), 0.1, 1000.0);

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::Uniform1f(self.time_location, t);
            uniform_matrix(self.proj_location, &proj);

            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::ONE, gl::ONE);
            gl::Enable(gl::PROGRAM_POINT_SIZE);

            gl::BindTexture(gl::TEXTURE_2D, self.texture);
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(gl::POINTS, 0, NUM_STARS as GLsizei);

            gl::Disable(gl::BLEND);
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(1, &self.texture);
            gl::DeleteBuffers(1, &self.buffer);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Starfield"), StarField::default())
}
