//! A 24x16 grid of tiles, each sampling its own texture, drawn with one
//! instanced call and no texture binds at draw time. Every texture is
//! turned into an ARB_bindless_texture handle, made resident, and the 384
//! handles are uploaded once into a uniform block the fragment shader
//! indexes directly. The mip levels are solid colours, so the pulsing zoom
//! makes the NEAREST_MIPMAP_NEAREST level selection visible.
//!
//! Fails at startup when the driver lacks ARB_bindless_texture. Press
//! Escape to quit.

use std::f32::consts::PI;
use std::mem;

use failure::bail;
use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::{color, ext, shader};
use log::info;

const NUM_TEXTURES: usize = 384;

const VS_SRC: &str = r#"
#version 450 core

uniform float time;

out VS_OUT
{
    vec2 tc;
    flat int index;
} vs_out;

void main(void)
{
    const vec2 corners[4] = vec2[4](vec2(0.0, 0.0),
                                    vec2(1.0, 0.0),
                                    vec2(0.0, 1.0),
                                    vec2(1.0, 1.0));

    const vec2 grid = vec2(24.0, 16.0);

    vec2 cell = vec2(float(gl_InstanceID % 24), float(gl_InstanceID / 24));
    vec2 corner = corners[gl_VertexID];

    float zoom = 1.0 + 7.0 * (0.5 + 0.5 * sin(time * 0.5 + float(gl_InstanceID) * 0.3));

    vs_out.tc = corner * zoom;
    vs_out.index = gl_InstanceID;

    vec2 pos = ((cell + 0.04 + corner * 0.92) / grid) * 2.0 - 1.0;
    gl_Position = vec4(pos, 0.5, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core
#extension GL_ARB_bindless_texture : require

layout (binding = 0, std140) uniform TEXTURE_BLOCK
{
    sampler2D tex[384];
};

in VS_OUT
{
    vec2 tc;
    flat int index;
} fs_in;

out vec4 color;

void main(void)
{
    color = texture(tex[fs_in.index], fs_in.tc);
}
"#;

// std140 rounds the array stride up to 16 bytes per handle.
#[repr(C)]
#[derive(Clone, Copy)]
struct HandleSlot {
    handle: GLuint64,
    _pad: GLuint64,
}

#[derive(Default)]
struct BindlessGrid {
    program: GLuint,
    vao: GLuint,
    ubo: GLuint,
    textures: Vec<GLuint>,
    handles: Vec<GLuint64>,
    ext: Option<ext::BindlessTextures>,
    time_location: GLint,
}

fn tile_color(index: usize, level: usize) -> [u8; 4] {
    let phase = index as f32 * 0.618_034 + level as f32 * 0.15;
    let channel = |shift: f32| {
        let v = ((phase + shift) * 2.0 * PI).sin() * 0.5 + 0.5;
        (v * 255.0) as u8
    };
    [channel(0.0), channel(1.0 / 3.0), channel(2.0 / 3.0), 255]
}

unsafe fn tile_texture(index: usize) -> GLuint {
    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(gl::TEXTURE_2D, 5, gl::RGBA8, 16, 16);

    for level in 0..5 {
        let size: GLsizei = 16 >> level;
        let data = vec![tile_color(index, level); (size * size) as usize];
        gl::TexSubImage2D(
            gl::TEXTURE_2D,
            level as GLint,
            0,
            0,
            size,
            size,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            data.as_ptr() as *const _,
        );
    }

    // The handle snapshots the sampler state, so this has to happen
    // before the handle is taken.
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST_MIPMAP_NEAREST as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
    texture
}

impl App for BindlessGrid {
    fn startup(&mut self, ctx: &mut Context) -> Result<()> {
        unsafe {
            let ext = ext::BindlessTextures::load(ctx)?;

            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.time_location = shader::uniform_location(self.program, "time")?;

            let mut slots = Vec::with_capacity(NUM_TEXTURES);
            for i in 0..NUM_TEXTURES {
                let texture = tile_texture(i);
                let handle = ext.texture_handle(texture);
                ext.make_resident(handle);
                if !ext.is_resident(handle) {
                    bail!("texture handle {:#x} did not become resident", handle);
                }
                self.textures.push(texture);
                self.handles.push(handle);
                slots.push(HandleSlot { handle, _pad: 0 });
            }
            info!("{} texture handles resident.", self.handles.len());

            gl::GenBuffers(1, &mut self.ubo);
            gl::BindBuffer(gl::UNIFORM_BUFFER, self.ubo);
            gl::BufferData(
                gl::UNIFORM_BUFFER,
                (slots.len() * mem::size_of::<HandleSlot>()) as GLsizeiptr,
                slots.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
            gl::BindBufferBase(gl::UNIFORM_BUFFER, 0, self.ubo);

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            self.ext = Some(ext);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::Uniform1f(self.time_location, time as f32);
            gl::DrawArraysInstanced(gl::TRIANGLE_STRIP, 0, 4, NUM_TEXTURES as GLsizei);
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(ext) = &self.ext {
                for &handle in &self.handles {
                    ext.make_non_resident(handle);
                }
            }
            if !self.textures.is_empty() {
                gl::DeleteTextures(self.textures.len() as GLsizei, self.textures.as_ptr());
            }
            gl::DeleteBuffers(1, &self.ubo);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Bindless textures"), BindlessGrid::default())
}
