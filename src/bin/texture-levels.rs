//! Explicit mipmap level selection. Each of the nine levels of a 256x256
//! texture is filled with a different solid colour, and the fragment shader
//! samples with textureLod so the level is picked by a uniform instead of by
//! screen-space derivatives. Fractional levels blend two colours because the
//! filter is LINEAR_MIPMAP_LINEAR.
//!
//! Controls: Up and Down step the level by half. Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::{color, shader};
use log::info;

const VS_SRC: &str = r#"
#version 450 core

out VS_OUT
{
    vec2 tc;
} vs_out;

void main(void)
{
    const vec2 corners[4] = vec2[4](vec2(-0.9, -0.9),
                                    vec2( 0.9, -0.9),
                                    vec2(-0.9,  0.9),
                                    vec2( 0.9,  0.9));

    vs_out.tc = corners[gl_VertexID] * 0.5 + 0.5;
    gl_Position = vec4(corners[gl_VertexID], 0.5, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (binding = 0) uniform sampler2D tex_levels;

uniform float level;

in VS_OUT
{
    vec2 tc;
} fs_in;

out vec4 color;

void main(void)
{
    color = textureLod(tex_levels, fs_in.tc, level);
}
"#;

const LEVEL_COLORS: [[u8; 3]; 9] = [
    [230, 40, 40],
    [235, 130, 40],
    [235, 220, 60],
    [60, 200, 60],
    [50, 210, 210],
    [50, 90, 220],
    [140, 60, 220],
    [220, 60, 200],
    [240, 240, 240],
];

#[derive(Default)]
struct TextureLevels {
    program: GLuint,
    vao: GLuint,
    texture: GLuint,
    level_location: GLint,
    level: f32,
}

unsafe fn level_colored_texture() -> GLuint {
    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(gl::TEXTURE_2D, 9, gl::RGBA8, 256, 256);

    for (level, rgb) in LEVEL_COLORS.iter().enumerate() {
        let size = (256 >> level).max(1) as usize;
        let mut data = vec![0u8; size * size * 4];
        for texel in data.chunks_mut(4) {
            texel[0] = rgb[0];
            texel[1] = rgb[1];
            texel[2] = rgb[2];
            texel[3] = 255;
        }
        gl::TexSubImage2D(
            gl::TEXTURE_2D,
            level as GLint,
            0,
            0,
            size as GLsizei,
            size as GLsizei,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            data.as_ptr() as *const _,
        );
    }

    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
    texture
}

impl App for TextureLevels {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.level_location = shader::uniform_location(self.program, "level")?;

            self.texture = level_colored_texture();

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::BindTexture(gl::TEXTURE_2D, self.texture);
            gl::Uniform1f(self.level_location, self.level);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if action != Action::Press {
            return;
        }

        match key {
            Key::Up => self.level = (self.level + 0.5).min(8.0),
            Key::Down => self.level = (self.level - 0.5).max(0.0),
            _ => return,
        }
        info!("Sampling mipmap level {}.", self.level);
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(1, &self.texture);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Texture mipmap levels"), TextureLevels::default())
}
