//! Basic texturing through the direct state access entry points: the
//! texture is created, filled and mipmapped without ever touching a binding
//! point until draw time. The image itself is the classic bitwise AND / OR
//! / XOR pattern computed on the CPU, and the fragment shader samples it by
//! window position.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::{color, shader};

const TEXTURE_SIZE: usize = 256;

const VS_SRC: &str = r#"
#version 450 core

void main(void)
{
    const vec4 vertices[] = vec4[](vec4( 0.75, -0.75, 0.5, 1.0),
                                   vec4(-0.75, -0.75, 0.5, 1.0),
                                   vec4( 0.75,  0.75, 0.5, 1.0));

    gl_Position = vertices[gl_VertexID];
}
"#;

const FS_SRC: &str = r#"
#version 450 core

uniform sampler2D s;

out vec4 color;

void main(void)
{
    color = texture(s, gl_FragCoord.xy / textureSize(s, 0));
}
"#;

#[derive(Default)]
struct TextureSample {
    program: GLuint,
    vao: GLuint,
    texture: GLuint,
}

fn generate_pattern() -> Vec<f32> {
    let mut data = vec![0.0f32; TEXTURE_SIZE * TEXTURE_SIZE * 4];
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            let p = (y * TEXTURE_SIZE + x) * 4;
            data[p] = ((x & y) & 0xFF) as f32 / 255.0;
            data[p + 1] = ((x | y) & 0xFF) as f32 / 255.0;
            data[p + 2] = ((x ^ y) & 0xFF) as f32 / 255.0;
            data[p + 3] = 1.0;
        }
    }
    data
}

impl App for TextureSample {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;

            let data = generate_pattern();

            gl::CreateTextures(gl::TEXTURE_2D, 1, &mut self.texture);
            gl::TextureStorage2D(
                self.texture,
                8,
                gl::RGBA32F,
                TEXTURE_SIZE as GLsizei,
                TEXTURE_SIZE as GLsizei,
            );
            gl::TextureSubImage2D(
                self.texture,
                0,
                0,
                0,
                TEXTURE_SIZE as GLsizei,
                TEXTURE_SIZE as GLsizei,
                gl::RGBA,
                gl::FLOAT,
                data.as_ptr() as *const _,
            );
            gl::GenerateTextureMipmap(self.texture);

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::DARK_GREEN.as_ptr());

            gl::UseProgram(self.program);
            gl::BindTextureUnit(0, self.texture);
            gl::DrawArrays(gl::TRIANGLES, 0, 3);
        }

        Ok(())
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
    app::run(AppConfig::for_sample("Texture sampling"), TextureSample::default())
}
