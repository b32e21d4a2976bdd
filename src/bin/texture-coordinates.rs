//! Texture coordinates on real geometry: a spinning torus wrapped with
//! either a checkerboard or a striped pattern. The fragment shader scales
//! the coordinates past 1.0 so the repeat wrap mode shows, and the
//! checkerboard is deliberately filtered with NEAREST to keep its texels
//! sharp.
//!
//! Controls: T switches the texture. Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::math::*;
use glsamples::{color, ktx, mesh, shader};
use log::warn;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 2) in vec2 texcoord;

uniform mat4 mv_matrix;
uniform mat4 proj_matrix;

out VS_OUT
{
    vec2 tc;
} vs_out;

void main(void)
{
    vec4 pos_vs = mv_matrix * position;

    vs_out.tc = texcoord;
    gl_Position = proj_matrix * pos_vs;
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (binding = 0) uniform sampler2D tex_object;

in VS_OUT
{
    vec2 tc;
} fs_in;

out vec4 color;

void main(void)
{
    color = texture(tex_object, fs_in.tc * vec2(3.0, 1.0));
}
"#;

#[derive(Default)]
struct TextureCoordinates {
    program: GLuint,
    torus: Option<mesh::Mesh>,
    textures: [GLuint; 2],
    active: usize,
    mv_location: GLint,
    proj_location: GLint,
}

unsafe fn checker_texture() -> GLuint {
    const SIZE: usize = 16;
    let mut data = vec![0u8; SIZE * SIZE * 4];
    for y in 0..SIZE {
        for x in 0..SIZE {
            let v = if (x ^ y) & 1 != 0 { 255 } else { 0 };
            let p = (y * SIZE + x) * 4;
            data[p] = v;
            data[p + 1] = v;
            data[p + 2] = v;
            data[p + 3] = 255;
        }
    }

    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(gl::TEXTURE_2D, 1, gl::RGBA8, SIZE as GLsizei, SIZE as GLsizei);
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
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
    texture
}

unsafe fn generated_stripes() -> GLuint {
    const SIZE: usize = 128;
    let mut data = vec![0u8; SIZE * SIZE * 4];
    for y in 0..SIZE {
        for x in 0..SIZE {
            let band = ((x + y) / 8) % 3;
            let rgb: [u8; 3] = match band {
                0 => [230, 96, 64],
                1 => [240, 214, 96],
                _ => [64, 128, 200],
            };
            let p = (y * SIZE + x) * 4;
            data[p] = rgb[0];
            data[p + 1] = rgb[1];
            data[p + 2] = rgb[2];
            data[p + 3] = 255;
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

unsafe fn pattern_texture() -> GLuint {
    match ktx::load("media/textures/pattern1.ktx") {
        Ok(texture) => texture.name,
        Err(err) => {
            warn!("Using a generated stripe pattern: {}.", err);
            generated_stripes()
        }
    }
}

impl App for TextureCoordinates {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.mv_location = shader::uniform_location(self.program, "mv_matrix")?;
            self.proj_location = shader::uniform_location(self.program, "proj_matrix")?;

            self.textures[0] = checker_texture();
            self.textures[1] = pattern_texture();

            self.torus = Some(mesh::Mesh::new(&mesh::torus(48, 32, 0.7, 0.3))?);

            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32;

        let mv = translate(0.0, 0.0, -3.0) * rotate(t * 19.3, 0.0, 1.0, 0.0) * rotate(t * 21.1, 0.0, 0.0, 1.0);
        let proj = perspective(Deg(60.0f32), ctx.aspect_ratio(), 0.1, 1000.0);

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::GRAY.as_ptr());
            gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, 1.0, 0);

            gl::UseProgram(self.program);
            gl::BindTexture(gl::TEXTURE_2D, self.textures[self.active]);

            uniform_matrix(self.mv_location, &mv);
            uniform_matrix(self.proj_location, &proj);

            if let Some(torus) = &self.torus {
                torus.render();
            }
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if key == Key::T && action == Action::Press {
            self.active = 1 - self.active;
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(torus) = &mut self.torus {
                torus.delete();
            }
            gl::DeleteTextures(2, self.textures.as_ptr());
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Texture coordinates"), TextureCoordinates::default())
}
