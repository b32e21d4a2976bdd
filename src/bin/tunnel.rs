//! An endless tunnel built from four textured quads. Each wall is a unit
//! quad stretched thirty times along the view axis, and the texture
//! coordinates scroll with time so the camera appears to fly forward while
//! the geometry never moves. Mipmapped filtering keeps the far end of the
//! tunnel from shimmering.
//!
//! Looks for brick, floor and ceiling textures under media/textures/ and
//! falls back to generated ones. Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::math::*;
use glsamples::util::Lcg;
use glsamples::{color, ktx, shader};
use log::warn;

const VS_SRC: &str = r#"
#version 450 core

uniform mat4 mvp_matrix;
uniform float offset;

out VS_OUT
{
    vec2 tc;
} vs_out;

void main(void)
{
    const vec2 position[4] = vec2[4](vec2(-0.5, -0.5),
                                     vec2( 0.5, -0.5),
                                     vec2(-0.5,  0.5),
                                     vec2( 0.5,  0.5));

    vs_out.tc = (position[gl_VertexID] + vec2(offset, 0.5)) * vec2(30.0, 1.0);
    gl_Position = mvp_matrix * vec4(position[gl_VertexID], 0.0, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (binding = 0) uniform sampler2D tex_wall;

in VS_OUT
{
    vec2 tc;
} fs_in;

out vec4 color;

void main(void)
{
    color = texture(tex_wall, fs_in.tc);
}
"#;

const WALL_SIZE: usize = 64;

#[derive(Default)]
struct Tunnel {
    program: GLuint,
    vao: GLuint,
    textures: [GLuint; 3],
    mvp_location: GLint,
    offset_location: GLint,
}

unsafe fn upload_wall(data: &[u8]) -> GLuint {
    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(
        gl::TEXTURE_2D,
        ktx::mip_levels_for(WALL_SIZE as u32, WALL_SIZE as u32) as GLsizei,
        gl::RGBA8,
        WALL_SIZE as GLsizei,
        WALL_SIZE as GLsizei,
    );
    gl::TexSubImage2D(
        gl::TEXTURE_2D,
        0,
        0,
        0,
        WALL_SIZE as GLsizei,
        WALL_SIZE as GLsizei,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        data.as_ptr() as *const _,
    );
    gl::GenerateMipmap(gl::TEXTURE_2D);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
    texture
}

fn generated_bricks(rng: &mut Lcg) -> Vec<u8> {
    let mut data = vec![0u8; WALL_SIZE * WALL_SIZE * 4];
    for y in 0..WALL_SIZE {
        let row = y / 16;
        let shift = if row & 1 != 0 { 16 } else { 0 };
        for x in 0..WALL_SIZE {
            let in_mortar = y % 16 < 2 || (x + shift) % 32 < 2;
            let rgb: [u8; 3] = if in_mortar {
                [110, 104, 98]
            } else {
                let v = (rng.gen_range(0.0, 24.0)) as u8;
                [150 + v, 62 + v / 2, 48]
            };
            let p = (y * WALL_SIZE + x) * 4;
            data[p] = rgb[0];
            data[p + 1] = rgb[1];
            data[p + 2] = rgb[2];
            data[p + 3] = 255;
        }
    }
    data
}

fn generated_planks(rng: &mut Lcg) -> Vec<u8> {
    let mut data = vec![0u8; WALL_SIZE * WALL_SIZE * 4];
    for y in 0..WALL_SIZE {
        for x in 0..WALL_SIZE {
            let seam = x % 16 < 1 || y % 64 < 1;
            let rgb: [u8; 3] = if seam {
                [52, 38, 26]
            } else {
                let v = (rng.gen_range(0.0, 20.0)) as u8;
                [128 + v, 92 + v, 58]
            };
            let p = (y * WALL_SIZE + x) * 4;
            data[p] = rgb[0];
            data[p + 1] = rgb[1];
            data[p + 2] = rgb[2];
            data[p + 3] = 255;
        }
    }
    data
}

fn generated_tiles(rng: &mut Lcg) -> Vec<u8> {
    let mut data = vec![0u8; WALL_SIZE * WALL_SIZE * 4];
    for y in 0..WALL_SIZE {
        for x in 0..WALL_SIZE {
            let edge = x % 16 < 1 || y % 16 < 1;
            let rgb: [u8; 3] = if edge {
                [70, 76, 86]
            } else {
                let v = (rng.gen_range(0.0, 16.0)) as u8;
                [132 + v, 140 + v, 152 + v]
            };
            let p = (y * WALL_SIZE + x) * 4;
            data[p] = rgb[0];
            data[p + 1] = rgb[1];
            data[p + 2] = rgb[2];
            data[p + 3] = 255;
        }
    }
    data
}

unsafe fn wall_texture(path: &str, fallback: fn(&mut Lcg) -> Vec<u8>, rng: &mut Lcg) -> GLuint {
    match ktx::load(path) {
        Ok(texture) => texture.name,
        Err(err) => {
            warn!("Using a generated texture for `{}`: {}.", path, err);
            upload_wall(&fallback(rng))
        }
    }
}

impl App for Tunnel {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.mvp_location = shader::uniform_location(self.program, "mvp_matrix")?;
            self.offset_location = shader::uniform_location(self.program, "offset")?;

            let mut rng = Lcg::default();
            self.textures[0] = wall_texture("media/textures/brick.ktx", generated_bricks, &mut rng);
            self.textures[1] = wall_texture("media/textures/floor.ktx", generated_planks, &mut rng);
            self.textures[2] = wall_texture("media/textures/ceiling.ktx", generated_tiles, &mut rng);

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32;
        let proj = perspective(Deg(60.0f32), ctx.aspect_ratio(), 0.1, 100.0);

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::Uniform1f(self.offset_location, t * 0.03);

            // Left wall, floor, right wall, ceiling.
            for (i, &texture) in [0usize, 1, 0, 2].iter().enumerate() {
                let mv = rotate(90.0 * i as f32, 0.0, 0.0, 1.0)
                    * translate(-0.5, 0.0, -10.0)
                    * rotate(90.0, 0.0, 1.0, 0.0)
                    * Matrix4::from_nonuniform_scale(30.0, 1.0, 1.0);
                let mvp = proj * mv;

                uniform_matrix(self.mvp_location, &mvp);
                gl::BindTexture(gl::TEXTURE_2D, self.textures[texture]);
                gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
            }
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(3, self.textures.as_ptr());
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Endless tunnel"), Tunnel::default())
}
