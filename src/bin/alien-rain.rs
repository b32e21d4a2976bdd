//! Hundreds of sprites raining down the screen, each picking its image from
//! a 2D texture array. Per-droplet position and rotation live in a std140
//! uniform block that is re-written every frame through a mapped buffer
//! range, and the droplet index reaches the vertex shader as an integer
//! attribute set between draws.
//!
//! Press Escape to quit.

use std::slice;

use failure::bail;
use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::util::Lcg;
use glsamples::{color, ktx, shader};
use log::warn;

const NUM_DROPLETS: usize = 256;
const NUM_ALIENS: usize = 64;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in int alien_index;

out VS_OUT
{
    flat int alien;
    vec2 tc;
} vs_out;

struct droplet_t
{
    float x_offset;
    float y_offset;
    float orientation;
    float unused;
};

layout (std140, binding = 0) uniform droplets
{
    droplet_t droplet[256];
};

void main(void)
{
    const vec2[4] position = vec2[4](vec2(-0.5, -0.5),
                                     vec2( 0.5, -0.5),
                                     vec2(-0.5,  0.5),
                                     vec2( 0.5,  0.5));

    vs_out.tc = position[gl_VertexID].xy + vec2(0.5);

    float co = cos(droplet[alien_index].orientation);
    float so = sin(droplet[alien_index].orientation);
    mat2 rot = mat2(vec2(co, so), vec2(-so, co));
    vec2 pos = 0.25 * rot * position[gl_VertexID];

    gl_Position = vec4(pos.x + droplet[alien_index].x_offset,
                       pos.y + droplet[alien_index].y_offset,
                       0.5, 1.0);
    vs_out.alien = alien_index % 64;
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (location = 0) out vec4 color;

in VS_OUT
{
    flat int alien;
    vec2 tc;
} fs_in;

uniform sampler2DArray tex_aliens;

void main(void)
{
    color = texture(tex_aliens, vec3(fs_in.tc, float(fs_in.alien)));
}
"#;

#[derive(Default)]
struct AlienRain {
    program: GLuint,
    vao: GLuint,
    rain_buffer: GLuint,
    texture: GLuint,
    x_offset: Vec<f32>,
    rot_speed: Vec<f32>,
    fall_speed: Vec<f32>,
}

/// Mirrored bit-mask sprites in the spirit of early arcade invaders. Each
/// of the 64 layers gets its own silhouette and tint.
unsafe fn generated_aliens() -> GLuint {
    const SIZE: usize = 32;
    const CELLS: usize = 8;

    let mut rng = Lcg::new(0xA11E);
    let mut data = vec![0u8; NUM_ALIENS * SIZE * SIZE * 4];

    for layer in 0..NUM_ALIENS {
        let tint = [
            96 + (rng.next_f32() * 160.0) as u8,
            96 + (rng.next_f32() * 160.0) as u8,
            96 + (rng.next_f32() * 160.0) as u8,
        ];

        let mut mask = [[false; CELLS]; CELLS];
        for row in &mut mask {
            for col in 0..CELLS / 2 {
                let on = rng.next_f32() < 0.45;
                row[col] = on;
                row[CELLS - 1 - col] = on;
            }
        }

        let base = layer * SIZE * SIZE * 4;
        for y in 0..SIZE {
            for x in 0..SIZE {
                if mask[y * CELLS / SIZE][x * CELLS / SIZE] {
                    let p = base + (y * SIZE + x) * 4;
                    data[p] = tint[0];
                    data[p + 1] = tint[1];
                    data[p + 2] = tint[2];
                    data[p + 3] = 255;
                }
            }
        }
    }

    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D_ARRAY, texture);
    gl::TexStorage3D(
        gl::TEXTURE_2D_ARRAY,
        ktx::mip_levels_for(SIZE as u32, SIZE as u32) as GLsizei,
        gl::RGBA8,
        SIZE as GLsizei,
        SIZE as GLsizei,
        NUM_ALIENS as GLsizei,
    );
    gl::TexSubImage3D(
        gl::TEXTURE_2D_ARRAY,
        0,
        0,
        0,
        0,
        SIZE as GLsizei,
        SIZE as GLsizei,
        NUM_ALIENS as GLsizei,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        data.as_ptr() as *const _,
    );
    gl::GenerateMipmap(gl::TEXTURE_2D_ARRAY);
    gl::TexParameteri(
        gl::TEXTURE_2D_ARRAY,
        gl::TEXTURE_MIN_FILTER,
        gl::LINEAR_MIPMAP_LINEAR as GLint,
    );
    texture
}

unsafe fn alien_texture() -> Result<GLuint> {
    match ktx::load("media/textures/aliens.ktx") {
        Ok(texture) if texture.target == gl::TEXTURE_2D_ARRAY => Ok(texture.name),
        Ok(_) => bail!("alien texture must be a 2D texture array"),
        Err(err) => {
            warn!("Using generated alien sprites: {}.", err);
            Ok(generated_aliens())
        }
    }
}

impl App for AlienRain {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;

            self.texture = alien_texture()?;

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            gl::GenBuffers(1, &mut self.rain_buffer);
            gl::BindBuffer(gl::UNIFORM_BUFFER, self.rain_buffer);
            gl::BufferData(
                gl::UNIFORM_BUFFER,
                (NUM_DROPLETS * 16) as GLsizeiptr,
                std::ptr::null(),
                gl::DYNAMIC_DRAW,
            );

            let mut rng = Lcg::default();
            for i in 0..NUM_DROPLETS {
                self.x_offset.push(rng.next_f32() * 2.0 - 1.0);
                self.rot_speed
                    .push((rng.next_f32() + 0.5) * if i & 1 != 0 { -3.0 } else { 3.0 });
                self.fall_speed.push(rng.next_f32() + 0.2);
            }

            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32;

        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.program);
            gl::BindTexture(gl::TEXTURE_2D_ARRAY, self.texture);

            gl::BindBufferBase(gl::UNIFORM_BUFFER, 0, self.rain_buffer);
            let raw = gl::MapBufferRange(
                gl::UNIFORM_BUFFER,
                0,
                (NUM_DROPLETS * 16) as GLsizeiptr,
                gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_BUFFER_BIT,
            );
            if raw.is_null() {
                bail!("failed to map the droplet uniform buffer");
            }

            let droplets = slice::from_raw_parts_mut(raw as *mut [f32; 4], NUM_DROPLETS);
            for (i, droplet) in droplets.iter_mut().enumerate() {
                droplet[0] = self.x_offset[i];
                droplet[1] = 2.0 - ((t + i as f32) * self.fall_speed[i]) % 4.31;
                droplet[2] = t * self.rot_speed[i];
                droplet[3] = 0.0;
            }
            gl::UnmapBuffer(gl::UNIFORM_BUFFER);

            gl::BindVertexArray(self.vao);
            for alien_index in 0..NUM_DROPLETS {
                gl::VertexAttribI1i(0, alien_index as GLint);
                gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
            }
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(1, &self.texture);
            gl::DeleteBuffers(1, &self.rain_buffer);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Alien rain"), AlienRain::default())
}
