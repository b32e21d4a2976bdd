//! Texture compression on the GPU. A compute shader packs a 512x512
//! single-channel image into RGTC1 blocks, one 4x4 block per invocation,
//! writing the 64-bit blocks through an rg32ui image into a buffer. The
//! buffer is then handed straight to CompressedTexSubImage2D through the
//! pixel unpack binding, so the compressed data never leaves the GPU.
//!
//! Controls: M switches between the compressed result and the original.
//! Press Escape to quit.

use std::ptr;

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::{color, ktx, shader};
use log::{info, warn};

const INPUT_SIZE: usize = 512;
const BLOCKS: usize = INPUT_SIZE / 4;
const OUTPUT_BYTES: usize = BLOCKS * BLOCKS * 8;

const CS_SRC: &str = r#"
#version 450 core

layout (local_size_x = 8, local_size_y = 8) in;

layout (binding = 0) uniform sampler2D input_image;
layout (binding = 0, rg32ui) uniform writeonly uimageBuffer output_blocks;

void main(void)
{
    ivec2 block = ivec2(gl_GlobalInvocationID.xy);
    ivec2 base = block * 4;

    float texels[16];
    float lo = 1.0;
    float hi = 0.0;

    for (int y = 0; y < 4; y++)
    {
        for (int x = 0; x < 4; x++)
        {
            float v = texelFetch(input_image, base + ivec2(x, y), 0).r;
            texels[y * 4 + x] = v;
            lo = min(lo, v);
            hi = max(hi, v);
        }
    }

    uint red0 = uint(round(hi * 255.0));
    uint red1 = uint(round(lo * 255.0));
    if (red0 == red1)
    {
        // A flat block still needs red0 > red1 so every index decodes
        // to red0.
        red1 = red0 ^ 1u;
    }

    uvec2 words = uvec2(red0 | (red1 << 8), 0u);

    for (int i = 0; i < 16; i++)
    {
        float t = clamp((hi - texels[i]) / max(hi - lo, 1.0 / 255.0), 0.0, 1.0);
        uint s = uint(round(t * 7.0));
        uint idx = s == 0u ? 0u : (s == 7u ? 1u : s + 1u);

        int bit = 16 + i * 3;
        if (bit <= 29)
        {
            words.x |= idx << bit;
        }
        else if (bit >= 32)
        {
            words.y |= idx << (bit - 32);
        }
        else
        {
            words.x |= idx << bit;
            words.y |= idx >> (32 - bit);
        }
    }

    imageStore(output_blocks, block.y * 128 + block.x, uvec4(words, 0u, 0u));
}
"#;

const VS_SRC: &str = r#"
#version 450 core

out VS_OUT
{
    vec2 tc;
} vs_out;

void main(void)
{
    const vec2 corners[4] = vec2[4](vec2(-1.0, -1.0),
                                    vec2( 1.0, -1.0),
                                    vec2(-1.0,  1.0),
                                    vec2( 1.0,  1.0));

    vs_out.tc = corners[gl_VertexID] * 0.5 + 0.5;
    gl_Position = vec4(corners[gl_VertexID], 0.5, 1.0);
}
"#;

const FS_SRC: &str = r#"
#version 450 core

layout (binding = 0) uniform sampler2D tex_display;

in VS_OUT
{
    vec2 tc;
} fs_in;

out vec4 color;

void main(void)
{
    color = vec4(texture(tex_display, fs_in.tc).rrr, 1.0);
}
"#;

struct CompressTexture {
    compress_program: GLuint,
    display_program: GLuint,
    vao: GLuint,
    input_texture: GLuint,
    output_buffer: GLuint,
    output_texture: GLuint,
    compressed_texture: GLuint,
    show_compressed: bool,
}

impl Default for CompressTexture {
    fn default() -> Self {
        CompressTexture {
            compress_program: 0,
            display_program: 0,
            vao: 0,
            input_texture: 0,
            output_buffer: 0,
            output_texture: 0,
            compressed_texture: 0,
            show_compressed: true,
        }
    }
}

fn generated_rings() -> Vec<u8> {
    let mut data = vec![0u8; INPUT_SIZE * INPUT_SIZE];
    for y in 0..INPUT_SIZE {
        for x in 0..INPUT_SIZE {
            let dx = x as f32 - 255.5;
            let dy = y as f32 - 255.5;
            let d = (dx * dx + dy * dy).sqrt();
            let v = ((d * 0.08).sin() * 0.5 + 0.5) * (1.0 - d / 400.0).max(0.0);
            data[y * INPUT_SIZE + x] = (v * 255.0) as u8;
        }
    }
    data
}

unsafe fn upload_r8(data: &[u8]) -> GLuint {
    let mut texture = 0;
    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    gl::TexStorage2D(gl::TEXTURE_2D, 1, gl::R8, INPUT_SIZE as GLsizei, INPUT_SIZE as GLsizei);
    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
    gl::TexSubImage2D(
        gl::TEXTURE_2D,
        0,
        0,
        0,
        INPUT_SIZE as GLsizei,
        INPUT_SIZE as GLsizei,
        gl::RED,
        gl::UNSIGNED_BYTE,
        data.as_ptr() as *const _,
    );
    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 4);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
    texture
}

unsafe fn input_texture() -> GLuint {
    match ktx::load("media/textures/gllogodistsm.ktx") {
        Ok(texture) => {
            if texture.target == gl::TEXTURE_2D && texture.width == 512 && texture.height == 512 {
                return texture.name;
            }
            warn!("media/textures/gllogodistsm.ktx is not a 512x512 2D texture, using a generated image.");
            gl::DeleteTextures(1, &texture.name);
        }
        Err(err) => warn!("Using a generated input image: {}.", err),
    }
    upload_r8(&generated_rings())
}

impl App for CompressTexture {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.compress_program = shader::program(&[(gl::COMPUTE_SHADER, CS_SRC)])?;
            self.display_program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;

            self.input_texture = input_texture();

            gl::GenBuffers(1, &mut self.output_buffer);
            gl::BindBuffer(gl::TEXTURE_BUFFER, self.output_buffer);
            gl::BufferStorage(gl::TEXTURE_BUFFER, OUTPUT_BYTES as GLsizeiptr, ptr::null(), 0);

            gl::GenTextures(1, &mut self.output_texture);
            gl::BindTexture(gl::TEXTURE_BUFFER, self.output_texture);
            gl::TexBuffer(gl::TEXTURE_BUFFER, gl::RG32UI, self.output_buffer);

            gl::GenTextures(1, &mut self.compressed_texture);
            gl::BindTexture(gl::TEXTURE_2D, self.compressed_texture);
            gl::TexStorage2D(
                gl::TEXTURE_2D,
                1,
                gl::COMPRESSED_RED_RGTC1,
                INPUT_SIZE as GLsizei,
                INPUT_SIZE as GLsizei,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);

            gl::GenVertexArrays(1, &mut self.vao);
            gl::BindVertexArray(self.vao);

            // Compress once; the input never changes after this.
            gl::UseProgram(self.compress_program);
            gl::BindTexture(gl::TEXTURE_2D, self.input_texture);
            gl::BindImageTexture(0, self.output_texture, 0, gl::FALSE, 0, gl::WRITE_ONLY, gl::RG32UI);
            gl::DispatchCompute((BLOCKS / 8) as GLuint, (BLOCKS / 8) as GLuint, 1);
            gl::MemoryBarrier(gl::PIXEL_BUFFER_BARRIER_BIT);

            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, self.output_buffer);
            gl::BindTexture(gl::TEXTURE_2D, self.compressed_texture);
            gl::CompressedTexSubImage2D(
                gl::TEXTURE_2D,
                0,
                0,
                0,
                INPUT_SIZE as GLsizei,
                INPUT_SIZE as GLsizei,
                gl::COMPRESSED_RED_RGTC1,
                OUTPUT_BYTES as GLsizei,
                0 as *const _,
            );
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);

            check_gl()
        }
    }

    fn render(&mut self, _ctx: &mut Context, _time: f64) -> Result<()> {
        let texture = if self.show_compressed {
            self.compressed_texture
        } else {
            self.input_texture
        };

        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());

            gl::UseProgram(self.display_program);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if key == Key::M && action == Action::Press {
            self.show_compressed = !self.show_compressed;
            info!(
                "Showing the {} texture.",
                if self.show_compressed { "compressed" } else { "original" }
            );
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            gl::DeleteTextures(1, &self.compressed_texture);
            gl::DeleteTextures(1, &self.output_texture);
            gl::DeleteBuffers(1, &self.output_buffer);
            gl::DeleteTextures(1, &self.input_texture);
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteProgram(self.display_program);
            gl::DeleteProgram(self.compress_program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Compute texture compression"), CompressTexture::default())
}
