//! Order-independent transparency with per-pixel fragment lists. The
//! append pass writes every translucent fragment of a torus into one big
//! shader storage buffer, indexed through an atomic counter, and links it
//! into a per-pixel list whose head lives in a 1024x1024 r32ui image. The
//! resolve pass walks each list, sorts it by view depth and composites
//! back to front, so the torus blends correctly no matter the draw order.
//!
//! Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::math::*;
use glsamples::{mesh, shader};
use std::ptr;

const MAX_FRAGMENTS: usize = 1024 * 1024;
const HEAD_SIZE: GLsizei = 1024;

const QUAD_VS_SRC: &str = r#"
#version 450 core

void main(void)
{
    const vec4 vertices[4] = vec4[4](vec4(-1.0, -1.0, 0.5, 1.0),
                                     vec4( 1.0, -1.0, 0.5, 1.0),
                                     vec4(-1.0,  1.0, 0.5, 1.0),
                                     vec4( 1.0,  1.0, 0.5, 1.0));

    gl_Position = vertices[gl_VertexID];
}
"#;

const CLEAR_FS_SRC: &str = r#"
#version 450 core

layout (binding = 0, r32ui) uniform uimage2D head_pointer;

out vec4 color;

void main(void)
{
    imageStore(head_pointer, ivec2(gl_FragCoord.xy), uvec4(0xFFFFFFFF));
    color = vec4(0.1, 0.1, 0.1, 1.0);
}
"#;

const APPEND_VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 1) in vec3 normal;

uniform mat4 mv_matrix;
uniform mat4 mvp_matrix;

out VS_OUT
{
    vec3 normal;
    float view_z;
} vs_out;

void main(void)
{
    vec4 P = mv_matrix * position;

    vs_out.normal = mat3(mv_matrix) * normal;
    vs_out.view_z = P.z;
    gl_Position = mvp_matrix * position;
}
"#;

const APPEND_FS_SRC: &str = r#"
#version 450 core

layout (binding = 0) uniform atomic_uint fill_counter;
layout (binding = 0, r32ui) uniform coherent uimage2D head_pointer;

struct fragment_t
{
    uint color;
    uint depth;
    uint next;
    uint unused;
};

layout (binding = 0, std430) buffer fragments
{
    fragment_t fragment[];
};

in VS_OUT
{
    vec3 normal;
    float view_z;
} fs_in;

void main(void)
{
    uint index = atomicCounterIncrement(fill_counter);
    if (index >= 1024u * 1024u)
    {
        discard;
    }

    float shade = abs(normalize(fs_in.normal).z) * 0.8 + 0.2;
    vec4 surface = vec4(vec3(0.4, 0.75, 1.0) * shade, 0.35);

    uint old_head = imageAtomicExchange(head_pointer, ivec2(gl_FragCoord.xy), index);

    fragment[index].color = packUnorm4x8(surface);
    fragment[index].depth = floatBitsToUint(fs_in.view_z);
    fragment[index].next = old_head;
    fragment[index].unused = 0u;
}
"#;

const RESOLVE_FS_SRC: &str = r#"
#version 450 core

layout (binding = 0, r32ui) uniform readonly uimage2D head_pointer;

struct fragment_t
{
    uint color;
    uint depth;
    uint next;
    uint unused;
};

layout (binding = 0, std430) buffer fragments
{
    fragment_t fragment[];
};

out vec4 color;

const int MAX_WALK = 32;

void main(void)
{
    ivec2 P = ivec2(gl_FragCoord.xy);
    if (any(greaterThanEqual(P, imageSize(head_pointer))))
    {
        color = vec4(0.0);
        return;
    }

    uint indices[MAX_WALK];
    int count = 0;

    uint head = imageLoad(head_pointer, P).x;
    while (head != 0xFFFFFFFF && count < MAX_WALK)
    {
        indices[count] = head;
        head = fragment[head].next;
        count++;
    }

    // Ascending view z is back to front, view z being negative.
    for (int i = 1; i < count; i++)
    {
        uint key = indices[i];
        float key_depth = uintBitsToFloat(fragment[key].depth);
        int j = i - 1;
        while (j >= 0 && uintBitsToFloat(fragment[indices[j]].depth) > key_depth)
        {
            indices[j + 1] = indices[j];
            j--;
        }
        indices[j + 1] = key;
    }

    vec4 final_color = vec4(0.0);
    for (int i = 0; i < count; i++)
    {
        vec4 c = unpackUnorm4x8(fragment[indices[i]].color);
        final_color.rgb = mix(final_color.rgb, c.rgb, c.a);
        final_color.a = c.a + final_color.a * (1.0 - c.a);
    }

    color = final_color;
}
"#;

#[derive(Default)]
struct FragmentList {
    clear_program: GLuint,
    append_program: GLuint,
    resolve_program: GLuint,
    quad_vao: GLuint,
    torus: Option<mesh::Mesh>,
    fragment_buffer: GLuint,
    counter_buffer: GLuint,
    head_texture: GLuint,
    mv_location: GLint,
    mvp_location: GLint,
}

impl App for FragmentList {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.clear_program = shader::program(&[
                (gl::VERTEX_SHADER, QUAD_VS_SRC),
                (gl::FRAGMENT_SHADER, CLEAR_FS_SRC),
            ])?;
            self.append_program = shader::program(&[
                (gl::VERTEX_SHADER, APPEND_VS_SRC),
                (gl::FRAGMENT_SHADER, APPEND_FS_SRC),
            ])?;
            self.resolve_program = shader::program(&[
                (gl::VERTEX_SHADER, QUAD_VS_SRC),
                (gl::FRAGMENT_SHADER, RESOLVE_FS_SRC),
            ])?;
            self.mv_location = shader::uniform_location(self.append_program, "mv_matrix")?;
            self.mvp_location = shader::uniform_location(self.append_program, "mvp_matrix")?;

            gl::GenBuffers(1, &mut self.fragment_buffer);
            gl::BindBuffer(gl::SHADER_STORAGE_BUFFER, self.fragment_buffer);
            gl::BufferData(
                gl::SHADER_STORAGE_BUFFER,
                (MAX_FRAGMENTS * 16) as GLsizeiptr,
                ptr::null(),
                gl::DYNAMIC_COPY,
            );
            gl::BindBufferBase(gl::SHADER_STORAGE_BUFFER, 0, self.fragment_buffer);

            gl::GenBuffers(1, &mut self.counter_buffer);
            gl::BindBuffer(gl::ATOMIC_COUNTER_BUFFER, self.counter_buffer);
            gl::BufferData(gl::ATOMIC_COUNTER_BUFFER, 4, ptr::null(), gl::DYNAMIC_COPY);
            gl::BindBufferBase(gl::ATOMIC_COUNTER_BUFFER, 0, self.counter_buffer);

            gl::GenTextures(1, &mut self.head_texture);
            gl::BindTexture(gl::TEXTURE_2D, self.head_texture);
            gl::TexStorage2D(gl::TEXTURE_2D, 1, gl::R32UI, HEAD_SIZE, HEAD_SIZE);

            gl::GenVertexArrays(1, &mut self.quad_vao);

            self.torus = Some(mesh::Mesh::new(&mesh::torus(48, 32, 0.7, 0.3))?);

            gl::Disable(gl::DEPTH_TEST);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        let t = time as f32;

        let mv = translate(0.0, 0.0, -3.5) * rotate(t * 25.0, 0.0, 1.0, 0.0) * rotate(t * 30.0, 1.0, 0.0, 0.0);
        let proj = perspective(Deg(50.0f32), ctx.aspect_ratio(), 0.1, 1000.0);
        let mvp = proj * mv;

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);

            let zero: GLuint = 0;
            gl::BindBuffer(gl::ATOMIC_COUNTER_BUFFER, self.counter_buffer);
            gl::BufferSubData(gl::ATOMIC_COUNTER_BUFFER, 0, 4, &zero as *const GLuint as *const _);

            gl::BindImageTexture(0, self.head_texture, 0, gl::FALSE, 0, gl::READ_WRITE, gl::R32UI);

            // Reset the heads and paint the background in one pass.
            gl::UseProgram(self.clear_program);
            gl::BindVertexArray(self.quad_vao);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);

            gl::MemoryBarrier(gl::SHADER_IMAGE_ACCESS_BARRIER_BIT);

            gl::UseProgram(self.append_program);
            uniform_matrix(self.mv_location, &mv);
            uniform_matrix(self.mvp_location, &mvp);
            gl::ColorMask(gl::FALSE, gl::FALSE, gl::FALSE, gl::FALSE);
            if let Some(torus) = &self.torus {
                torus.render();
            }
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);

            gl::MemoryBarrier(
                gl::SHADER_IMAGE_ACCESS_BARRIER_BIT
                    | gl::SHADER_STORAGE_BARRIER_BIT
                    | gl::ATOMIC_COUNTER_BARRIER_BIT,
            );

            gl::UseProgram(self.resolve_program);
            gl::BindVertexArray(self.quad_vao);
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
            gl::Disable(gl::BLEND);
        }

        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(torus) = &mut self.torus {
                torus.delete();
            }
            gl::DeleteTextures(1, &self.head_texture);
            gl::DeleteBuffers(1, &self.counter_buffer);
            gl::DeleteBuffers(1, &self.fragment_buffer);
            gl::DeleteVertexArrays(1, &self.quad_vao);
            gl::DeleteProgram(self.resolve_program);
            gl::DeleteProgram(self.append_program);
            gl::DeleteProgram(self.clear_program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Fragment lists"), FragmentList::default())
}
