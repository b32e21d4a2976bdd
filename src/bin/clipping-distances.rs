//! User-defined clipping with gl_ClipDistance. A Phong-shaded torus is cut
//! by a rotating plane and by a sphere that drifts through it, both written
//! as signed distances from the vertex shader. Everything on the negative
//! side of either distance is clipped away.
//!
//! Controls: P pauses the motion. Press Escape to quit.

use gl::types::*;
use glsamples::app::{self, App, AppConfig, Context};
use glsamples::errors::{check_gl, Result};
use glsamples::input::{Action, Key};
use glsamples::math::*;
use glsamples::{color, mesh, shader};
use log::info;

const VS_SRC: &str = r#"
#version 450 core

layout (location = 0) in vec4 position;
layout (location = 1) in vec3 normal;

uniform mat4 proj_matrix;
uniform mat4 mv_matrix;
uniform vec4 clip_plane;
uniform vec4 clip_sphere;

out VS_OUT
{
    vec3 N;
    vec3 L;
    vec3 V;
} vs_out;

const vec3 light_pos = vec3(100.0, 100.0, 100.0);

void main(void)
{
    vec4 P = mv_matrix * position;

    vs_out.N = mat3(mv_matrix) * normal;
    vs_out.L = light_pos - P.xyz;
    vs_out.V = -P.xyz;

    gl_ClipDistance[0] = dot(position, clip_plane);
    gl_ClipDistance[1] = length(position.xyz - clip_sphere.xyz) - clip_sphere.w;

    gl_Position = proj_matrix * P;
}
"#;

const FS_SRC: &str = r#"
#version 450 core

in VS_OUT
{
    vec3 N;
    vec3 L;
    vec3 V;
} fs_in;

uniform vec3 diffuse_albedo = vec3(0.3, 0.5, 0.2);
uniform vec3 specular_albedo = vec3(0.7);
uniform float specular_power = 128.0;

out vec4 color;

void main(void)
{
    vec3 N = normalize(fs_in.N);
    vec3 L = normalize(fs_in.L);
    vec3 V = normalize(fs_in.V);
    vec3 R = reflect(-L, N);

    vec3 diffuse = max(dot(N, L), 0.0) * diffuse_albedo;
    vec3 specular = pow(max(dot(R, V), 0.0), specular_power) * specular_albedo;

    color = vec4(diffuse + specular, 1.0);
}
"#;

#[derive(Default)]
struct ClippingDistances {
    program: GLuint,
    torus: Option<mesh::Mesh>,
    proj_location: GLint,
    mv_location: GLint,
    plane_location: GLint,
    sphere_location: GLint,
    paused: bool,
    total_time: f64,
    last_time: f64,
}

impl App for ClippingDistances {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        unsafe {
            self.program = shader::program(&[
                (gl::VERTEX_SHADER, VS_SRC),
                (gl::FRAGMENT_SHADER, FS_SRC),
            ])?;
            self.proj_location = shader::uniform_location(self.program, "proj_matrix")?;
            self.mv_location = shader::uniform_location(self.program, "mv_matrix")?;
            self.plane_location = shader::uniform_location(self.program, "clip_plane")?;
            self.sphere_location = shader::uniform_location(self.program, "clip_sphere")?;

            self.torus = Some(mesh::Mesh::new(&mesh::torus(48, 32, 0.7, 0.3))?);

            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            gl::Enable(gl::CLIP_DISTANCE0);
            gl::Enable(gl::CLIP_DISTANCE1);
            check_gl()
        }
    }

    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()> {
        if !self.paused {
            self.total_time += time - self.last_time;
        }
        self.last_time = time;
        let t = self.total_time as f32;

        let proj = perspective(Deg(50.0f32), ctx.aspect_ratio(), 0.1, 1000.0);
        let mv = translate(0.0, 0.0, -3.5) * rotate(t * 25.0, 0.0, 1.0, 0.0) * rotate(t * 30.0, 1.0, 0.0, 0.0);

        // The first column of a spinning matrix makes a plane that tumbles
        // through the torus without ever degenerating.
        let plane_matrix = rotate(t * 6.0, 1.0, 0.0, 0.0) * rotate(t * 7.3, 0.0, 1.0, 0.0);
        let mut plane = plane_matrix[0];
        plane.w = 0.0;
        let plane = plane.normalize();

        let sphere = Vec4::new(
            (t * 0.7).sin() * 0.5,
            (t * 1.9).cos() * 0.5,
            (t * 0.1).sin() * 0.5,
            (t * 1.7).cos() * 0.5 + 0.8,
        );

        unsafe {
            gl::Viewport(0, 0, ctx.width() as GLsizei, ctx.height() as GLsizei);
            gl::ClearBufferfv(gl::COLOR, 0, color::BLACK.as_ptr());
            gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, 1.0, 0);

            gl::UseProgram(self.program);
            uniform_matrix(self.proj_location, &proj);
            uniform_matrix(self.mv_location, &mv);
            uniform_vec4(self.plane_location, &plane);
            uniform_vec4(self.sphere_location, &sphere);

            if let Some(torus) = &self.torus {
                torus.render();
            }
        }

        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut Context, key: Key, action: Action) {
        if key == Key::P && action == Action::Press {
            self.paused = !self.paused;
            info!("{}.", if self.paused { "Paused" } else { "Resumed" });
        }
    }

    fn shutdown(&mut self, _ctx: &mut Context) {
        unsafe {
            if let Some(torus) = &mut self.torus {
                torus.delete();
            }
            gl::DeleteProgram(self.program);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    app::run(AppConfig::for_sample("Clip distances"), ClippingDistances::default())
}
