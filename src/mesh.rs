//! Procedural demo geometry and a small GPU mesh wrapper.
//!
//! Geometry generation is pure and testable; [`Mesh`] owns the VAO and the
//! interleaved vertex buffer and knows how to draw itself. Vertex attributes
//! are laid out the same way for every generator: location 0 is the
//! position, location 1 the normal and location 2 the texture coordinate.

use std::f32::consts::PI;
use std::mem;

use gl::types::*;

use crate::errors::{check_gl, Result};
use crate::util::Lcg;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// A contiguous vertex range within a [`MeshData`], used by the indirect
/// drawing demo to treat one buffer as a family of shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubObject {
    pub first: u32,
    pub count: u32,
}

/// Plain triangle-soup geometry, not yet uploaded anywhere.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub sub_objects: Vec<SubObject>,
}

impl MeshData {
    /// Wraps a vertex list as a mesh with a single sub-object covering it.
    pub fn single(vertices: Vec<Vertex>) -> Self {
        let count = vertices.len() as u32;
        MeshData {
            vertices,
            sub_objects: vec![SubObject { first: 0, count }],
        }
    }

    /// Appends another mesh, keeping its sub-object boundaries intact.
    pub fn append(&mut self, mut other: MeshData) {
        let base = self.vertices.len() as u32;
        for sub in &mut other.sub_objects {
            sub.first += base;
        }
        self.vertices.append(&mut other.vertices);
        self.sub_objects.append(&mut other.sub_objects);
    }
}

/// Generates a torus in the xz plane with the given main and tube radius.
pub fn torus(rings: u32, sides: u32, radius: f32, tube_radius: f32) -> MeshData {
    let vertex_at = |ring: u32, side: u32| -> Vertex {
        let theta = 2.0 * PI * ring as f32 / rings as f32;
        let phi = 2.0 * PI * side as f32 / sides as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();

        Vertex {
            position: [
                (radius + tube_radius * cos_phi) * cos_theta,
                tube_radius * sin_phi,
                (radius + tube_radius * cos_phi) * sin_theta,
            ],
            normal: [cos_phi * cos_theta, sin_phi, cos_phi * sin_theta],
            texcoord: [ring as f32 / rings as f32, side as f32 / sides as f32],
        }
    };

    let mut vertices = Vec::with_capacity((rings * sides * 6) as usize);
    for ring in 0..rings {
        for side in 0..sides {
            let a = vertex_at(ring, side);
            let b = vertex_at(ring + 1, side);
            let c = vertex_at(ring, side + 1);
            let d = vertex_at(ring + 1, side + 1);
            vertices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    MeshData::single(vertices)
}

/// Generates an axis-aligned cube with the given half extent.
pub fn cube(half: f32) -> MeshData {
    // Per face: outward normal followed by the four corners as a strip
    // (row-major quad), expanded into two triangles below.
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]),
        ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
        ([1.0, 0.0, 0.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
        ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]]),
        ([0.0, 1.0, 0.0], [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0]]),
    ];
    const CORNER_UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    const TRIANGLES: [usize; 6] = [0, 1, 2, 2, 1, 3];

    let mut vertices = Vec::with_capacity(36);
    for &(normal, corners) in &FACES {
        for &corner in &TRIANGLES {
            let p = corners[corner];
            vertices.push(Vertex {
                position: [p[0] * half, p[1] * half, p[2] * half],
                normal,
                texcoord: CORNER_UV[corner],
            });
        }
    }

    MeshData::single(vertices)
}

/// Generates a lumpy rock by radially displacing a subdivided icosahedron.
///
/// The displacement is a smooth function of direction, so vertices shared
/// between triangles land on the same surface even though the output is
/// flat-shaded triangle soup. The same seed always produces the same rock.
pub fn rock(seed: u32, subdivisions: u32) -> MeshData {
    let mut rng = Lcg::new(seed | 1);
    let freq = [
        rng.gen_range(1.5, 4.5),
        rng.gen_range(1.5, 4.5),
        rng.gen_range(1.5, 4.5),
    ];
    let phase = [
        rng.gen_range(0.0, 2.0 * PI),
        rng.gen_range(0.0, 2.0 * PI),
        rng.gen_range(0.0, 2.0 * PI),
    ];
    let amp = [
        rng.gen_range(0.05, 0.15),
        rng.gen_range(0.05, 0.15),
        rng.gen_range(0.05, 0.15),
    ];
    let size = rng.gen_range(0.7, 1.3);

    let displaced = |dir: [f32; 3]| -> [f32; 3] {
        let radius = 1.0
            + amp[0] * (freq[0] * dir[0] + phase[0]).sin()
            + amp[1] * (freq[1] * dir[1] + phase[1]).sin()
            + amp[2] * (freq[2] * dir[2] + phase[2]).sin();
        let radius = radius * size;
        [dir[0] * radius, dir[1] * radius, dir[2] * radius]
    };

    let mut triangles = icosahedron();
    for _ in 0..subdivisions {
        let mut next = Vec::with_capacity(triangles.len() * 4);
        for tri in &triangles {
            let ab = normalize(midpoint(tri[0], tri[1]));
            let bc = normalize(midpoint(tri[1], tri[2]));
            let ca = normalize(midpoint(tri[2], tri[0]));
            next.push([tri[0], ab, ca]);
            next.push([tri[1], bc, ab]);
            next.push([tri[2], ca, bc]);
            next.push([ab, bc, ca]);
        }
        triangles = next;
    }

    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for tri in &triangles {
        let a = displaced(tri[0]);
        let b = displaced(tri[1]);
        let c = displaced(tri[2]);
        let normal = normalize(cross(sub(b, a), sub(c, a)));
        for &(dir, p) in &[(tri[0], a), (tri[1], b), (tri[2], c)] {
            vertices.push(Vertex {
                position: p,
                normal,
                texcoord: [
                    dir[2].atan2(dir[0]) / (2.0 * PI) + 0.5,
                    dir[1].max(-1.0).min(1.0).asin() / PI + 0.5,
                ],
            });
        }
    }

    MeshData::single(vertices)
}

/// Generates a family of distinct rocks sharing one vertex buffer, exposed
/// as per-rock sub-objects.
pub fn rock_set(count: u32, seed: u32, subdivisions: u32) -> MeshData {
    let mut set = MeshData::default();
    for index in 0..count {
        set.append(rock(seed.wrapping_add(index.wrapping_mul(7919)), subdivisions));
    }
    set
}

fn icosahedron() -> Vec<[[f32; 3]; 3]> {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let v: Vec<[f32; 3]> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|&p| normalize(p))
    .collect();

    const INDICES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    INDICES.iter().map(|&[a, b, c]| [v[a], v[b], v[c]]).collect()
}

fn midpoint(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5, (a[2] + b[2]) * 0.5]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= 1e-12 {
        return [0.0, 0.0, 0.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Geometry uploaded to the GPU: a VAO plus one interleaved vertex buffer.
#[derive(Debug)]
pub struct Mesh {
    vao: GLuint,
    buffer: GLuint,
    vertex_count: u32,
    sub_objects: Vec<SubObject>,
}

impl Mesh {
    /// Uploads mesh data into a fresh VAO/VBO pair and records the vertex
    /// layout on the VAO.
    pub unsafe fn new(data: &MeshData) -> Result<Mesh> {
        if data.vertices.is_empty() {
            bail!("cannot create a mesh from an empty vertex list");
        }

        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        gl::BindVertexArray(vao);

        let mut buffer = 0;
        gl::GenBuffers(1, &mut buffer);
        gl::BindBuffer(gl::ARRAY_BUFFER, buffer);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            (data.vertices.len() * mem::size_of::<Vertex>()) as GLsizeiptr,
            data.vertices.as_ptr() as *const _,
            gl::STATIC_DRAW,
        );

        let stride = mem::size_of::<Vertex>() as GLsizei;
        gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, stride, 0 as *const _);
        gl::VertexAttribPointer(1, 3, gl::FLOAT, gl::FALSE, stride, 12 as *const _);
        gl::VertexAttribPointer(2, 2, gl::FLOAT, gl::FALSE, stride, 24 as *const _);
        gl::EnableVertexAttribArray(0);
        gl::EnableVertexAttribArray(1);
        gl::EnableVertexAttribArray(2);

        check_gl()?;

        Ok(Mesh {
            vao,
            buffer,
            vertex_count: data.vertices.len() as u32,
            sub_objects: data.sub_objects.clone(),
        })
    }

    pub fn vao(&self) -> GLuint {
        self.vao
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn sub_object_count(&self) -> usize {
        self.sub_objects.len()
    }

    pub fn sub_object(&self, index: usize) -> SubObject {
        self.sub_objects[index % self.sub_objects.len()]
    }

    pub unsafe fn render(&self) {
        gl::BindVertexArray(self.vao);
        gl::DrawArrays(gl::TRIANGLES, 0, self.vertex_count as GLsizei);
    }

    pub unsafe fn render_instanced(&self, instances: GLsizei) {
        gl::BindVertexArray(self.vao);
        gl::DrawArraysInstanced(gl::TRIANGLES, 0, self.vertex_count as GLsizei, instances);
    }

    /// Deletes the GL objects. Called from `shutdown` while the context is
    /// still current; there is deliberately no `Drop` impl because the
    /// context may be gone by the time one would run.
    pub unsafe fn delete(&mut self) {
        gl::DeleteBuffers(1, &self.buffer);
        gl::DeleteVertexArrays(1, &self.vao);
        self.buffer = 0;
        self.vao = 0;
        self.vertex_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn torus_has_six_vertices_per_quad() {
        let data = torus(32, 16, 0.9, 0.3);
        assert_eq!(data.vertices.len(), 32 * 16 * 6);
        assert_eq!(data.sub_objects.len(), 1);
        assert_eq!(data.sub_objects[0].count, data.vertices.len() as u32);
    }

    #[test]
    fn torus_normals_are_unit_length() {
        let data = torus(8, 8, 1.0, 0.25);
        for vertex in &data.vertices {
            assert!((length(vertex.normal) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_texcoords_stay_in_unit_square() {
        let data = torus(12, 7, 1.0, 0.2);
        for vertex in &data.vertices {
            assert!(vertex.texcoord[0] >= 0.0 && vertex.texcoord[0] <= 1.0);
            assert!(vertex.texcoord[1] >= 0.0 && vertex.texcoord[1] <= 1.0);
        }
    }

    #[test]
    fn cube_is_a_triangle_list_within_bounds() {
        let data = cube(0.25);
        assert_eq!(data.vertices.len(), 36);
        for vertex in &data.vertices {
            for axis in 0..3 {
                assert!(vertex.position[axis].abs() <= 0.25 + 1e-6);
            }
            assert!((length(vertex.normal) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn rock_is_deterministic_per_seed() {
        let a = rock(1234, 2);
        let b = rock(1234, 2);
        assert_eq!(a.vertices.len(), b.vertices.len());
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va, vb);
        }

        let c = rock(4321, 2);
        assert!(a.vertices.iter().zip(&c.vertices).any(|(va, vc)| va != vc));
    }

    #[test]
    fn rock_stays_near_the_unit_sphere() {
        let data = rock(77, 2);
        assert_eq!(data.vertices.len(), 20 * 4 * 4 * 3);
        for vertex in &data.vertices {
            let r = length(vertex.position);
            assert!(r > 0.3 && r < 2.0, "implausible radius {}", r);
        }
    }

    #[test]
    fn rock_set_sub_objects_tile_the_buffer() {
        let set = rock_set(5, 42, 1);
        assert_eq!(set.sub_objects.len(), 5);

        let mut expected_first = 0;
        for sub in &set.sub_objects {
            assert_eq!(sub.first, expected_first);
            assert!(sub.count > 0);
            expected_first += sub.count;
        }
        assert_eq!(expected_first as usize, set.vertices.len());
    }

    #[test]
    fn append_shifts_sub_objects() {
        let mut data = MeshData::single(vec![
            Vertex {
                position: [0.0; 3],
                normal: [0.0, 1.0, 0.0],
                texcoord: [0.0; 2],
            };
            3
        ]);
        data.append(MeshData::single(vec![
            Vertex {
                position: [1.0; 3],
                normal: [0.0, 1.0, 0.0],
                texcoord: [1.0; 2],
            };
            6
        ]));

        assert_eq!(data.vertices.len(), 9);
        assert_eq!(data.sub_objects[0], SubObject { first: 0, count: 3 });
        assert_eq!(data.sub_objects[1], SubObject { first: 3, count: 6 });
    }
}
