//! Math helpers, based on the `cgmath` crate.
//!
//! Everything from `cgmath` is re-exported, so demos can `use
//! glsamples::math::*;` and get vectors, matrices and the angle types along
//! with the free-function shorthands below.

pub use cgmath::*;

pub type Vec3 = Vector3<f32>;
pub type Vec4 = Vector4<f32>;
pub type Mat4 = Matrix4<f32>;

/// Builds a translation matrix.
#[inline]
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

/// Builds a rotation matrix around an arbitrary axis. The angle is given in
/// degrees, the axis does not have to be normalized.
#[inline]
pub fn rotate(angle: f32, x: f32, y: f32, z: f32) -> Mat4 {
    Matrix4::from_axis_angle(Vector3::new(x, y, z).normalize(), Deg(angle))
}

/// Builds a uniform scale matrix.
#[inline]
pub fn scale(s: f32) -> Mat4 {
    Matrix4::from_scale(s)
}

/// Builds a right-handed view matrix looking from `eye` towards `center`.
#[inline]
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Matrix4::look_at(Point3::from_vec(eye), Point3::from_vec(center), up)
}

/// Uploads `m` to the matrix uniform at `location` of the current program.
#[inline]
pub unsafe fn uniform_matrix(location: gl::types::GLint, m: &Mat4) {
    let values: &[f32; 16] = m.as_ref();
    gl::UniformMatrix4fv(location, 1, gl::FALSE, values.as_ptr());
}

/// Uploads `v` to the `vec4` uniform at `location` of the current program.
#[inline]
pub unsafe fn uniform_vec4(location: gl::types::GLint, v: &Vec4) {
    let values: &[f32; 4] = v.as_ref();
    gl::Uniform4fv(location, 1, values.as_ptr());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_moves_points() {
        let p = translate(1.0, 2.0, 3.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn rotate_preserves_axis() {
        let m = rotate(90.0, 0.0, 1.0, 0.0);
        let v = m * Vector4::new(0.0, 5.0, 0.0, 1.0);
        assert!((v.y - 5.0).abs() < 1e-5);

        let v = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.z - -1.0).abs() < 1e-5);
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let m = look_at(eye, Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let v = m * Vector4::new(0.0, 0.0, 10.0, 1.0);
        assert!(v.truncate().magnitude() < 1e-5);
    }
}
