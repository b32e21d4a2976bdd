//! A few `GLfloat` color constants for `glClearBufferfv` and friends.

use gl::types::GLfloat;

pub const BLACK: [GLfloat; 4] = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: [GLfloat; 4] = [1.0, 1.0, 1.0, 1.0];
pub const GRAY: [GLfloat; 4] = [0.2, 0.2, 0.2, 1.0];
pub const DARK_GREEN: [GLfloat; 4] = [0.0, 0.25, 0.0, 1.0];
pub const OLIVE: [GLfloat; 4] = [0.5, 0.5, 0.0, 1.0];
pub const SKY_BLUE: [GLfloat; 4] = [0.0, 0.25, 0.35, 1.0];
