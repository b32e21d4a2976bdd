//! # What is this?
//!
//! A catalogue of small, self-contained OpenGL demos. Every binary in this
//! crate shows off one rendering technique in isolation, from hardware
//! tessellation and instanced drawing over indirect multi-draw up to
//! order-independent transparency with per-pixel fragment lists.
//!
//! The demos share nothing but a thin lifecycle base and a handful of
//! helpers:
//!
//! - [`app`] opens a window with a core-profile context and drives the
//!   startup / render / shutdown callbacks of an [`app::App`].
//! - [`shader`] compiles and links GLSL programs with readable errors.
//! - [`ktx`] reads textures from KTX image files.
//! - [`mesh`] generates the procedural geometry the demos render.
//! - [`math`] re-exports `cgmath` plus a few shorthand constructors.
//!
//! There is deliberately no renderer, no scene graph and no asset pipeline
//! in here. Each demo owns its GL objects and issues its own draw calls, so
//! the technique it demonstrates stays readable from top to bottom.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub mod app;
pub mod color;
pub mod errors;
pub mod ext;
pub mod input;
pub mod ktx;
pub mod math;
pub mod mesh;
pub mod shader;
pub mod util;

pub use crate::app::{run, App, AppConfig, Context};
pub use crate::errors::Result;
pub use crate::input::{Action, Key};
