//! Runtime lookup of extension entry points that are not part of the core
//! profile bindings.
//!
//! The bindless texture demo needs `ARB_bindless_texture`, which the
//! statically generated core bindings do not cover. Function pointers are
//! resolved through the platform's `GetProcAddress` once at startup and any
//! missing symbol turns into a regular error, so unsupported drivers fail
//! with a message instead of a crash.

use std::mem;

use gl::types::*;

use crate::app::Context;
use crate::errors::Result;

/// Entry points of `ARB_bindless_texture`, resolved at runtime.
pub struct BindlessTextures {
    get_texture_handle: extern "system" fn(GLuint) -> GLuint64,
    make_texture_handle_resident: extern "system" fn(GLuint64),
    make_texture_handle_non_resident: extern "system" fn(GLuint64),
    is_texture_handle_resident: extern "system" fn(GLuint64) -> GLboolean,
}

impl BindlessTextures {
    /// Resolves all entry points, failing if the extension is unavailable.
    pub fn load(ctx: &Context) -> Result<Self> {
        unsafe {
            Ok(BindlessTextures {
                get_texture_handle: lookup(ctx, "glGetTextureHandleARB")?,
                make_texture_handle_resident: lookup(ctx, "glMakeTextureHandleResidentARB")?,
                make_texture_handle_non_resident: lookup(ctx, "glMakeTextureHandleNonResidentARB")?,
                is_texture_handle_resident: lookup(ctx, "glIsTextureHandleResidentARB")?,
            })
        }
    }

    pub fn texture_handle(&self, texture: GLuint) -> GLuint64 {
        (self.get_texture_handle)(texture)
    }

    pub fn make_resident(&self, handle: GLuint64) {
        (self.make_texture_handle_resident)(handle);
    }

    pub fn make_non_resident(&self, handle: GLuint64) {
        (self.make_texture_handle_non_resident)(handle);
    }

    pub fn is_resident(&self, handle: GLuint64) -> bool {
        (self.is_texture_handle_resident)(handle) != 0
    }
}

unsafe fn lookup<F>(ctx: &Context, name: &str) -> Result<F> {
    debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*const ()>());

    let address = ctx.get_proc_address(name);
    if address.is_null() {
        bail!("missing GL entry point `{}` (extension not supported by this driver)", name);
    }

    Ok(mem::transmute_copy(&address))
}
