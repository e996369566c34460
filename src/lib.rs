//! Technique/pass effect application on top of a pluggable graphics device.
//!
//! The effect model and the pass applier live in [`glfx_core`] and are re-exported here. Enable the
//! `opengl` feature for the `opengl` device module.

pub use glfx_core::*;

#[cfg(feature = "opengl")]
pub mod opengl {
    pub use glfx_opengl::*;
}
