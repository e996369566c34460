mod backend;
mod opengl;

pub use backend::{OpenGlDevice, OpenGlError, OpenGlInfo, OpenGlNativeDevice, OpenGlOptions};
