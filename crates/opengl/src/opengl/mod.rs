mod cache;
mod info;
mod program;
mod state;
mod texture;
mod util;

pub use cache::*;
pub use info::*;
pub use program::*;
pub use state::*;
pub use texture::*;
pub use util::*;
