//! HTTP Handlers

mod audio;
mod ping;
mod story;

pub use audio::*;
pub use ping::*;
pub use story::*;
