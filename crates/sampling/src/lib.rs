mod error;
mod sample;
mod volume;

pub use error::*;
pub use sample::*;
pub use volume::*;
