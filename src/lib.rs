pub mod batch;
pub mod common;
pub mod processing;
pub mod utils;

pub use processing::{BitWidth, GridShape, PixelGrid, StegoError};
