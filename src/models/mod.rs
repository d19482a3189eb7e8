pub mod catalog;
pub mod common;
pub mod image;
pub mod tryon;

pub use catalog::*;
pub use common::*;
pub use image::*;
pub use tryon::*;
