//! Scene state consumed by the renderer

mod camera;

pub use camera::*;
