#![forbid(unsafe_code)]

//! Render kernel for transition effects: packed colors and the drawing surface.

pub mod color;
pub mod surface;

pub use color::PackedRgba;
pub use surface::{FxCell, FxSurface, ViewTransform};
