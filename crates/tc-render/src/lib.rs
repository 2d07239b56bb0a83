//! Terminal output for termcam.
//!
//! Converts scaled frames to palette cells and writes them to the screen.

pub mod canvas;
pub mod fps;
pub mod mosaic;
pub mod surface;
