//! termcam application layer: CLI, keyboard worker, source selection and
//! the render loop that ties capture, decoding and display together.

pub mod cli;
pub mod input;
pub mod pipeline;
pub mod render_loop;
