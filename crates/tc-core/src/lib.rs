//! Types, traits, palette and configuration shared by the termcam workspace.
//!
//! Everything the render loop talks to (capture device, image codec,
//! keyboard, terminal) is described here as a trait so the loop can be
//! driven by real hardware or by test doubles.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use color::{quantize, quantize_rgb8};
pub use config::TermcamConfig;
pub use error::{CaptureError, CoreError, DecodeError};
pub use frame::{CellGrid, DecodedImage, KeyPress};
pub use traits::{CaptureSource, FrameWait, ImageCodec, InputSource, TerminalSurface};
