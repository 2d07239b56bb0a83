//! Frame sources for termcam: capture backends, MJPEG decoding and scaling.

pub mod codec;
pub mod negotiate;
pub mod replay;
pub mod resize;

#[cfg(feature = "v4l2")]
pub mod v4l2;
