use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}

/// Hard failures of a capture device. Always fatal for the render loop.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The device refused an operation or disappeared.
    #[error("Périphérique de capture : {0}")]
    Device(String),

    /// Underlying I/O failure (ioctl, mmap, file read).
    #[error("Erreur d'E/S de capture : {0}")]
    Io(#[from] std::io::Error),

    /// The device cannot produce the requested pixel format.
    #[error("Format non supporté : {format} (disponibles : {available})")]
    UnsupportedFormat {
        /// Requested FourCC.
        format: String,
        /// Human readable list of what the device offers.
        available: String,
    },
}

/// A single frame could not be decoded. Never fatal.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The codec rejected the payload.
    #[error("Décodage impossible : {0}")]
    Codec(String),

    /// Decoded image has an unusable size.
    #[error("Image vide : {width}×{height}")]
    Empty {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}
