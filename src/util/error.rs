use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("buffer has the wrong size (expected {expected}, found {found})")]
    BufferSize { expected: usize, found: usize },
    #[error("frame dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: String, right: String },
    #[error("invalid dimensions {width}x{height}: width and height must be positive")]
    ZeroDimensions { width: u64, height: u64 },
    #[error("could not parse dimensions from {0:?}, expected WIDTHxHEIGHT")]
    MalformedDimensions(String),
    #[error("could not inspect {path}: {reason}")]
    Inspect { path: String, reason: String },
}
