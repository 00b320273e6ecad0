use thiserror::Error;

/// Failures of the capture pipeline
///
/// Tiny selections are not errors; the extractor returns `None` for them.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The viewport capability failed or returned nothing
    #[error("viewport capture failed: {0}")]
    Capture(String),
    /// The returned payload could not be decoded into a bitmap
    #[error("failed to decode captured image")]
    Decode(#[from] image::ImageError),
    #[error("page geometry is empty ({0})")]
    EmptyPage(String),
    #[error("capture cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("capture worker failed")]
    Worker(#[from] tokio::task::JoinError),
}
