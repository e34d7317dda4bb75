//! Error types for rendering and asset loading

use thiserror::Error;

/// Failures surfaced by the export pipeline
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Please add at least one service before exporting")]
    EmptyDocument,

    #[error("Totals cover {lines} lines but {items} items were supplied")]
    TotalsMismatch { items: usize, lines: usize },

    #[error("Font error: {0}")]
    Font(String),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Render task failed: {0}")]
    Task(String),

    #[error("Export cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Rejected input rather than a failure of the rendering machinery
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RenderError::EmptyDocument | RenderError::TotalsMismatch { .. }
        )
    }
}

/// Why a logo candidate could not be used; logged, never surfaced
#[derive(Error, Debug)]
pub enum LogoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("PNG decoding failed: {0}")]
    Png(#[from] png::DecodingError),

    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),
}
