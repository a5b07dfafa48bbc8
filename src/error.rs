use thiserror::Error;

/// Failure reported by the converter after all enabled backends were tried.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No SVG rendering backend is available")]
    BackendUnavailable,

    #[error("Primary backend failed: {0}")]
    PrimaryBackendFailure(RenderError),

    #[error("Secondary backend failed: {source}")]
    SecondaryBackendFailure {
        source: RenderError,
        /// Set when the primary backend ran first and failed as well
        primary: Option<RenderError>,
    },
}

/// Failure inside a single backend (render, encode or decode step).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Empty canvas: {width}x{height}")]
    EmptyCanvas { width: f32, height: f32 },

    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("PNG decode error: {0}")]
    PngDecode(String),
}
