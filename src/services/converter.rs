use crate::error::{ConvertError, RenderError};
use crate::models::{AppConfig, BackendAvailability, RasterImage, RenderOptions};
use crate::rendering::{self, decode_png, DrawingBackend, RenderBackend, ResvgBackend};
use crate::services::feedback::{Feedback, TracingFeedback};
use std::sync::Arc;

/// Converts SVG data to an RGBA raster image.
///
/// The primary backend is tried first. The secondary backend runs only when
/// the primary is missing or has failed. Every failure is reported to the
/// [`Feedback`] channel before `convert` returns.
pub struct SvgToPngConverter {
    primary: Option<Box<dyn RenderBackend>>,
    secondary: Option<Box<dyn RenderBackend>>,
    feedback: Arc<dyn Feedback>,
}

impl SvgToPngConverter {
    /// Create a converter with the built-in backends enabled by `availability`
    pub fn new(
        availability: BackendAvailability,
        options: RenderOptions,
        fontdb: Arc<fontdb::Database>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let primary = availability.primary.then(|| {
            Box::new(ResvgBackend::new(fontdb.clone(), options)) as Box<dyn RenderBackend>
        });
        let secondary = availability.secondary.then(|| {
            Box::new(DrawingBackend::new(fontdb.clone(), options)) as Box<dyn RenderBackend>
        });
        Self::with_backends(primary, secondary, feedback)
    }

    /// Create a converter from application config, logging via `tracing`
    pub fn from_config(config: &AppConfig) -> Self {
        let fontdb =
            rendering::load_font_database(config.fonts_dir.as_deref(), config.system_fonts);
        Self::new(
            config.backends,
            config.render,
            fontdb,
            Arc::new(TracingFeedback),
        )
    }

    /// Create a converter from explicit backends
    pub fn with_backends(
        primary: Option<Box<dyn RenderBackend>>,
        secondary: Option<Box<dyn RenderBackend>>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        if primary.is_none() && secondary.is_none() {
            feedback.warning("No SVG rendering backend is enabled; SVG conversion is unavailable");
        }

        tracing::debug!(
            primary = primary.as_ref().map(|b| b.name()),
            secondary = secondary.as_ref().map(|b| b.name()),
            "Initialized SVG converter"
        );

        Self {
            primary,
            secondary,
            feedback,
        }
    }

    /// Which backends this converter will try
    pub fn availability(&self) -> BackendAvailability {
        BackendAvailability {
            primary: self.primary.is_some(),
            secondary: self.secondary.is_some(),
        }
    }

    /// Convert SVG data to an RGBA image.
    pub fn convert(&self, svg_data: &[u8]) -> Result<RasterImage, ConvertError> {
        let mut primary_error = None;

        if let Some(backend) = &self.primary {
            match run_backend(backend.as_ref(), svg_data) {
                Ok(image) => return Ok(image),
                Err(e) => {
                    self.feedback.error(&format!(
                        "Error processing SVG with {}: {e}",
                        backend.name()
                    ));
                    primary_error = Some(e);
                }
            }
        }

        if let Some(backend) = &self.secondary {
            return run_backend(backend.as_ref(), svg_data).map_err(|e| {
                self.feedback.error(&format!(
                    "Error processing SVG with {}: {e}",
                    backend.name()
                ));
                ConvertError::SecondaryBackendFailure {
                    source: e,
                    primary: primary_error,
                }
            });
        }

        match primary_error {
            // Already reported above
            Some(e) => Err(ConvertError::PrimaryBackendFailure(e)),
            None => {
                self.feedback
                    .error("Cannot convert SVG: no SVG rendering backend is available");
                Err(ConvertError::BackendUnavailable)
            }
        }
    }

    /// Like [`convert`](Self::convert), with a missing image as the only
    /// failure signal. The reason has already gone to the feedback channel.
    pub fn convert_or_none(&self, svg_data: &[u8]) -> Option<RasterImage> {
        self.convert(svg_data).ok()
    }
}

fn run_backend(backend: &dyn RenderBackend, svg_data: &[u8]) -> Result<RasterImage, RenderError> {
    let png = backend.render_png(svg_data)?;
    let image = decode_png(&png)?;
    tracing::debug!(
        backend = backend.name(),
        width = image.width(),
        height = image.height(),
        "Converted SVG"
    );
    Ok(image)
}
