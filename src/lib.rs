//! svgpng - SVG to transparent PNG
//!
//! Converts SVG data to RGBA raster images, trying a primary rendering
//! backend first and falling back to a secondary one.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;

pub use error::{ConvertError, RenderError};
pub use models::{AppConfig, BackendAvailability, RasterImage, RenderOptions};
pub use services::SvgToPngConverter;
