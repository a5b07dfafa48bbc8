pub mod config;
pub mod raster_image;

pub use config::{AppConfig, BackendAvailability, RenderOptions};
pub use raster_image::RasterImage;
