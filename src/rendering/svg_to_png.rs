use super::{canvas_size, parse_tree, RenderBackend};
use crate::error::RenderError;
use crate::models::RenderOptions;
use std::sync::Arc;
use tiny_skia::{Pixmap, Transform};

/// Primary backend: resvg renders the full SVG feature set straight into a
/// transparent pixmap.
pub struct ResvgBackend {
    /// Font database for text rendering
    fontdb: Arc<fontdb::Database>,
    options: RenderOptions,
}

impl ResvgBackend {
    pub fn new(fontdb: Arc<fontdb::Database>, options: RenderOptions) -> Self {
        Self { fontdb, options }
    }

    /// Parse and rasterize SVG to an RGBA pixmap.
    ///
    /// The pixmap is never filled, so anything the SVG does not paint stays
    /// fully transparent.
    pub fn rasterize(&self, svg_data: &[u8]) -> Result<Pixmap, RenderError> {
        let tree = parse_tree(svg_data, &self.options, &self.fontdb)?;
        let (width, height) = canvas_size(&tree, self.options.scale)?;

        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation)?;

        let scale = self.options.scale;
        resvg::render(
            &tree,
            Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        tracing::debug!(width, height, "Rendered SVG with resvg");
        Ok(pixmap)
    }
}

impl RenderBackend for ResvgBackend {
    fn name(&self) -> &'static str {
        "resvg"
    }

    fn render_png(&self, svg_data: &[u8]) -> Result<Vec<u8>, RenderError> {
        self.rasterize(svg_data)?
            .encode_png()
            .map_err(|e| RenderError::PngEncode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::decode_png;

    fn backend() -> ResvgBackend {
        ResvgBackend::new(Arc::new(fontdb::Database::new()), RenderOptions::default())
    }

    #[test]
    fn test_unpainted_area_is_transparent() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
            <rect width="10" height="10" fill="blue"/>
        </svg>"#;
        let pixmap = backend().rasterize(svg).unwrap();

        assert_eq!(pixmap.width(), 20);
        assert_eq!(pixmap.height(), 10);
        let painted = pixmap.pixel(2, 2).unwrap();
        assert_eq!(painted.alpha(), 255);
        assert_eq!(painted.blue(), 255);
        assert_eq!(pixmap.pixel(15, 5).unwrap().alpha(), 0);
    }

    #[test]
    fn test_render_png_round_trips_through_decoder() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8">
            <rect width="8" height="8" fill="#00ff00" fill-opacity="0.5"/>
        </svg>"##;
        let png = backend().render_png(svg).unwrap();
        let image = decode_png(&png).unwrap();

        assert_eq!((image.width(), image.height()), (8, 8));
        let [r, g, b, a] = image.pixel(4, 4).unwrap();
        assert_eq!((r, b), (0, 0));
        assert!(g >= 250, "green should be un-premultiplied, got {g}");
        assert!((127..=128).contains(&a), "alpha should be ~50%, got {a}");
    }

    #[test]
    fn test_scale_option() {
        let backend = ResvgBackend::new(
            Arc::new(fontdb::Database::new()),
            RenderOptions {
                scale: 3.0,
                ..Default::default()
            },
        );
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"/>"#;
        let pixmap = backend.rasterize(svg).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (12, 6));
    }

    #[test]
    fn test_dpi_option_sizes_physical_units() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="5mm"/>"#;
        let at = |dpi: f32| {
            let backend = ResvgBackend::new(
                Arc::new(fontdb::Database::new()),
                RenderOptions {
                    dpi,
                    ..Default::default()
                },
            );
            let pixmap = backend.rasterize(svg).unwrap();
            (pixmap.width(), pixmap.height())
        };

        // 10mm = 37.8px at 96 dpi
        assert_eq!(at(96.0), (38, 19));
        assert_eq!(at(192.0), (76, 38));
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        let result = backend().render_png(b"<svg><rect></svg");
        assert!(matches!(result, Err(RenderError::SvgParse(_))));
    }
}
