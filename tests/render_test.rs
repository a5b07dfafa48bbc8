//! Backend rendering tests: physical units, DPI and text.

mod common;

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use svgpng::rendering::{load_font_database, DrawingBackend, RenderBackend, ResvgBackend};
use svgpng::{RasterImage, RenderOptions};

const MM_SQUARE: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="10mm">
  <rect width="100%" height="100%" fill="blue"/>
</svg>"#;

const GREETING: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="80" height="30">
  <text x="4" y="22" font-family="Tuffy" font-size="20" fill="black">Hello</text>
</svg>"#;

fn fonts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fonts")
}

fn backends(fontdb: Arc<fontdb::Database>, options: RenderOptions) -> Vec<Box<dyn RenderBackend>> {
    vec![
        Box::new(ResvgBackend::new(fontdb.clone(), options)),
        Box::new(DrawingBackend::new(fontdb, options)),
    ]
}

fn render(backend: &dyn RenderBackend, svg: &[u8]) -> RasterImage {
    svgpng::rendering::decode_png(&backend.render_png(svg).unwrap()).unwrap()
}

fn painted_pixels(image: &RasterImage) -> usize {
    image.pixels().chunks_exact(4).filter(|p| p[3] > 0).count()
}

#[test]
fn test_physical_units_follow_dpi() {
    // 10mm is 37.8px at 96 dpi
    for (dpi, side) in [(96.0, 38), (192.0, 76)] {
        let options = RenderOptions {
            dpi,
            ..Default::default()
        };
        for backend in backends(Arc::new(fontdb::Database::new()), options) {
            let image = render(backend.as_ref(), MM_SQUARE);

            common::assert_rgba(&image, side, side);
            assert_eq!(
                image.pixel(side / 2, side / 2),
                Some([0, 0, 255, 255]),
                "{} at {dpi} dpi",
                backend.name()
            );
        }
    }
}

#[test]
fn test_font_directory_is_loaded() {
    let fontdb = load_font_database(Some(fonts_dir().as_path()), false);
    assert_eq!(fontdb.len(), 1);
    assert!(fontdb
        .faces()
        .any(|face| face.families.iter().any(|(name, _)| name == "Tuffy")));
}

#[test]
fn test_text_is_drawn_with_loaded_fonts() {
    let fontdb = load_font_database(Some(fonts_dir().as_path()), false);

    for backend in backends(fontdb, RenderOptions::default()) {
        let image = render(backend.as_ref(), GREETING);

        common::assert_rgba(&image, 80, 30);
        assert!(
            painted_pixels(&image) > 50,
            "{} drew no glyphs",
            backend.name()
        );
        assert_eq!(image.pixel(79, 0).unwrap()[3], 0, "background must stay clear");
    }
}

#[test]
fn test_text_without_fonts_draws_nothing() {
    for backend in backends(Arc::new(fontdb::Database::new()), RenderOptions::default()) {
        let image = render(backend.as_ref(), GREETING);

        common::assert_rgba(&image, 80, 30);
        assert_eq!(painted_pixels(&image), 0, "{}", backend.name());
    }
}

#[test]
fn test_backends_draw_text_alike() {
    let fontdb = load_font_database(Some(fonts_dir().as_path()), false);
    let images: Vec<_> = backends(fontdb, RenderOptions::default())
        .iter()
        .map(|backend| render(backend.as_ref(), GREETING))
        .collect();

    let (a, b) = (painted_pixels(&images[0]), painted_pixels(&images[1]));
    assert!(a.abs_diff(b) * 10 <= a, "resvg painted {a}, drawing painted {b}");
}
