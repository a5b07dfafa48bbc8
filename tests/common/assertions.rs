//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use svgpng::RasterImage;

/// Assert image is RGBA with the expected dimensions
pub fn assert_rgba(image: &RasterImage, width: u32, height: u32) {
    assert!(image.has_alpha(), "Expected an alpha channel");
    assert_eq!(image.channels(), 4);
    assert_eq!((image.width(), image.height()), (width, height));
    assert_eq!(image.pixels().len(), (width * height * 4) as usize);
}

/// Assert every pixel equals `expected`
pub fn assert_all_pixels(image: &RasterImage, expected: [u8; 4]) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            assert_eq!(
                image.pixel(x, y),
                Some(expected),
                "Unexpected pixel at ({x}, {y})"
            );
        }
    }
}
