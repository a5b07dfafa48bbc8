use crate::error::RenderError;
use crate::models::RasterImage;
use std::io::Cursor;

/// Decode PNG bytes into an RGBA8 [`RasterImage`].
///
/// Palette and sub-byte formats are expanded, 16-bit channels are stripped to
/// 8 bits, and formats without alpha get an opaque alpha channel.
pub fn decode_png(png_data: &[u8]) -> Result<RasterImage, RenderError> {
    let mut decoder = png::Decoder::new(Cursor::new(png_data));
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder
        .read_info()
        .map_err(|e| RenderError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| RenderError::PngDecode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(RenderError::PngDecode(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };

    RasterImage::from_rgba(info.width, info.height, rgba).ok_or_else(|| {
        RenderError::PngDecode(format!(
            "pixel data does not match {}x{}",
            info.width, info.height
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_rgb_gets_opaque_alpha() {
        let png = encode(2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);
        let image = decode_png(&png).unwrap();

        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_grayscale_alpha_expands() {
        let png = encode(1, 1, png::ColorType::GrayscaleAlpha, &[100, 50]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.pixel(0, 0), Some([100, 100, 100, 50]));
    }

    #[test]
    fn test_grayscale_expands() {
        let png = encode(2, 1, png::ColorType::Grayscale, &[0, 200]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.pixels(), &[0, 0, 0, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_rgba_passes_through() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let png = encode(2, 1, png::ColorType::Rgba, &data);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.pixels(), &data);
    }

    #[test]
    fn test_indexed_is_expanded() {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![10, 20, 30, 40, 50, 60]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 0]).unwrap();
        }
        let image = decode_png(&out).unwrap();
        assert_eq!(image.pixels(), &[40, 50, 60, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = decode_png(b"definitely not a png");
        assert!(matches!(result, Err(RenderError::PngDecode(_))));
    }
}
