//! SVG rendering backends.
//!
//! Every backend turns SVG bytes into PNG bytes. The PNG is only a handoff
//! format; [`decode::decode_png`] turns it into a [`crate::models::RasterImage`].

pub mod decode;
pub mod drawing;
mod markup;
mod repair;
pub mod svg_to_png;

pub use decode::decode_png;
pub use drawing::{Drawing, DrawingBackend};
pub use svg_to_png::ResvgBackend;

use crate::error::RenderError;
use crate::models::RenderOptions;
use markup::{Token, Tokenizer};
use resvg::usvg;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A renderer that produces PNG bytes with a transparent background
pub trait RenderBackend: Send + Sync {
    /// Short name used in log and feedback messages
    fn name(&self) -> &'static str;

    /// Render SVG data to PNG bytes
    fn render_png(&self, svg_data: &[u8]) -> Result<Vec<u8>, RenderError>;
}

/// Build the font database shared by all backends.
pub fn load_font_database(fonts_dir: Option<&Path>, system_fonts: bool) -> Arc<fontdb::Database> {
    let mut fontdb = fontdb::Database::new();

    if let Some(dir) = fonts_dir {
        fontdb.load_fonts_dir(dir);
        tracing::debug!(dir = %dir.display(), "Loaded fonts from directory");
    }

    if system_fonts {
        fontdb.load_system_fonts();
    }

    tracing::info!(
        font_count = fontdb.len(),
        "Loaded fonts for SVG text rendering"
    );

    Arc::new(fontdb)
}

/// Shared parse step: usvg options from our render options, then the tree.
pub(crate) fn parse_tree(
    svg_data: &[u8],
    options: &RenderOptions,
    fontdb: &Arc<fontdb::Database>,
) -> Result<usvg::Tree, RenderError> {
    let usvg_options = usvg::Options {
        dpi: options.dpi,
        fontdb: fontdb.clone(),
        ..Default::default()
    };
    let svg_data = ensure_svg_namespace(svg_data);
    usvg::Tree::from_data(&svg_data, &usvg_options)
        .map_err(|e| RenderError::SvgParse(e.to_string()))
}

/// Output pixel size for a tree at the given scale
pub(crate) fn canvas_size(tree: &usvg::Tree, scale: f32) -> Result<(u32, u32), RenderError> {
    let size = tree.size();
    let width = (size.width() * scale).ceil();
    let height = (size.height() * scale).ceil();

    if !(width >= 1.0 && height >= 1.0) {
        return Err(RenderError::EmptyCanvas { width, height });
    }

    Ok((width as u32, height as u32))
}

/// Add the SVG namespace to the root `<svg>` element when it is missing.
///
/// Hand-written SVG often omits `xmlns`, which usvg would otherwise reject.
/// Compressed (svgz) and non-UTF-8 input is passed through untouched.
pub(crate) fn ensure_svg_namespace(svg_data: &[u8]) -> Cow<'_, [u8]> {
    if svg_data.starts_with(&[0x1f, 0x8b]) {
        return Cow::Borrowed(svg_data);
    }
    let Ok(text) = std::str::from_utf8(svg_data) else {
        return Cow::Borrowed(svg_data);
    };

    let root = Tokenizer::new(text).find_map(|token| match token {
        Token::StartTag(tag) => Some(tag),
        _ => None,
    });
    let Some(root) = root.filter(|tag| tag.name == "svg" && !tag.has_attribute("xmlns")) else {
        return Cow::Borrowed(svg_data);
    };

    let insert_at = root.name_end;
    let mut patched = Vec::with_capacity(svg_data.len() + SVG_NS.len() + 9);
    patched.extend_from_slice(&svg_data[..insert_at]);
    patched.extend_from_slice(b" xmlns=\"");
    patched.extend_from_slice(SVG_NS.as_bytes());
    patched.push(b'"');
    patched.extend_from_slice(&svg_data[insert_at..]);
    Cow::Owned(patched)
}
