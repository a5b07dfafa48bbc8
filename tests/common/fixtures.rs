//! Test fixtures and constants.

/// SVG documents used across tests
pub mod svgs {
    /// 10x10 opaque red square, without an xmlns declaration
    pub const RED_SQUARE: &[u8] =
        br#"<svg width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;

    /// Solid white background covering the whole canvas
    pub const WHITE_BACKGROUND: &[u8] =
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
  <rect width="16" height="16" fill="white"/>
  <circle cx="8" cy="8" r="4" fill="black"/>
</svg>"#;

    /// Circle on an otherwise empty canvas
    pub const CIRCLE_ON_NOTHING: &[u8] =
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20">
  <circle cx="10" cy="10" r="5" fill="#3366cc" stroke="#000" stroke-width="1"/>
</svg>"##;

    /// Mixed content both backends can draw
    pub const SHAPES: &[u8] =
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30" viewBox="0 0 80 60">
  <defs>
    <linearGradient id="fade" x1="0" x2="1">
      <stop offset="0" stop-color="#ff0000"/>
      <stop offset="1" stop-color="#0000ff" stop-opacity="0.2"/>
    </linearGradient>
  </defs>
  <rect x="4" y="4" width="72" height="20" fill="url(#fade)"/>
  <g transform="translate(40 40) rotate(15)" opacity="0.8">
    <path d="M -10 -10 L 10 -10 L 0 12 Z" fill="green" stroke="black" stroke-dasharray="2 1"/>
  </g>
</svg>"##;

    /// Markup with no `<svg>` element, which no backend can draw
    pub const NOT_SVG: &[u8] = b"<html><body><p>No image here</body>";

    /// Red square cut off before its closing tag
    pub const TRUNCATED: &[u8] =
        br#"<svg width="10" height="10"><rect width="10" height="10" fill="red"/>"#;

    /// Red square inside an HTML page, with unquoted attributes
    pub const IN_HTML: &[u8] = b"<!DOCTYPE html><html><body><h1>Logo</h1>\
        <svg width=10 height=10><rect width=10 height=10 fill=red></svg></body></html>";

    pub const EMPTY: &[u8] = b"";
}
