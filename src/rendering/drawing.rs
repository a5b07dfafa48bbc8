//! Secondary backend: SVG to an intermediate vector drawing, then to pixels.
//!
//! The SVG is parsed into a usvg tree and flattened into a [`Drawing`]: shapes
//! in device space, plus layers for groups that are clipped or translucent.
//! The drawing is then rasterized with tiny-skia. Masks, filters, patterns
//! and embedded images are skipped.
//!
//! Input that does not parse is repaired once and parsed again, so truncated
//! files and SVG inside an HTML page still produce an image.

use super::repair::repair_markup;
use super::{canvas_size, parse_tree, RenderBackend};
use crate::error::RenderError;
use crate::models::RenderOptions;
use resvg::usvg;
use std::sync::Arc;
use tiny_skia::{
    FillRule, GradientStop, Mask, Paint, Pixmap, PixmapPaint, Point, Shader, SpreadMode,
    Transform,
};

/// Flattened vector drawing of one SVG document
#[derive(Debug, Clone)]
pub struct Drawing {
    pub width: u32,
    pub height: u32,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    Shape(Shape),
    Layer(Layer),
}

/// Group drawn on its own canvas, clipped, then composited with `opacity`
#[derive(Debug, Clone)]
pub struct Layer {
    pub opacity: f32,
    pub clip: Option<Clip>,
    pub items: Vec<Item>,
}

/// Clip region: the union of `shapes`, limited further by `clip`
#[derive(Debug, Clone)]
pub struct Clip {
    pub shapes: Vec<ClipShape>,
    pub clip: Option<Box<Clip>>,
}

#[derive(Debug, Clone)]
pub struct ClipShape {
    pub path: tiny_skia::Path,
    pub rule: FillRule,
    pub transform: Transform,
}

/// One path with its absolute transform and paint
#[derive(Debug, Clone)]
pub struct Shape {
    pub path: tiny_skia::Path,
    pub transform: Transform,
    pub fill: Option<FillStyle>,
    pub stroke: Option<StrokeStyle>,
    /// Paint the stroke before the fill (`paint-order: stroke`)
    pub stroke_first: bool,
}

#[derive(Debug, Clone)]
pub struct FillStyle {
    pub brush: Brush,
    pub rule: FillRule,
}

#[derive(Debug, Clone)]
pub struct StrokeStyle {
    pub brush: Brush,
    pub stroke: tiny_skia::Stroke,
}

/// Paint source with fill or stroke opacity already applied
#[derive(Debug, Clone)]
pub enum Brush {
    Solid(tiny_skia::Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
        spread: SpreadMode,
        transform: Transform,
    },
    Radial {
        focal: Point,
        center: Point,
        radius: f32,
        stops: Vec<GradientStop>,
        spread: SpreadMode,
        transform: Transform,
    },
}

impl Brush {
    fn shader(&self) -> Option<Shader<'static>> {
        match self {
            Brush::Solid(color) => Some(Shader::SolidColor(*color)),
            Brush::Linear {
                start,
                end,
                stops,
                spread,
                transform,
            } => tiny_skia::LinearGradient::new(*start, *end, stops.clone(), *spread, *transform),
            Brush::Radial {
                focal,
                center,
                radius,
                stops,
                spread,
                transform,
            } => tiny_skia::RadialGradient::new(
                *focal,
                *center,
                *radius,
                stops.clone(),
                *spread,
                *transform,
            ),
        }
    }
}

impl Drawing {
    /// Build a drawing from a parsed tree, scaled to device pixels
    pub fn from_tree(tree: &usvg::Tree, scale: f32) -> Result<Self, RenderError> {
        let (width, height) = canvas_size(tree, scale)?;
        let mut items = Vec::new();
        collect_group(tree.root(), Transform::from_scale(scale, scale), &mut items);
        Ok(Self {
            width,
            height,
            items,
        })
    }

    /// Every shape in paint order, including those inside layers
    pub fn shapes(&self) -> Vec<&Shape> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a Shape>) {
            for item in items {
                match item {
                    Item::Shape(shape) => out.push(shape),
                    Item::Layer(layer) => walk(&layer.items, out),
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }

    /// Rasterize onto a fresh, fully transparent pixmap
    pub fn rasterize(&self) -> Result<Pixmap, RenderError> {
        let mut pixmap =
            Pixmap::new(self.width, self.height).ok_or(RenderError::PixmapAllocation)?;
        draw_items(&mut pixmap, &self.items)?;
        Ok(pixmap)
    }
}

impl Clip {
    fn to_mask(&self, width: u32, height: u32) -> Result<Mask, RenderError> {
        let mut mask = Mask::new(width, height).ok_or(RenderError::PixmapAllocation)?;
        for shape in &self.shapes {
            mask.fill_path(&shape.path, shape.rule, true, shape.transform);
        }
        Ok(mask)
    }
}

fn draw_items(pixmap: &mut Pixmap, items: &[Item]) -> Result<(), RenderError> {
    for item in items {
        match item {
            Item::Shape(shape) => draw_shape(pixmap, shape),
            Item::Layer(layer) => draw_layer(pixmap, layer)?,
        }
    }
    Ok(())
}

fn draw_layer(pixmap: &mut Pixmap, layer: &Layer) -> Result<(), RenderError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut canvas = Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation)?;
    draw_items(&mut canvas, &layer.items)?;

    let mut clip = layer.clip.as_ref();
    while let Some(region) = clip {
        canvas.apply_mask(&region.to_mask(width, height)?);
        clip = region.clip.as_deref();
    }

    let paint = PixmapPaint {
        opacity: layer.opacity,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, canvas.as_ref(), &paint, Transform::identity(), None);
    Ok(())
}

fn draw_shape(pixmap: &mut Pixmap, shape: &Shape) {
    if shape.stroke_first {
        stroke_shape(pixmap, shape);
        fill_shape(pixmap, shape);
    } else {
        fill_shape(pixmap, shape);
        stroke_shape(pixmap, shape);
    }
}

fn paint_for(brush: &Brush) -> Option<Paint<'static>> {
    let mut paint = Paint::default();
    paint.shader = brush.shader()?;
    paint.anti_alias = true;
    Some(paint)
}

fn fill_shape(pixmap: &mut Pixmap, shape: &Shape) {
    let Some(fill) = &shape.fill else { return };
    if let Some(paint) = paint_for(&fill.brush) {
        pixmap.fill_path(&shape.path, &paint, fill.rule, shape.transform, None);
    }
}

fn stroke_shape(pixmap: &mut Pixmap, shape: &Shape) {
    let Some(stroke) = &shape.stroke else { return };
    if let Some(paint) = paint_for(&stroke.brush) {
        pixmap.stroke_path(&shape.path, &paint, &stroke.stroke, shape.transform, None);
    }
}

fn collect_group(group: &usvg::Group, transform: Transform, out: &mut Vec<Item>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(child) => {
                if child.mask().is_some() {
                    tracing::debug!(id = child.id(), "Ignoring mask");
                }
                if !child.filters().is_empty() {
                    tracing::debug!(id = child.id(), "Ignoring filters");
                }

                let transform = transform.pre_concat(child.transform());
                let clip = child.clip_path().map(|clip| convert_clip(clip, transform));
                let opacity = child.opacity().get();

                if clip.is_none() && opacity >= 1.0 {
                    collect_group(child, transform, out);
                } else {
                    let mut items = Vec::new();
                    collect_group(child, transform, &mut items);
                    out.push(Item::Layer(Layer {
                        opacity,
                        clip,
                        items,
                    }));
                }
            }
            usvg::Node::Path(path) => {
                if let Some(shape) = convert_path(path, transform) {
                    out.push(Item::Shape(shape));
                }
            }
            usvg::Node::Text(text) => {
                // Glyph outlines, already positioned relative to the parent
                collect_group(text.flattened(), transform, out);
            }
            usvg::Node::Image(image) => {
                tracing::debug!(id = image.id(), "Skipping embedded image");
            }
        }
    }
}

/// `transform` is the device transform of the clipped group
fn convert_clip(clip: &usvg::ClipPath, transform: Transform) -> Clip {
    let mut shapes = Vec::new();
    collect_clip_shapes(clip.root(), transform.pre_concat(clip.transform()), &mut shapes);
    Clip {
        shapes,
        clip: clip
            .clip_path()
            .map(|inner| Box::new(convert_clip(inner, transform))),
    }
}

fn collect_clip_shapes(group: &usvg::Group, transform: Transform, out: &mut Vec<ClipShape>) {
    for node in group.children() {
        match node {
            usvg::Node::Path(path) => {
                let Some(fill) = path.fill().filter(|_| path.is_visible()) else {
                    continue;
                };
                out.push(ClipShape {
                    path: path.data().clone(),
                    rule: convert_rule(fill.rule()),
                    transform,
                });
            }
            usvg::Node::Text(text) => collect_clip_shapes(text.flattened(), transform, out),
            usvg::Node::Group(child) => {
                if child.clip_path().is_some() {
                    tracing::debug!(id = child.id(), "Ignoring clip path inside clip path");
                }
                collect_clip_shapes(child, transform.pre_concat(child.transform()), out);
            }
            usvg::Node::Image(_) => {}
        }
    }
}

fn convert_path(path: &usvg::Path, transform: Transform) -> Option<Shape> {
    if !path.is_visible() {
        return None;
    }

    let fill = path.fill().and_then(|fill| {
        let brush = convert_paint(fill.paint(), fill.opacity().get())?;
        Some(FillStyle {
            brush,
            rule: convert_rule(fill.rule()),
        })
    });

    let stroke = path.stroke().and_then(|stroke| {
        let brush = convert_paint(stroke.paint(), stroke.opacity().get())?;
        Some(StrokeStyle {
            brush,
            stroke: convert_stroke(stroke),
        })
    });

    if fill.is_none() && stroke.is_none() {
        return None;
    }

    Some(Shape {
        path: path.data().clone(),
        transform,
        fill,
        stroke,
        stroke_first: matches!(path.paint_order(), usvg::PaintOrder::StrokeAndFill),
    })
}

fn convert_rule(rule: usvg::FillRule) -> FillRule {
    match rule {
        usvg::FillRule::NonZero => FillRule::Winding,
        usvg::FillRule::EvenOdd => FillRule::EvenOdd,
    }
}

fn convert_paint(paint: &usvg::Paint, opacity: f32) -> Option<Brush> {
    match paint {
        usvg::Paint::Color(c) => Some(Brush::Solid(tiny_skia::Color::from_rgba8(
            c.red,
            c.green,
            c.blue,
            alpha_u8(opacity),
        ))),
        usvg::Paint::LinearGradient(lg) => Some(Brush::Linear {
            start: Point::from_xy(lg.x1(), lg.y1()),
            end: Point::from_xy(lg.x2(), lg.y2()),
            stops: convert_stops(lg.stops(), opacity),
            spread: convert_spread(lg.spread_method()),
            transform: lg.transform(),
        }),
        usvg::Paint::RadialGradient(rg) => Some(Brush::Radial {
            focal: Point::from_xy(rg.fx(), rg.fy()),
            center: Point::from_xy(rg.cx(), rg.cy()),
            radius: rg.r().get(),
            stops: convert_stops(rg.stops(), opacity),
            spread: convert_spread(rg.spread_method()),
            transform: rg.transform(),
        }),
        usvg::Paint::Pattern(_) => {
            tracing::debug!("Skipping pattern paint");
            None
        }
    }
}

fn convert_stops(stops: &[usvg::Stop], opacity: f32) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|stop| {
            let c = stop.color();
            let color = tiny_skia::Color::from_rgba8(
                c.red,
                c.green,
                c.blue,
                alpha_u8(stop.opacity().get() * opacity),
            );
            GradientStop::new(stop.offset().get(), color)
        })
        .collect()
}

fn convert_spread(method: usvg::SpreadMethod) -> SpreadMode {
    match method {
        usvg::SpreadMethod::Pad => SpreadMode::Pad,
        usvg::SpreadMethod::Reflect => SpreadMode::Reflect,
        usvg::SpreadMethod::Repeat => SpreadMode::Repeat,
    }
}

fn convert_stroke(stroke: &usvg::Stroke) -> tiny_skia::Stroke {
    let mut out = tiny_skia::Stroke {
        width: stroke.width().get(),
        miter_limit: stroke.miterlimit().get(),
        line_cap: match stroke.linecap() {
            usvg::LineCap::Butt => tiny_skia::LineCap::Butt,
            usvg::LineCap::Round => tiny_skia::LineCap::Round,
            usvg::LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match stroke.linejoin() {
            usvg::LineJoin::Miter => tiny_skia::LineJoin::Miter,
            usvg::LineJoin::MiterClip => tiny_skia::LineJoin::MiterClip,
            usvg::LineJoin::Round => tiny_skia::LineJoin::Round,
            usvg::LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        dash: None,
    };

    if let Some(list) = stroke.dasharray() {
        out.dash = tiny_skia::StrokeDash::new(list.to_vec(), stroke.dashoffset());
    }

    out
}

fn alpha_u8(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Secondary backend built on the intermediate [`Drawing`]
pub struct DrawingBackend {
    fontdb: Arc<fontdb::Database>,
    options: RenderOptions,
}

impl DrawingBackend {
    pub fn new(fontdb: Arc<fontdb::Database>, options: RenderOptions) -> Self {
        Self { fontdb, options }
    }

    /// Parse SVG data into the intermediate drawing.
    ///
    /// When the markup does not parse, or yields an empty canvas, it is
    /// repaired and parsed once more. If that fails too, the first error is
    /// returned.
    pub fn to_drawing(&self, svg_data: &[u8]) -> Result<Drawing, RenderError> {
        let drawing = match self.build_drawing(svg_data) {
            Ok(drawing) => drawing,
            Err(e @ (RenderError::SvgParse(_) | RenderError::EmptyCanvas { .. })) => {
                let Some(repaired) = repair_markup(svg_data) else {
                    return Err(e);
                };
                tracing::debug!(error = %e, "Retrying with repaired SVG markup");
                self.build_drawing(repaired.as_bytes()).map_err(|_| e)?
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            items = drawing.items.len(),
            width = drawing.width,
            height = drawing.height,
            "Built vector drawing"
        );
        Ok(drawing)
    }

    fn build_drawing(&self, svg_data: &[u8]) -> Result<Drawing, RenderError> {
        let tree = parse_tree(svg_data, &self.options, &self.fontdb)?;
        Drawing::from_tree(&tree, self.options.scale)
    }
}

impl RenderBackend for DrawingBackend {
    fn name(&self) -> &'static str {
        "drawing"
    }

    fn render_png(&self, svg_data: &[u8]) -> Result<Vec<u8>, RenderError> {
        self.to_drawing(svg_data)?
            .rasterize()?
            .encode_png()
            .map_err(|e| RenderError::PngEncode(e.to_string()))
    }
}
