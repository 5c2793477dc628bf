//! Stroke-font text for station values and isobar labels.
//!
//! Characters are drawn as 7-segment style polylines, so no font files are
//! needed. Only the characters that appear in station plots are defined:
//! digits, minus sign and decimal point.

use tiny_skia::{LineCap, LineJoin, PathBuilder, Pixmap, Stroke, Transform};

use crate::gradient::Color;

/// Character cell width relative to the text size.
const CHAR_WIDTH: f32 = 0.55;
/// Gap between characters relative to the text size.
const CHAR_SPACING: f32 = 0.15;
/// Stroke width relative to the text size.
const STROKE_WIDTH: f32 = 0.13;

/// How a piece of text is drawn.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Glyph height in pixels
    pub size: f32,
    pub color: Color,
    /// Halo drawn behind the glyphs, with its width in pixels
    pub outline: Option<(Color, f32)>,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            outline: None,
        }
    }

    pub fn with_outline(mut self, color: Color, width: f32) -> Self {
        self.outline = Some((color, width));
        self
    }
}

/// Width of `text` drawn at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let n = text.chars().count() as f32;
    if n == 0.0 {
        return 0.0;
    }
    n * size * (CHAR_WIDTH + CHAR_SPACING) - size * CHAR_SPACING
}

/// Draw `text` centred on (x, y), rotated by `angle` radians.
pub fn draw_text(pixmap: &mut Pixmap, x: f32, y: f32, angle: f32, text: &str, style: &TextStyle) {
    let path = match text_path(x, y, angle, text, style.size) {
        Some(path) => path,
        None => return,
    };
    let base_width = style.size * STROKE_WIDTH;

    if let Some((color, width)) = style.outline {
        let stroke = glyph_stroke(base_width + 2.0 * width);
        pixmap.stroke_path(&path, &color.to_paint(), &stroke, Transform::identity(), None);
    }
    let stroke = glyph_stroke(base_width);
    pixmap.stroke_path(&path, &style.color.to_paint(), &stroke, Transform::identity(), None);
}

fn glyph_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Build one path holding all segments of all characters.
fn text_path(
    x: f32,
    y: f32,
    angle: f32,
    text: &str,
    size: f32,
) -> Option<tiny_skia::Path> {
    let char_width = size * CHAR_WIDTH;
    let advance = size * (CHAR_WIDTH + CHAR_SPACING);
    let start_x = -text_width(text, size) / 2.0 + char_width / 2.0;
    let (sin_a, cos_a) = angle.sin_cos();
    let rotate = |px: f32, py: f32| (px * cos_a - py * sin_a + x, px * sin_a + py * cos_a + y);

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let cx = start_x + i as f32 * advance;
        for polyline in character_segments(ch, char_width / 2.0, size / 2.0) {
            let mut points = polyline.iter().map(|&(px, py)| rotate(cx + px, py));
            if let Some((x0, y0)) = points.next() {
                pb.move_to(x0, y0);
                for (px, py) in points {
                    pb.line_to(px, py);
                }
            }
        }
    }
    pb.finish()
}

/// Polylines of a character in a cell of half-width `w` and half-height `h`
/// centred on the origin, y pointing down.
fn character_segments(ch: char, w: f32, h: f32) -> Vec<Vec<(f32, f32)>> {
    match ch {
        '0' => vec![vec![(-w, -h), (w, -h), (w, h), (-w, h), (-w, -h)]],
        '1' => vec![vec![(-w * 0.4, -h * 0.6), (0.0, -h), (0.0, h)]],
        '2' => vec![vec![(-w, -h), (w, -h), (w, 0.0), (-w, 0.0), (-w, h), (w, h)]],
        '3' => vec![
            vec![(-w, -h), (w, -h), (w, h), (-w, h)],
            vec![(-w, 0.0), (w, 0.0)],
        ],
        '4' => vec![
            vec![(-w, -h), (-w, 0.0), (w, 0.0)],
            vec![(w, -h), (w, h)],
        ],
        '5' => vec![vec![(w, -h), (-w, -h), (-w, 0.0), (w, 0.0), (w, h), (-w, h)]],
        '6' => vec![vec![(w, -h), (-w, -h), (-w, h), (w, h), (w, 0.0), (-w, 0.0)]],
        '7' => vec![vec![(-w, -h), (w, -h), (0.0, h)]],
        '8' => vec![
            vec![(-w, -h), (w, -h), (w, h), (-w, h), (-w, -h)],
            vec![(-w, 0.0), (w, 0.0)],
        ],
        '9' => vec![vec![(w, 0.0), (-w, 0.0), (-w, -h), (w, -h), (w, h), (-w, h)]],
        '-' => vec![vec![(-w, 0.0), (w, 0.0)]],
        '.' => vec![vec![(0.0, h * 0.8), (0.0, h * 0.9)]],
        _ => vec![],
    }
}
