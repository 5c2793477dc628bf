//! Wind barb rendering.
//!
//! Barbs are drawn as vector paths. The staff points from the station
//! towards the direction the wind blows from; speed in knots is rounded to
//! the nearest 5 knots and encoded as pennants (50), full barbs (10) and a
//! half barb (5). Calm winds are drawn as an empty circle.

use tiny_skia::{FillRule, LineCap, LineJoin, PathBuilder, Pixmap, Stroke, Transform};

use crate::gradient::Color;

/// Barb feature spacing along the staff, relative to the staff length.
const SPACING: f32 = 0.125;
/// Length of a full barb perpendicular to the staff, relative to the staff length.
const HEIGHT: f32 = 0.4;
/// Base width of a pennant along the staff, relative to the staff length.
const PENNANT_WIDTH: f32 = 0.25;
/// Radius of the calm circle, relative to the staff length.
const CALM_RADIUS: f32 = 0.15;

/// Configuration for wind barb rendering
#[derive(Debug, Clone, Copy)]
pub struct BarbStyle {
    /// Staff length in pixels
    pub length: f32,
    pub line_width: f32,
    pub color: Color,
}

/// Decomposition of a wind speed into barb features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarbCounts {
    pub pennants: u32,
    pub full: u32,
    pub half: bool,
}

impl BarbCounts {
    /// Split a speed in knots, rounded to the nearest 5 knots.
    pub fn from_knots(speed: f64) -> Self {
        if !speed.is_finite() || speed <= 0.0 {
            return Self::default();
        }
        let rounded = ((speed / 5.0).round() * 5.0) as u32;
        Self {
            pennants: rounded / 50,
            full: (rounded % 50) / 10,
            half: rounded % 10 >= 5,
        }
    }

    pub fn is_calm(&self) -> bool {
        self.pennants == 0 && self.full == 0 && !self.half
    }
}

/// Draw one barb at (x, y).
///
/// `toward` is the screen-space unit vector pointing to where the wind
/// comes from.
pub fn draw_barb(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    toward: (f32, f32),
    speed_knots: f64,
    style: &BarbStyle,
) {
    let paint = style.color.to_paint();
    let stroke = Stroke {
        width: style.line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let counts = BarbCounts::from_knots(speed_knots);
    let length = style.length;

    if counts.is_calm() {
        if let Some(path) = PathBuilder::from_circle(x, y, length * CALM_RADIUS) {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        return;
    }

    let (dx, dy) = toward;
    // Features sit on the clockwise side of the staff
    let (px, py) = (-dy, dx);
    let tip = (x + dx * length, y + dy * length);
    // Point on the staff `s` pixels in from the tip
    let at = |s: f32| (tip.0 - dx * s, tip.1 - dy * s);

    let spacing = length * SPACING;
    let height = length * HEIGHT;
    let pennant_width = length * PENNANT_WIDTH;

    let mut lines = PathBuilder::new();
    lines.move_to(x, y);
    lines.line_to(tip.0, tip.1);

    let mut pennants = PathBuilder::new();
    let mut offset = 0.0;

    for _ in 0..counts.pennants {
        let (ax, ay) = at(offset);
        let (bx, by) = at(offset + pennant_width);
        let (mx, my) = at(offset + pennant_width / 2.0);
        pennants.move_to(ax, ay);
        pennants.line_to(mx + px * height, my + py * height);
        pennants.line_to(bx, by);
        pennants.close();
        offset += pennant_width + spacing;
    }

    let mut barb_line = |offset: f32, fraction: f32| {
        let (sx, sy) = at(offset);
        let h = height * fraction;
        lines.move_to(sx, sy);
        lines.line_to(
            sx + px * h + dx * pennant_width * fraction / 2.0,
            sy + py * h + dy * pennant_width * fraction / 2.0,
        );
    };

    for _ in 0..counts.full {
        barb_line(offset, 1.0);
        offset += spacing;
    }
    if counts.half {
        // A lone half barb is set in from the tip
        if counts.pennants == 0 && counts.full == 0 {
            offset += spacing;
        }
        barb_line(offset, 0.5);
    }

    if let Some(path) = pennants.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    if let Some(path) = lines.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(
            BarbCounts::from_knots(65.0),
            BarbCounts { pennants: 1, full: 1, half: true }
        );
        assert_eq!(
            BarbCounts::from_knots(23.0),
            BarbCounts { pennants: 0, full: 2, half: true }
        );
        assert_eq!(
            BarbCounts::from_knots(12.4),
            BarbCounts { pennants: 0, full: 1, half: false }
        );
        assert_eq!(
            BarbCounts::from_knots(100.0),
            BarbCounts { pennants: 2, full: 0, half: false }
        );
    }

    #[test]
    fn test_calm() {
        assert!(BarbCounts::from_knots(2.0).is_calm());
        assert!(BarbCounts::from_knots(0.0).is_calm());
        assert!(BarbCounts::from_knots(f64::NAN).is_calm());
        assert!(!BarbCounts::from_knots(2.5).is_calm());
    }

    #[test]
    fn test_barb_extends_toward_source() {
        let mut pixmap = Pixmap::new(100, 100).unwrap();
        let style = BarbStyle {
            length: 40.0,
            line_width: 2.0,
            color: Color::BLACK,
        };
        // Wind from the north: staff points up
        draw_barb(&mut pixmap, 50.0, 50.0, (0.0, -1.0), 20.0, &style);
        assert!(pixmap.pixel(50, 20).map_or(false, |p| p.alpha() > 0));
        assert!(pixmap.pixel(50, 80).map_or(false, |p| p.alpha() == 0));
    }
}
