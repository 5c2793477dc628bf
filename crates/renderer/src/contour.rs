//! Isobar rendering using the marching squares algorithm.
//!
//! Contours are traced in grid index space over an [`InterpolationGrid`],
//! chained into polylines, smoothed, and only then mapped through the
//! [`MapFrame`] into pixels. Grid nodes without data break the lines.

use station_analysis::InterpolationGrid;
use tiny_skia::{LineCap, LineJoin, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};
use tracing::debug;

use crate::frame::MapFrame;
use crate::glyphs::{self, TextStyle};
use crate::gradient::Color;

/// Tolerance for joining segment end points (grid units).
const JOIN_EPSILON: f32 = 1e-3;

/// A point in grid index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn near(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < JOIN_EPSILON && (self.y - other.y).abs() < JOIN_EPSILON
    }
}

/// A line segment between two points
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f32,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// One isobar level and whether it is drawn as a major line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsobarLevel {
    pub value: f32,
    pub major: bool,
}

/// Styling of the isobar analysis. Widths and sizes are in points.
#[derive(Debug, Clone)]
pub struct IsobarStyle {
    /// Lowest level (hPa)
    pub min_level: i32,
    /// Levels stop below this value (hPa)
    pub max_level: i32,
    pub major_interval: i32,
    pub minor_interval: i32,
    pub major_width: f32,
    pub minor_width: f32,
    /// Dash and gap length of minor isobars
    pub minor_dash: [f32; 2],
    pub color: Color,
    /// Chaikin smoothing passes (0 = no smoothing)
    pub smoothing_passes: u32,
    pub labels_enabled: bool,
    pub major_label_size: f32,
    pub minor_label_size: f32,
    /// Minimum spacing between labels along one line
    pub label_spacing: f32,
}

impl Default for IsobarStyle {
    fn default() -> Self {
        Self {
            min_level: 950,
            max_level: 1050,
            major_interval: 10,
            minor_interval: 1,
            major_width: 2.0,
            minor_width: 1.0,
            minor_dash: [6.0, 4.0],
            color: Color::BLACK,
            smoothing_passes: 1,
            labels_enabled: true,
            major_label_size: 12.0,
            minor_label_size: 10.0,
            label_spacing: 300.0,
        }
    }
}

impl IsobarStyle {
    /// All levels in `[min_level, max_level)`: multiples of the major
    /// interval above `min_level` are major, the remaining minor steps are
    /// minor.
    pub fn levels(&self) -> Vec<IsobarLevel> {
        if self.minor_interval <= 0 || self.max_level <= self.min_level {
            return vec![];
        }
        (self.min_level..self.max_level)
            .step_by(self.minor_interval as usize)
            .map(|value| IsobarLevel {
                value: value as f32,
                major: self.major_interval > 0
                    && (value - self.min_level) % self.major_interval == 0,
            })
            .collect()
    }
}

/// Marching squares over row-major `data` of `width` x `height` nodes.
///
/// NaN nodes have no data; cells touching one produce no segments.
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0;
            if tl >= level { cell_index |= 1; }
            if tr >= level { cell_index |= 2; }
            if br >= level { cell_index |= 4; }
            if bl >= level { cell_index |= 8; }

            segments.extend(cell_segments(
                cell_index, x as f32, y as f32, [tl, tr, br, bl], level,
            ));
        }
    }

    segments
}

/// Segments for one cell. `corners` is `[tl, tr, br, bl]`.
fn cell_segments(cell_index: u8, x: f32, y: f32, corners: [f32; 4], level: f32) -> Vec<Segment> {
    let [tl, tr, br, bl] = corners;
    let top = interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = interpolate_edge(x, y, x, y + 1.0, tl, bl, level);
    let seg = |start, end| Segment { start, end };

    match cell_index {
        0 | 15 => vec![],
        1 | 14 => vec![seg(left, top)],
        2 | 13 => vec![seg(top, right)],
        3 | 12 => vec![seg(left, right)],
        4 | 11 => vec![seg(right, bottom)],
        // Saddles are resolved with the cell mean
        5 | 10 => {
            let center_high = (tl + tr + br + bl) / 4.0 >= level;
            let tl_high = cell_index == 5;
            if center_high == tl_high {
                vec![seg(left, bottom), seg(top, right)]
            } else {
                vec![seg(left, top), seg(right, bottom)]
            }
        }
        6 | 9 => vec![seg(top, bottom)],
        7 | 8 => vec![seg(left, bottom)],
        _ => vec![],
    }
}

/// Linearly interpolate the level crossing between two edge points
fn interpolate_edge(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    val1: f32,
    val2: f32,
    level: f32,
) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Chain unordered segments into polylines.
///
/// Each polyline is grown at both ends until no unused segment touches it.
pub fn connect_segments(segments: Vec<Segment>, level: f32) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut used = vec![false; segments.len()];

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;
        let mut points = std::collections::VecDeque::from(vec![
            segments[start_idx].start,
            segments[start_idx].end,
        ]);

        for at_end in [true, false] {
            loop {
                let current = if at_end { points.back() } else { points.front() };
                let current = match current {
                    Some(p) => *p,
                    None => break,
                };
                let next = segments.iter().enumerate().find_map(|(i, seg)| {
                    if used[i] {
                        None
                    } else if seg.start.near(&current) {
                        Some((i, seg.end))
                    } else if seg.end.near(&current) {
                        Some((i, seg.start))
                    } else {
                        None
                    }
                });
                match next {
                    Some((i, point)) => {
                        used[i] = true;
                        if at_end {
                            points.push_back(point);
                        } else {
                            points.push_front(point);
                        }
                    }
                    None => break,
                }
            }
        }

        let points: Vec<Point> = points.into_iter().collect();
        let closed = points.len() > 2
            && match (points.first(), points.last()) {
                (Some(first), Some(last)) => first.near(last),
                _ => false,
            };
        contours.push(Contour {
            level,
            points,
            closed,
        });
    }

    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();
    if contour.closed {
        // The duplicated closing point would create a zero-length edge
        points.pop();
    }

    for _ in 0..iterations {
        let n = points.len();
        let mut new_points = Vec::with_capacity(n * 2 + 2);
        let edges = if contour.closed { n } else { n - 1 };

        if !contour.closed {
            new_points.push(points[0]);
        }
        for i in 0..edges {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            new_points.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            new_points.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            new_points.push(points[n - 1]);
        }

        points = new_points;
    }

    if contour.closed {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }

    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Trace all levels over the grid, in grid index space.
pub fn generate_isobars(grid: &InterpolationGrid, style: &IsobarStyle) -> Vec<Contour> {
    let data: Vec<f32> = grid
        .values
        .iter()
        .map(|v| v.map_or(f32::NAN, |v| v as f32))
        .collect();
    let (nx, ny) = (grid.nx(), grid.ny());
    let range = grid.value_range();

    let mut all_contours = Vec::new();
    for level in style.levels() {
        // Levels outside the data range cannot produce segments
        let in_range = range.map_or(false, |(lo, hi)| {
            (level.value as f64) >= lo && (level.value as f64) <= hi
        });
        if !in_range {
            continue;
        }
        let segments = march_squares(&data, nx, ny, level.value);
        for contour in connect_segments(segments, level.value) {
            all_contours.push(smooth_contour(&contour, style.smoothing_passes));
        }
    }
    all_contours
}

/// Draw isobars from an interpolated pressure grid.
pub fn render_isobars(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    grid: &InterpolationGrid,
    style: &IsobarStyle,
) {
    if grid.nx() < 2 || grid.ny() < 2 {
        return;
    }
    let ppp = frame.pixels_per_point();
    let contours = generate_isobars(grid, style);
    let paint = style.color.to_paint();

    let major_stroke = line_stroke(style.major_width * ppp, None);
    let minor_stroke = line_stroke(
        style.minor_width * ppp,
        StrokeDash::new(vec![style.minor_dash[0] * ppp, style.minor_dash[1] * ppp], 0.0),
    );

    let mut labels: Vec<LabelPosition> = Vec::new();

    for contour in &contours {
        let major = is_major(contour.level, style);
        let pixels: Vec<(f32, f32)> = contour
            .points
            .iter()
            .map(|p| grid_to_pixel(grid, frame, p))
            .collect();

        let mut pb = PathBuilder::new();
        if let Some(&(x0, y0)) = pixels.first() {
            pb.move_to(x0, y0);
            for &(x, y) in &pixels[1..] {
                pb.line_to(x, y);
            }
        }
        if let Some(path) = pb.finish() {
            let stroke = if major { &major_stroke } else { &minor_stroke };
            pixmap.stroke_path(&path, &paint, stroke, Transform::identity(), None);
        }

        if style.labels_enabled {
            let size = if major {
                style.major_label_size
            } else {
                style.minor_label_size
            } * ppp;
            collect_label_positions(
                &pixels,
                contour.level,
                size,
                style.label_spacing * ppp,
                frame,
                &mut labels,
            );
        }
    }

    for label in &labels {
        let text_style = TextStyle::new(label.size, style.color).with_outline(Color::WHITE, label.size * 0.1);
        glyphs::draw_text(pixmap, label.x, label.y, label.angle, &label.text, &text_style);
    }

    debug!(
        contours = contours.len(),
        labels = labels.len(),
        "Rendered isobars"
    );
}

fn is_major(level: f32, style: &IsobarStyle) -> bool {
    style.major_interval > 0 && (level.round() as i32 - style.min_level) % style.major_interval == 0
}

fn line_stroke(width: f32, dash: Option<StrokeDash>) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash,
        ..Stroke::default()
    }
}

/// Fractional grid index to pixel position.
fn grid_to_pixel(grid: &InterpolationGrid, frame: &MapFrame, point: &Point) -> (f32, f32) {
    let x = axis_value(&grid.x, point.x);
    let y = axis_value(&grid.y, point.y);
    frame.to_pixel(&projection::ProjectedPoint::new(x, y))
}

fn axis_value(axis: &[f64], index: f32) -> f64 {
    let last = axis.len().saturating_sub(1);
    let i = (index.floor().max(0.0) as usize).min(last.saturating_sub(1));
    let frac = index as f64 - i as f64;
    match (axis.get(i), axis.get(i + 1)) {
        (Some(a), Some(b)) => a + frac * (b - a),
        (Some(a), None) => *a,
        _ => 0.0,
    }
}

/// Position and metadata for a contour label
#[derive(Debug, Clone)]
struct LabelPosition {
    x: f32,
    y: f32,
    angle: f32,
    size: f32,
    text: String,
}

/// Place labels evenly along a line, skipping spots near the map edge or
/// too close to an existing label.
fn collect_label_positions(
    pixels: &[(f32, f32)],
    level: f32,
    size: f32,
    spacing: f32,
    frame: &MapFrame,
    positions: &mut Vec<LabelPosition>,
) {
    let total_length: f32 = pixels
        .windows(2)
        .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
        .sum();
    if total_length < spacing * 0.5 || spacing <= 0.0 {
        return;
    }

    let text = format!("{:.0}", level);
    let margin = size * 2.0;
    let num_labels = ((total_length / spacing).floor() as usize).max(1);
    let step = total_length / (num_labels as f32 + 1.0);

    let mut accumulated = 0.0;
    let mut next_label_at = step;
    let mut placed = 0;

    for w in pixels.windows(2) {
        if placed >= num_labels {
            break;
        }
        let ((x1, y1), (x2, y2)) = (w[0], w[1]);
        let (dx, dy) = (x2 - x1, y2 - y1);
        let segment_length = (dx * dx + dy * dy).sqrt();

        while segment_length > 0.0
            && accumulated + segment_length >= next_label_at
            && placed < num_labels
        {
            let t = (next_label_at - accumulated) / segment_length;
            let x = x1 + t * dx;
            let y = y1 + t * dy;

            let inside = frame.contains_pixel(x, y)
                && x > margin
                && y > margin
                && x < frame.width() as f32 - margin
                && y < frame.height() as f32 - margin;
            let min_distance = size * 4.0;
            let overlaps = positions
                .iter()
                .any(|p| (p.x - x).powi(2) + (p.y - y).powi(2) < min_distance * min_distance);

            if inside && !overlaps {
                let angle = dy.atan2(dx);
                // Keep text upright
                let angle = if angle.abs() > std::f32::consts::FRAC_PI_2 {
                    angle + std::f32::consts::PI
                } else {
                    angle
                };
                positions.push(LabelPosition {
                    x,
                    y,
                    angle,
                    size,
                    text: text.clone(),
                });
            }

            next_label_at += step;
            placed += 1;
        }

        accumulated += segment_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        let levels = IsobarStyle::default().levels();
        assert_eq!(levels.len(), 100);
        assert_eq!(levels[0], IsobarLevel { value: 950.0, major: true });
        assert_eq!(levels[99], IsobarLevel { value: 1049.0, major: false });
        let majors: Vec<f32> = levels.iter().filter(|l| l.major).map(|l| l.value).collect();
        assert_eq!(majors.first(), Some(&950.0));
        assert_eq!(majors.last(), Some(&1040.0));
        assert_eq!(majors.len(), 10);
    }

    #[test]
    fn test_interpolate_edge() {
        let p = interpolate_edge(0.0, 0.0, 1.0, 0.0, 0.0, 10.0, 5.0);
        assert!((p.x - 0.5).abs() < 0.01);
        assert!((p.y - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_march_squares_flat() {
        let data = vec![5.0; 9];
        assert!(march_squares(&data, 3, 3, 5.5).is_empty());
    }

    #[test]
    fn test_march_squares_skips_nan_cells() {
        let data = vec![
            0.0, 0.0, 0.0,
            0.0, f32::NAN, 0.0,
            0.0, 0.0, 10.0,
        ];
        assert!(march_squares(&data, 3, 3, 5.0).is_empty());
    }

    #[test]
    fn test_peak_gives_closed_ring() {
        let data = vec![
            0.0, 0.0, 0.0,
            0.0, 10.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let segments = march_squares(&data, 3, 3, 5.0);
        assert_eq!(segments.len(), 4);
        let contours = connect_segments(segments, 5.0);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].closed);
        assert_eq!(contours[0].points.len(), 5);
    }

    #[test]
    fn test_smooth_closed_keeps_closure() {
        let square = Contour {
            level: 1.0,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
                Point::new(0.0, 0.0),
            ],
            closed: true,
        };
        let smooth = smooth_contour(&square, 1);
        assert_eq!(smooth.points.len(), 9);
        assert_eq!(smooth.points.first(), smooth.points.last());
    }

    #[test]
    fn test_smooth_open_keeps_endpoints() {
        let line = Contour {
            level: 1.0,
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)],
            closed: false,
        };
        let smooth = smooth_contour(&line, 2);
        assert_eq!(smooth.points.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(smooth.points.last(), Some(&Point::new(2.0, 0.0)));
    }

    #[test]
    fn test_axis_value() {
        let axis = [0.0, 100.0, 200.0];
        assert_eq!(axis_value(&axis, 0.5), 50.0);
        assert_eq!(axis_value(&axis, 2.0), 200.0);
    }
}
