//! Station model glyphs.
//!
//! Each plotted station is drawn around its location:
//!
//! ```text
//!   TT        PPP
//!   ww   (C)
//!   Td        GG
//! ```
//!
//! with the wind barb starting at the cloud cover circle (C). Temperatures
//! are whole °C, pressure is the trailing three digits of tenths of hPa and
//! gusts are km/h.

use station_common::units::{ms_to_kmh, ms_to_knots};
use station_common::Observation;
use tiny_skia::{FillRule, LineCap, LineJoin, PathBuilder, Pixmap, Stroke, Transform};

use crate::barbs::{self, BarbStyle};
use crate::frame::MapFrame;
use crate::glyphs::{self, TextStyle};
use crate::gradient::{self, Color};

/// Number of vertices used to approximate a full circle.
const CIRCLE_STEPS: usize = 48;

/// Which stations get a present weather symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherPolicy {
    /// Every reported code
    All,
    /// Manned stations always, automatic stations only for codes above 9
    MannedOrSignificant,
}

/// How the temperature label is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureColoring {
    Fixed,
    /// Color ramp over −30…30 °C
    Ramp,
}

/// Which parts of the station model are drawn and at what size.
#[derive(Debug, Clone, Copy)]
pub struct StationStyle {
    /// Font size in points
    pub font_size: f32,
    pub temperature: TemperatureColoring,
    pub dew_point: bool,
    pub pressure: bool,
    pub gust: bool,
    pub barbs: bool,
    pub clouds: bool,
    pub weather: WeatherPolicy,
}

impl StationStyle {
    /// Full station model with fixed colors.
    pub fn standard(font_size: f32) -> Self {
        Self {
            font_size,
            temperature: TemperatureColoring::Fixed,
            dew_point: true,
            pressure: true,
            gust: true,
            barbs: true,
            clouds: true,
            weather: WeatherPolicy::All,
        }
    }

    /// Temperature-colored model: no dew point, pressure or gust labels.
    pub fn temperature_color(font_size: f32) -> Self {
        Self {
            font_size,
            temperature: TemperatureColoring::Ramp,
            dew_point: false,
            pressure: false,
            gust: false,
            barbs: true,
            clouds: true,
            weather: WeatherPolicy::MannedOrSignificant,
        }
    }
}

/// Format a value the way station plots show it: rounded, no decimals.
pub fn format_value(value: f64) -> String {
    let text = format!("{:.0}", value);
    // Avoid "-0"
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Trailing three digits of the pressure in tenths of hPa: 1013.2 → "132".
pub fn pressure_label(hpa: f64) -> String {
    let tenths = format!("{:.0}", hpa * 10.0);
    let start = tenths.len().saturating_sub(3);
    tenths[start..].to_string()
}

/// Present weather code to draw for a station, if any.
pub fn weather_code(obs: &Observation, policy: WeatherPolicy) -> Option<u8> {
    let code = obs.present_weather?;
    match policy {
        WeatherPolicy::All => Some(code),
        WeatherPolicy::MannedOrSignificant if obs.is_manned() => Some(code),
        WeatherPolicy::MannedOrSignificant => (code > 9).then_some(code),
    }
}

/// Draw the station model for one observation.
///
/// Stations outside the visible map are skipped.
pub fn draw_station(pixmap: &mut Pixmap, frame: &MapFrame, obs: &Observation, style: &StationStyle) {
    let (x, y) = match frame.geo_to_pixel(obs.longitude, obs.latitude) {
        Some(p) if frame.contains_pixel(p.0, p.1) => p,
        _ => return,
    };
    let ppp = frame.pixels_per_point();
    let em = style.font_size * ppp;
    let text_size = em * 0.75;
    let outline = 0.75 * ppp;
    let circle_radius = em * 0.3;

    if style.clouds {
        if let Some(okta) = obs.cloud_cover {
            draw_cloud_cover(pixmap, x, y, circle_radius, okta, 1.0 * ppp);
        }
    }

    if style.barbs {
        if let (Some(speed), Some(direction)) = (obs.wind_speed, obs.wind_direction) {
            if let Some(toward) = wind_source_direction(frame, obs, direction) {
                let barb = BarbStyle {
                    length: em * 2.0,
                    line_width: 1.5 * ppp,
                    color: Color::BLACK,
                };
                barbs::draw_barb(pixmap, x, y, toward, ms_to_knots(speed), &barb);
            }
        }
    }

    let west = |text: &str| x - em * 0.5 - glyphs::text_width(text, text_size) / 2.0;
    let east = |text: &str| x + em * 0.5 + glyphs::text_width(text, text_size) / 2.0;
    let north = y - em * 0.8;
    let south = y + em * 0.8;
    let label = |color: Color| TextStyle::new(text_size, color).with_outline(Color::BLACK, outline);

    if let Some(t) = obs.air_temperature {
        let color = match style.temperature {
            TemperatureColoring::Fixed => gradient::TEMPERATURE_LABEL,
            TemperatureColoring::Ramp => gradient::temperature_color(t),
        };
        let text = format_value(t);
        glyphs::draw_text(pixmap, west(&text), north, 0.0, &text, &label(color));
    }
    if style.dew_point {
        if let Some(td) = obs.dew_point {
            let text = format_value(td);
            glyphs::draw_text(pixmap, west(&text), south, 0.0, &text, &label(gradient::DEW_POINT_LABEL));
        }
    }
    if style.pressure {
        if let Some(p) = obs.plotted_pressure() {
            let text = pressure_label(p);
            glyphs::draw_text(pixmap, east(&text), north, 0.0, &text, &label(gradient::PRESSURE_LABEL));
        }
    }
    if style.gust {
        if let Some(gust) = obs.wind_gust {
            let text = format_value(ms_to_kmh(gust));
            glyphs::draw_text(pixmap, east(&text), south, 0.0, &text, &label(gradient::GUST_LABEL));
        }
    }
    if let Some(code) = weather_code(obs, style.weather) {
        draw_weather_symbol(pixmap, x - em * 1.2, y, em * 0.7, code);
    }
}

/// Screen unit vector pointing to where the wind blows from, following the
/// local north of the projection.
fn wind_source_direction(frame: &MapFrame, obs: &Observation, direction_deg: f64) -> Option<(f32, f32)> {
    let (x, y) = frame.geo_to_pixel(obs.longitude, obs.latitude)?;
    let step = 0.05;
    let (nx, ny) = if obs.latitude + step <= 90.0 {
        let (x1, y1) = frame.geo_to_pixel(obs.longitude, obs.latitude + step)?;
        (x1 - x, y1 - y)
    } else {
        let (x1, y1) = frame.geo_to_pixel(obs.longitude, obs.latitude - step)?;
        (x - x1, y - y1)
    };
    let norm = (nx * nx + ny * ny).sqrt();
    if !(norm > 0.0) {
        return None;
    }
    let (nx, ny) = (nx / norm, ny / norm);
    let (sin_t, cos_t) = (direction_deg.to_radians() as f32).sin_cos();
    // Clockwise from north on screen
    Some((nx * cos_t - ny * sin_t, nx * sin_t + ny * cos_t))
}

/// Sky cover symbol: the circle is filled in quarters by oktas, with a
/// vertical bar for 1/3/5 oktas, a gap for 7 and a cross for obscured sky.
pub fn draw_cloud_cover(pixmap: &mut Pixmap, x: f32, y: f32, radius: f32, okta: u8, line_width: f32) {
    let black = Color::BLACK.to_paint();
    let white = Color::WHITE.to_paint();
    let stroke = Stroke {
        width: line_width,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    if let Some(circle) = PathBuilder::from_circle(x, y, radius) {
        pixmap.fill_path(&circle, &white, FillRule::Winding, Transform::identity(), None);
    }

    let filled_fraction = match okta {
        2 | 3 => 0.25,
        4 | 5 => 0.5,
        6 => 0.75,
        7 | 8 => 1.0,
        _ => 0.0,
    };
    if filled_fraction > 0.0 {
        if let Some(wedge) = wedge_path(x, y, radius, filled_fraction) {
            pixmap.fill_path(&wedge, &black, FillRule::Winding, Transform::identity(), None);
        }
    }

    let mut marks = PathBuilder::new();
    match okta {
        1 | 3 | 5 => {
            marks.move_to(x, y - radius);
            marks.line_to(x, y + radius);
        }
        9 => {
            let d = radius * std::f32::consts::FRAC_1_SQRT_2;
            marks.move_to(x - d, y - d);
            marks.line_to(x + d, y + d);
            marks.move_to(x - d, y + d);
            marks.line_to(x + d, y - d);
        }
        _ => {}
    }
    if let Some(path) = marks.finish() {
        pixmap.stroke_path(&path, &black, &stroke, Transform::identity(), None);
    }

    if okta == 7 {
        let gap = Stroke {
            width: radius * 0.35,
            ..stroke.clone()
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x, y - radius);
        pb.line_to(x, y + radius);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &white, &gap, Transform::identity(), None);
        }
    }

    if let Some(circle) = PathBuilder::from_circle(x, y, radius) {
        pixmap.stroke_path(&circle, &black, &stroke, Transform::identity(), None);
    }
}

/// Pie wedge starting at 12 o'clock and running clockwise.
fn wedge_path(x: f32, y: f32, radius: f32, fraction: f32) -> Option<tiny_skia::Path> {
    if fraction >= 1.0 {
        return PathBuilder::from_circle(x, y, radius);
    }
    let steps = ((CIRCLE_STEPS as f32 * fraction).ceil() as usize).max(2);
    let sweep = fraction * std::f32::consts::TAU;
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    for k in 0..=steps {
        let a = sweep * k as f32 / steps as f32;
        pb.line_to(x + radius * a.sin(), y - radius * a.cos());
    }
    pb.close();
    pb.finish()
}

/// Simplified WMO present weather symbols, grouped by code range.
pub fn draw_weather_symbol(pixmap: &mut Pixmap, x: f32, y: f32, size: f32, code: u8) {
    let color = Color::new(0x8b, 0x00, 0x00, 255);
    let paint = color.to_paint();
    let stroke = Stroke {
        width: size * 0.1,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let h = size / 2.0;
    let dot = size * 0.12;
    // 1 to 3 repetitions by intensity within a decade
    let repeat = |base: u8| 1 + ((code - base) / 2).min(2) as usize;

    let mut lines = PathBuilder::new();
    let mut fills = PathBuilder::new();

    match code {
        // Haze, smoke, dust
        4..=9 => {
            fills.push_circle(x - h * 0.35, y, h * 0.3);
            fills.push_circle(x + h * 0.35, y, h * 0.3);
        }
        // Mist
        10..=12 => {
            for dy in [-0.25, 0.25] {
                lines.move_to(x - h, y + dy * h);
                lines.line_to(x + h, y + dy * h);
            }
        }
        // Thunder without precipitation and thunderstorms
        13 | 17 | 29 | 91..=99 => {
            lines.move_to(x - h * 0.6, y - h);
            lines.line_to(x - h * 0.6, y + h);
            lines.move_to(x - h * 0.6, y - h);
            lines.line_to(x + h * 0.5, y - h);
            lines.line_to(x - h * 0.1, y);
            lines.line_to(x + h * 0.5, y + h);
        }
        // Duststorm, sandstorm, blowing snow
        30..=39 => {
            lines.move_to(x - h, y);
            lines.line_to(x + h, y);
            lines.move_to(x + h * 0.5, y - h * 0.4);
            lines.line_to(x + h, y);
            lines.line_to(x + h * 0.5, y + h * 0.4);
        }
        // Fog
        40..=49 => {
            for dy in [-0.5, 0.0, 0.5] {
                lines.move_to(x - h, y + dy * h);
                lines.line_to(x + h, y + dy * h);
            }
        }
        // Drizzle
        50..=59 => {
            for (dx, _) in spread(repeat(50), h) {
                fills.push_circle(x + dx, y, dot);
                lines.move_to(x + dx + dot, y);
                lines.line_to(x + dx - dot * 0.5, y + dot * 2.5);
            }
        }
        // Rain
        60..=69 => {
            for (dx, dy) in spread(repeat(60), h) {
                fills.push_circle(x + dx, y + dy, dot * 1.3);
            }
        }
        // Snow
        70..=79 => {
            for (dx, dy) in spread(repeat(70), h) {
                let r = dot * 2.0;
                for k in 0..3 {
                    let a = k as f32 * std::f32::consts::PI / 3.0;
                    let (s, c) = a.sin_cos();
                    lines.move_to(x + dx - r * c, y + dy - r * s);
                    lines.line_to(x + dx + r * c, y + dy + r * s);
                }
            }
        }
        // Showers
        80..=90 => {
            lines.move_to(x - h * 0.6, y - h * 0.1);
            lines.line_to(x + h * 0.6, y - h * 0.1);
            lines.line_to(x, y + h);
            lines.close();
            fills.push_circle(x, y - h * 0.55, dot * 1.3);
        }
        _ => {}
    }

    if let Some(path) = fills.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    if let Some(path) = lines.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Offsets for 1 to 3 repeated marks.
fn spread(count: usize, h: f32) -> Vec<(f32, f32)> {
    match count {
        1 => vec![(0.0, 0.0)],
        2 => vec![(-h * 0.45, 0.0), (h * 0.45, 0.0)],
        _ => vec![(-h * 0.45, h * 0.3), (h * 0.45, h * 0.3), (0.0, -h * 0.45)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use station_common::ReportKind;

    #[test]
    fn test_pressure_label() {
        assert_eq!(pressure_label(1013.2), "132");
        assert_eq!(pressure_label(999.5), "995");
        assert_eq!(pressure_label(1000.0), "000");
        assert_eq!(pressure_label(1.0), "10");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(4.4), "4");
        assert_eq!(format_value(-0.3), "0");
        assert_eq!(format_value(-12.6), "-13");
    }

    #[test]
    fn test_weather_policy() {
        let mut obs = Observation::at(ReportKind::Synop, "11035", 16.36, 48.25);
        obs.present_weather = Some(5);
        obs.station_type = Some(1);
        assert_eq!(weather_code(&obs, WeatherPolicy::MannedOrSignificant), Some(5));

        obs.station_type = Some(4);
        assert_eq!(weather_code(&obs, WeatherPolicy::MannedOrSignificant), None);
        assert_eq!(weather_code(&obs, WeatherPolicy::All), Some(5));

        obs.present_weather = Some(61);
        assert_eq!(weather_code(&obs, WeatherPolicy::MannedOrSignificant), Some(61));
    }

    #[test]
    fn test_cloud_cover_fills() {
        let mut clear = Pixmap::new(40, 40).unwrap();
        draw_cloud_cover(&mut clear, 20.0, 20.0, 15.0, 0, 1.0);
        let mut overcast = Pixmap::new(40, 40).unwrap();
        draw_cloud_cover(&mut overcast, 20.0, 20.0, 15.0, 8, 1.0);

        let dark = |p: &Pixmap| {
            p.pixels()
                .iter()
                .filter(|c| c.alpha() == 255 && c.red() < 50)
                .count()
        };
        assert!(dark(&overcast) > dark(&clear) * 3);
        // Centre of a clear sky circle is white
        assert_eq!(clear.pixel(20, 20).map(|c| c.red()), Some(255));
    }

    #[test]
    fn test_every_weather_code_draws_without_panic() {
        let mut pixmap = Pixmap::new(30, 30).unwrap();
        for code in 0..=99u8 {
            draw_weather_symbol(&mut pixmap, 15.0, 15.0, 20.0, code);
        }
    }
}
