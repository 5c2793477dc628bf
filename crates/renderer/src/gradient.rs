//! Color handling and the temperature color ramp.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_paint(self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(self.r, self.g, self.b, self.a);
        paint.anti_alias = true;
        paint
    }
}

/// Station temperature label color.
pub const TEMPERATURE_LABEL: Color = Color::new(0xfd, 0x3c, 0x06, 255);
/// Station dew point label color.
pub const DEW_POINT_LABEL: Color = Color::new(0x01, 0xff, 0x07, 255);
/// Station pressure label color.
pub const PRESSURE_LABEL: Color = Color::new(0xa2, 0xcf, 0xfe, 255);
/// Station gust label color.
pub const GUST_LABEL: Color = Color::new(0xed, 0x0d, 0xd9, 255);

/// Lower end of the temperature ramp (°C).
pub const TEMPERATURE_MIN: f64 = -30.0;
/// Upper end of the temperature ramp (°C).
pub const TEMPERATURE_MAX: f64 = 30.0;

/// Stops of a rainbow-like ramp running from navy through green, yellow and
/// red to magenta and near-white.
const RAMP: &[(f32, Color)] = &[
    (0.00, Color::new(0, 0, 128, 255)),
    (0.12, Color::new(0, 100, 255, 255)),
    (0.22, Color::new(0, 230, 255, 255)),
    (0.32, Color::new(0, 250, 150, 255)),
    (0.42, Color::new(20, 255, 0, 255)),
    (0.55, Color::new(150, 240, 0, 255)),
    (0.62, Color::new(255, 255, 0, 255)),
    (0.72, Color::new(255, 140, 0, 255)),
    (0.78, Color::new(255, 0, 0, 255)),
    (0.88, Color::new(255, 0, 220, 255)),
    (0.95, Color::new(160, 60, 255, 255)),
    (1.00, Color::new(250, 248, 255, 255)),
];

/// Color of the ramp at a normalized position (clamped to 0..1).
pub fn ramp_color(t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in RAMP.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            return interpolate_color(c0, c1, (t - t0) / (t1 - t0));
        }
    }
    RAMP[RAMP.len() - 1].1
}

/// Temperature label color.
///
/// Temperatures are binned to whole degrees and each bin takes the ramp
/// color of its centre, so labels of one degree share one color. Values
/// outside −30…30 °C take the ends of the ramp.
pub fn temperature_color(temp_celsius: f64) -> Color {
    let span = TEMPERATURE_MAX - TEMPERATURE_MIN;
    let t = if temp_celsius < TEMPERATURE_MIN {
        0.0
    } else if temp_celsius >= TEMPERATURE_MAX {
        1.0
    } else {
        (temp_celsius.floor() + 0.5 - TEMPERATURE_MIN) / span
    };
    ramp_color(t as f32)
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#fd3c06"), Some(TEMPERATURE_LABEL));
        assert_eq!(Color::from_hex("#00000080"), Some(Color::new(0, 0, 0, 128)));
        assert_eq!(Color::from_hex("fd3c06"), None);
        assert_eq!(Color::from_hex("#zz0000"), None);
        assert_eq!(Color::from_hex("#fff"), None);
    }

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ramp_color(0.0), RAMP[0].1);
        assert_eq!(ramp_color(1.0), RAMP[RAMP.len() - 1].1);
        assert_eq!(ramp_color(-3.0), RAMP[0].1);
        assert_eq!(ramp_color(f32::NAN), RAMP[0].1);
    }

    #[test]
    fn test_temperature_bins_share_color() {
        assert_eq!(temperature_color(4.1), temperature_color(4.9));
        assert_ne!(temperature_color(4.9), temperature_color(5.1));
    }

    #[test]
    fn test_temperature_out_of_range() {
        assert_eq!(temperature_color(-45.0), ramp_color(0.0));
        assert_eq!(temperature_color(38.0), ramp_color(1.0));
    }
}
