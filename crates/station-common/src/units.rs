//! Unit conversions used by the station plots.

/// Knots per metre per second.
pub const KNOTS_PER_MS: f64 = 1.943_844_492_440_604;

pub fn ms_to_knots(speed: f64) -> f64 {
    speed * KNOTS_PER_MS
}

pub fn knots_to_ms(speed: f64) -> f64 {
    speed / KNOTS_PER_MS
}

pub fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

/// Split a wind speed and the direction it blows from (degrees) into
/// eastward (u) and northward (v) components.
pub fn wind_components(speed: f64, direction_deg: f64) -> (f64, f64) {
    let direction = direction_deg.to_radians();
    (-speed * direction.sin(), -speed * direction.cos())
}
