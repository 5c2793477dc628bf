//! Common types shared across the station plotting crates.

pub mod bbox;
pub mod error;
pub mod observation;
pub mod units;
pub mod weather;

pub use bbox::GeoBounds;
pub use error::{StationError, StationResult};
pub use observation::{
    Observation, ObservationRecord, PressureDefinition, ReportKind, MISSING_SENTINEL,
};
pub use weather::{metar_to_wmo_code, normalize_metar_weather};
