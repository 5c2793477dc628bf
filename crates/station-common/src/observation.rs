//! Surface observation records.
//!
//! Raw rows arrive as [`ObservationRecord`], where every column is optional.
//! They are validated into [`Observation`] at the ingestion boundary; an
//! `Observation` always carries a finite position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StationError, StationResult};

/// Value used by the METAR data service for missing numeric fields.
pub const MISSING_SENTINEL: f64 = -99999.0;

/// Station types above this value are automatic (unmanned) SYNOP stations.
pub const MAX_MANNED_STATION_TYPE: i32 = 3;

/// Kind of report an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Metar,
    Synop,
}

/// How the reported pressure was reduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureDefinition {
    MeanSeaLevel,
    Other(String),
}

impl PressureDefinition {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("mean sea level") {
            Self::MeanSeaLevel
        } else {
            Self::Other(s.trim().to_string())
        }
    }
}

/// A raw observation row as read from a data source.
///
/// Every field is optional; use [`Observation::from_record`] to validate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station: String,
    pub time: Option<DateTime<Utc>>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Air temperature (°C)
    pub air_temperature: Option<f64>,
    /// Dew point temperature (°C)
    pub dew_point: Option<f64>,
    /// Wind speed (m/s)
    pub wind_speed: Option<f64>,
    /// Direction the wind blows from (degrees)
    pub wind_direction: Option<f64>,
    /// Wind gust (m/s)
    pub wind_gust: Option<f64>,
    /// Altimeter setting (hPa)
    pub altimeter: Option<f64>,
    /// Sea level pressure (hPa)
    pub sea_level_pressure: Option<f64>,
    /// Total cloud cover in oktas (0-8, 9 = sky obscured)
    pub cloud_cover: Option<u8>,
    /// Present weather as WMO `ww` code
    pub present_weather: Option<u8>,
    pub station_type: Option<i32>,
    pub pressure_definition: Option<PressureDefinition>,
    /// Station height used for pressure reduction (m)
    pub station_height: Option<f64>,
}

/// A validated surface observation.
///
/// Observations are never mutated after validation; passes over a set of
/// observations produce new collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: ReportKind,
    pub station: String,
    pub time: Option<DateTime<Utc>>,
    pub longitude: f64,
    pub latitude: f64,
    pub air_temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gust: Option<f64>,
    pub altimeter: Option<f64>,
    pub sea_level_pressure: Option<f64>,
    pub cloud_cover: Option<u8>,
    pub present_weather: Option<u8>,
    pub station_type: Option<i32>,
    pub pressure_definition: Option<PressureDefinition>,
    pub station_height: Option<f64>,
}

impl Observation {
    /// Validate a raw record into an observation.
    ///
    /// Fails when the position is absent, non-finite, or outside the valid
    /// geographic range.
    pub fn from_record(kind: ReportKind, record: ObservationRecord) -> StationResult<Self> {
        let (longitude, latitude) = match (record.longitude, record.latitude) {
            (Some(lon), Some(lat)) => (lon, lat),
            _ => {
                return Err(StationError::MissingPosition {
                    station: record.station,
                })
            }
        };

        if !longitude.is_finite()
            || !latitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=360.0).contains(&longitude)
        {
            return Err(StationError::InvalidPosition {
                station: record.station,
                longitude,
                latitude,
            });
        }

        Ok(Self {
            kind,
            station: record.station,
            time: record.time,
            longitude,
            latitude,
            air_temperature: record.air_temperature,
            dew_point: record.dew_point,
            wind_speed: record.wind_speed,
            wind_direction: record.wind_direction,
            wind_gust: record.wind_gust,
            altimeter: record.altimeter,
            sea_level_pressure: record.sea_level_pressure,
            cloud_cover: record.cloud_cover,
            present_weather: record.present_weather,
            station_type: record.station_type,
            pressure_definition: record.pressure_definition,
            station_height: record.station_height,
        })
    }

    /// Create an observation with only a position set.
    pub fn at(kind: ReportKind, station: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            kind,
            station: station.into(),
            time: None,
            longitude,
            latitude,
            air_temperature: None,
            dew_point: None,
            wind_speed: None,
            wind_direction: None,
            wind_gust: None,
            altimeter: None,
            sea_level_pressure: None,
            cloud_cover: None,
            present_weather: None,
            station_type: None,
            pressure_definition: None,
            station_height: None,
        }
    }

    /// Whether the station reports as a manned station.
    ///
    /// Stations without a type (METAR) count as manned.
    pub fn is_manned(&self) -> bool {
        self.station_type
            .map_or(true, |t| t <= MAX_MANNED_STATION_TYPE)
    }

    /// Pressure suitable for a sea-level isobar analysis, if any.
    ///
    /// SYNOP pressure is only used when it was reduced to mean sea level from a
    /// station no higher than `max_station_height` metres. METAR reports use
    /// their sea level pressure directly.
    pub fn analysis_pressure(&self, max_station_height: f64) -> Option<f64> {
        let pressure = self.sea_level_pressure?;
        match self.kind {
            ReportKind::Metar => Some(pressure),
            ReportKind::Synop => {
                let reduced = matches!(
                    self.pressure_definition,
                    Some(PressureDefinition::MeanSeaLevel)
                );
                let low_enough = self
                    .station_height
                    .map_or(false, |h| h <= max_station_height);
                (reduced && low_enough).then_some(pressure)
            }
        }
    }

    /// Pressure for the station plot.
    ///
    /// METAR maps show the altimeter setting, SYNOP maps the sea level
    /// pressure. Each falls back to the other when absent.
    pub fn plotted_pressure(&self) -> Option<f64> {
        match self.kind {
            ReportKind::Metar => self.altimeter.or(self.sea_level_pressure),
            ReportKind::Synop => self.sea_level_pressure.or(self.altimeter),
        }
    }
}

/// Convert a raw numeric value into an optional one.
///
/// The missing-value sentinel and non-finite values become `None`.
pub fn present(value: f64) -> Option<f64> {
    if !value.is_finite() || value == MISSING_SENTINEL {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lon: Option<f64>, lat: Option<f64>) -> ObservationRecord {
        ObservationRecord {
            station: "LOWW".to_string(),
            longitude: lon,
            latitude: lat,
            air_temperature: Some(4.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_record_keeps_fields() {
        let obs = Observation::from_record(ReportKind::Metar, record(Some(16.57), Some(48.11)))
            .unwrap();
        assert_eq!(obs.station, "LOWW");
        assert_eq!(obs.longitude, 16.57);
        assert_eq!(obs.air_temperature, Some(4.0));
        assert_eq!(obs.dew_point, None);
    }

    #[test]
    fn test_from_record_missing_position() {
        let result = Observation::from_record(ReportKind::Metar, record(None, Some(48.11)));
        assert!(matches!(result, Err(StationError::MissingPosition { .. })));
    }

    #[test]
    fn test_from_record_invalid_position() {
        let result = Observation::from_record(ReportKind::Synop, record(Some(f64::NAN), Some(48.0)));
        assert!(matches!(result, Err(StationError::InvalidPosition { .. })));

        let result = Observation::from_record(ReportKind::Synop, record(Some(10.0), Some(95.0)));
        assert!(matches!(result, Err(StationError::InvalidPosition { .. })));
    }

    #[test]
    fn test_present_maps_sentinel() {
        assert_eq!(present(MISSING_SENTINEL), None);
        assert_eq!(present(f64::NAN), None);
        assert_eq!(present(1013.2), Some(1013.2));
    }

    #[test]
    fn test_analysis_pressure_synop_rules() {
        let mut obs = Observation::at(ReportKind::Synop, "11035", 16.36, 48.25);
        obs.sea_level_pressure = Some(1021.3);
        obs.pressure_definition = Some(PressureDefinition::MeanSeaLevel);
        obs.station_height = Some(198.0);
        assert_eq!(obs.analysis_pressure(750.0), Some(1021.3));

        obs.station_height = Some(1800.0);
        assert_eq!(obs.analysis_pressure(750.0), None);

        obs.station_height = Some(198.0);
        obs.pressure_definition = Some(PressureDefinition::parse("850 hPa geopotential"));
        assert_eq!(obs.analysis_pressure(750.0), None);
    }

    #[test]
    fn test_plotted_pressure_by_kind() {
        let mut metar = Observation::at(ReportKind::Metar, "LOWW", 16.57, 48.11);
        metar.altimeter = Some(1018.0);
        metar.sea_level_pressure = Some(1018.3);
        assert_eq!(metar.plotted_pressure(), Some(1018.0));

        let mut synop = metar.clone();
        synop.kind = ReportKind::Synop;
        assert_eq!(synop.plotted_pressure(), Some(1018.3));

        synop.sea_level_pressure = None;
        assert_eq!(synop.plotted_pressure(), Some(1018.0));
    }

    #[test]
    fn test_is_manned() {
        let mut obs = Observation::at(ReportKind::Synop, "01001", 0.0, 70.0);
        assert!(obs.is_manned());
        obs.station_type = Some(1);
        assert!(obs.is_manned());
        obs.station_type = Some(4);
        assert!(!obs.is_manned());
    }
}
