//! Tests for observation validation, bounds and present-weather decoding.

use station_common::bbox::BoundsParseError;
use station_common::observation::present;
use station_common::units::{ms_to_kmh, wind_components};
use station_common::{
    metar_to_wmo_code, GeoBounds, Observation, ObservationRecord, PressureDefinition, ReportKind,
    StationError, MISSING_SENTINEL,
};

// ============================================================================
// Record validation
// ============================================================================

#[test]
fn test_record_with_sentinels_validates() {
    let record = ObservationRecord {
        station: "LOWI".to_string(),
        longitude: Some(11.34),
        latitude: Some(47.26),
        wind_gust: present(MISSING_SENTINEL),
        altimeter: present(1021.0),
        ..Default::default()
    };

    let obs = Observation::from_record(ReportKind::Metar, record).unwrap();
    assert_eq!(obs.kind, ReportKind::Metar);
    assert_eq!(obs.wind_gust, None);
    assert_eq!(obs.altimeter, Some(1021.0));
}

#[test]
fn test_record_error_names_station() {
    let record = ObservationRecord {
        station: "01001".to_string(),
        ..Default::default()
    };
    let err = Observation::from_record(ReportKind::Synop, record).unwrap_err();
    assert!(matches!(err, StationError::MissingPosition { .. }));
    assert!(err.to_string().contains("01001"));
}

#[test]
fn test_longitudes_beyond_180_are_accepted() {
    let record = ObservationRecord {
        station: "NZSP".to_string(),
        longitude: Some(350.0),
        latitude: Some(-89.99),
        ..Default::default()
    };
    assert!(Observation::from_record(ReportKind::Synop, record).is_ok());
}

#[test]
fn test_pressure_definition_parse() {
    assert_eq!(
        PressureDefinition::parse(" Mean Sea Level "),
        PressureDefinition::MeanSeaLevel
    );
    assert_eq!(
        PressureDefinition::parse("surface"),
        PressureDefinition::Other("surface".to_string())
    );
}

#[test]
fn test_metar_always_usable_for_analysis() {
    let mut obs = Observation::at(ReportKind::Metar, "EGLL", -0.46, 51.48);
    assert_eq!(obs.analysis_pressure(750.0), None);
    obs.sea_level_pressure = Some(1004.2);
    assert_eq!(obs.analysis_pressure(750.0), Some(1004.2));
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_bounds_parse_errors() {
    assert!(matches!(
        GeoBounds::parse("1,2,3"),
        Err(BoundsParseError::InvalidFormat(_))
    ));
    assert!(matches!(
        GeoBounds::parse("a,2,3,4"),
        Err(BoundsParseError::InvalidNumber(_))
    ));
    assert!(matches!(
        GeoBounds::parse("-10,10,-95,0"),
        Err(BoundsParseError::OutOfRange(_))
    ));
}

#[test]
fn test_bounds_polar_cap() {
    let bounds = GeoBounds::parse("-180,180,-90,-60").unwrap();
    assert!(bounds.is_global_in_longitude());
    assert!(bounds.contains(0.0, -90.0));
    assert!(!bounds.contains(0.0, -59.0));
}

// ============================================================================
// Weather and units
// ============================================================================

#[test]
fn test_weather_codes_common_groups() {
    assert_eq!(metar_to_wmo_code("BR"), Some(10));
    assert_eq!(metar_to_wmo_code("-SHSN"), Some(85));
    assert_eq!(metar_to_wmo_code("TSRA VCSH"), Some(95));
    assert_eq!(metar_to_wmo_code("-DRSN"), Some(36));
}

#[test]
fn test_gust_in_kmh() {
    assert!((ms_to_kmh(10.0) - 36.0).abs() < 1e-12);
}

#[test]
fn test_southerly_wind_blows_north() {
    let (u, v) = wind_components(5.0, 180.0);
    assert!(u.abs() < 1e-9);
    assert!((v - 5.0).abs() < 1e-9);
}
