//! Common test fixtures for station plotting tests.
//!
//! This module provides pre-defined observations and raw service responses
//! that represent common scenarios in surface observation processing.

use station_common::{Observation, PressureDefinition, ReportKind};

/// Common bounding box definitions for testing, as (west, east, south, north).
pub mod bbox {
    /// Central Europe, the default METAR map
    pub const EUROPE: (f64, f64, f64, f64) = (-5.5, 32.0, 42.0, 62.0);

    /// Austria
    pub const AUSTRIA: (f64, f64, f64, f64) = (8.9, 17.42, 45.9, 49.4);

    /// Greenland and Iceland
    pub const GREENLAND: (f64, f64, f64, f64) = (-58.0, -12.0, 57.0, 70.5);

    /// Antarctic cap
    pub const ANTARCTIC: (f64, f64, f64, f64) = (-180.0, 180.0, -90.0, -60.0);

    /// Invalid bbox (west > east)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 5.0, 40.0, 50.0);
}

/// Well-known stations as (id, longitude, latitude).
pub mod stations {
    pub const VIENNA: (&str, f64, f64) = ("LOWW", 16.57, 48.11);
    pub const INNSBRUCK: (&str, f64, f64) = ("LOWI", 11.34, 47.26);
    pub const MUNICH: (&str, f64, f64) = ("EDDM", 11.79, 48.35);
    pub const ZURICH: (&str, f64, f64) = ("LSZH", 8.55, 47.46);
    pub const LONDON: (&str, f64, f64) = ("EGLL", -0.46, 51.48);
    pub const REYKJAVIK: (&str, f64, f64) = ("BIRK", -21.94, 64.13);
    pub const SOUTH_POLE: (&str, f64, f64) = ("89009", 0.0, -90.0);

    /// The alpine stations in a stable order.
    pub const ALPINE: [(&str, f64, f64); 4] = [VIENNA, INNSBRUCK, MUNICH, ZURICH];
}

/// A complete METAR observation for the given station.
pub fn metar_observation(station: (&str, f64, f64)) -> Observation {
    let (id, lon, lat) = station;
    let mut obs = Observation::at(ReportKind::Metar, id, lon, lat);
    obs.air_temperature = Some(4.0);
    obs.dew_point = Some(-1.0);
    obs.wind_speed = Some(7.7);
    obs.wind_direction = Some(290.0);
    obs.wind_gust = Some(12.9);
    obs.altimeter = Some(1018.0);
    obs.cloud_cover = Some(6);
    obs.present_weather = Some(61);
    obs
}

/// A SYNOP observation suitable for a sea level pressure analysis.
pub fn synop_observation(station: (&str, f64, f64), pressure: f64) -> Observation {
    let (id, lon, lat) = station;
    let mut obs = Observation::at(ReportKind::Synop, id, lon, lat);
    obs.air_temperature = Some(-2.5);
    obs.dew_point = Some(-4.1);
    obs.wind_speed = Some(5.1);
    obs.wind_direction = Some(180.0);
    obs.sea_level_pressure = Some(pressure);
    obs.pressure_definition = Some(PressureDefinition::MeanSeaLevel);
    obs.station_height = Some(200.0);
    obs.station_type = Some(1);
    obs.cloud_cover = Some(8);
    obs.present_weather = Some(71);
    obs
}

/// METAR observations for [`stations::ALPINE`].
pub fn alpine_metars() -> Vec<Observation> {
    stations::ALPINE.iter().copied().map(metar_observation).collect()
}

/// A NetCDF-Subset CSV response with four stations.
///
/// - `LOWW` is complete
/// - `LOWI` uses the missing sentinel for its gust
/// - `EDDM` has no dew point and is dropped during validation
/// - `LSZH` reports two weather groups
pub const NCSS_METAR_CSV: &str = "\
time,station,latitude[unit=\"degrees_north\"],longitude[unit=\"degrees_east\"],air_temperature[unit=\"Celsius\"],dew_point_temperature[unit=\"Celsius\"],wind_speed[unit=\"m/s\"],precipitation_amount_hourly[unit=\"mm\"],hectoPascal_ALTIM[unit=\"hPa\"],air_pressure_at_sea_level[unit=\"hPa\"],wind_from_direction[unit=\"degrees\"],cloud_area_fraction,weather,report,wind_gust[unit=\"m/s\"]
2024-01-15T12:00:00Z,LOWW,48.11,16.57,4.0,-1.0,7.7,-99999,1018.0,1018.3,290.0,0.75,-RA,LOWW 151200Z 29015G25KT 9999 -RA BKN030 04/M01 Q1018,12.9
2024-01-15T12:00:00Z,LOWI,47.26,11.34,1.0,-3.0,2.1,-99999,1021.0,-99999,70.0,0.375,,LOWI 151200Z 07004KT CAVOK 01/M03 Q1021,-99999
2024-01-15T12:00:00Z,EDDM,48.35,11.79,2.0,-99999,3.6,-99999,1020.0,-99999,250.0,1.0,SN,EDDM 151200Z 25007KT 3000 SN OVC008 02/ Q1020,-99999
2024-01-15T12:00:00Z,LSZH,47.46,8.55,3.0,1.0,4.1,0.2,1019.0,-99999,240.0,1.0,FZBR -SN,LSZH 151200Z 24008KT 0800 FZBR -SN OVC002 03/01 Q1019,-99999
";

/// A SYNOP CSV export with three stations.
///
/// - `11035` is manned and at low altitude
/// - `11343` is automatic and too high for a pressure analysis
/// - `01001` has no position and is dropped during validation
pub const SYNOP_CSV: &str = "\
Station,Latitude,Longitude,TT,TD,ff,dd,SLP,ww,cloud_cover,StationType,PressureDefId,Hp
11035,48.25,16.36,-2.5,-4.1,10,180,1021.3,71,8,1,mean sea level,198
11343,47.05,12.95,-14.2,-17.0,25,270,,2,3,4,850 hPa geopotential,3105
01001,,,1.2,0.1,12,90,1003.4,0,7,1,mean sea level,9
";
