//! METAR reports from a THREDDS NetCDF Subset Service point endpoint.
//!
//! The service is queried for one hour over a longitude/latitude box and
//! answers with a CSV table. Column headers carry unit annotations
//! (`wind_speed[unit="m/s"]`) which are ignored; values are in the units the
//! observation model uses except cloud cover, which arrives as a fraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use reqwest::{Client, Url};
use station_common::{metar_to_wmo_code, ObservationRecord, ReportKind};
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::source::{get_text, ObservationQuery, ObservationSource};
use crate::table::{number, text, Columns};

/// Default NCSS endpoint for decoded METAR station data.
pub const DEFAULT_NCSS_URL: &str =
    "https://thredds.ucar.edu/thredds/ncss/point/nws/metar/ncdecoded/Metar_Station_Data_fc.cdmr";

/// Variables requested from the service.
pub const METAR_VARIABLES: &[&str] = &[
    "air_temperature",
    "dew_point_temperature",
    "wind_speed",
    "precipitation_amount_hourly",
    "hectoPascal_ALTIM",
    "air_pressure_at_sea_level",
    "wind_from_direction",
    "cloud_area_fraction",
    "weather",
    "report",
    "wind_gust",
];

/// METAR source backed by an NCSS point endpoint.
pub struct NcssMetarSource {
    client: Client,
    base_url: Url,
}

impl NcssMetarSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidConfig(format!("bad NCSS URL '{}': {}", base_url, e)))?;
        Ok(Self { client, base_url })
    }

    /// Full request URL for a query.
    pub fn request_url(&self, query: &ObservationQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for var in METAR_VARIABLES {
                pairs.append_pair("var", var);
            }
            pairs
                .append_pair("west", &query.bounds.west.to_string())
                .append_pair("east", &query.bounds.east.to_string())
                .append_pair("south", &query.bounds.south.to_string())
                .append_pair("north", &query.bounds.north.to_string())
                .append_pair("time", &query.time.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .append_pair("accept", "csv");
        }
        url
    }
}

#[async_trait]
impl ObservationSource for NcssMetarSource {
    fn kind(&self) -> ReportKind {
        ReportKind::Metar
    }

    fn name(&self) -> &str {
        "ncss-metar"
    }

    async fn fetch(&self, query: &ObservationQuery) -> Result<Vec<ObservationRecord>> {
        let url = self.request_url(query);
        debug!(url = %url, "Requesting METAR table");
        let body = get_text(&self.client, url).await?;
        parse_ncss_csv(&body)
    }
}

/// Parse an NCSS CSV response into raw records.
///
/// Fails with [`FetchError::MalformedResponse`] when a row has the wrong
/// number of columns or the station/position columns are missing.
pub fn parse_ncss_csv(body: &str) -> Result<Vec<ObservationRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::malformed(format!("unreadable header: {}", e)))?
        .clone();
    let columns = Columns::new(&headers);

    let station = columns.require("station")?;
    let latitude = columns.require("latitude")?;
    let longitude = columns.require("longitude")?;
    let time = columns.find("time");
    let air_temperature = columns.find("air_temperature");
    let dew_point = columns.find("dew_point_temperature");
    let wind_speed = columns.find("wind_speed");
    let wind_direction = columns.find("wind_from_direction");
    let wind_gust = columns.find("wind_gust");
    let altimeter = columns.find("hectopascal_altim");
    let sea_level_pressure = columns.find("air_pressure_at_sea_level");
    let cloud_fraction = columns.find("cloud_area_fraction");
    let weather = columns.find("weather");

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = row.map_err(|e| FetchError::malformed(format!("line {}: {}", line, e)))?;

        let cloud_cover = number(&row, cloud_fraction, line)?.map(fraction_to_oktas);
        let present_weather = match weather {
            Some(col) => metar_to_wmo_code(row.get(col).unwrap_or_default()),
            None => None,
        };

        records.push(ObservationRecord {
            station: text(&row, Some(station)).unwrap_or_default().to_string(),
            time: text(&row, time).and_then(parse_time),
            longitude: number(&row, Some(longitude), line)?,
            latitude: number(&row, Some(latitude), line)?,
            air_temperature: number(&row, air_temperature, line)?,
            dew_point: number(&row, dew_point, line)?,
            wind_speed: number(&row, wind_speed, line)?,
            wind_direction: number(&row, wind_direction, line)?,
            wind_gust: number(&row, wind_gust, line)?,
            altimeter: number(&row, altimeter, line)?,
            sea_level_pressure: number(&row, sea_level_pressure, line)?,
            cloud_cover,
            present_weather,
            ..Default::default()
        });
    }

    Ok(records)
}

/// Cloud fraction (0-1) to oktas, truncating.
fn fraction_to_oktas(fraction: f64) -> u8 {
    (fraction * 8.0).clamp(0.0, 8.0) as u8
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
