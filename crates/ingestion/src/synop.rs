//! SYNOP reports from hourly CSV exports.
//!
//! Exports are published per hour at a URL built from a template with
//! `{year}`, `{month}`, `{day}` and `{hour}` placeholders. A fetch downloads
//! the export into a local directory and parses the saved file, so the last
//! download is kept for inspection. Wind speed (`ff`) is reported in knots.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use csv::ReaderBuilder;
use reqwest::{Client, Url};
use station_common::units::knots_to_ms;
use station_common::{ObservationRecord, PressureDefinition, ReportKind};
use tracing::{debug, info};

use crate::error::{FetchError, Result};
use crate::source::{get_text, ObservationQuery, ObservationSource};
use crate::table::{number, text, Columns};

/// Where the SYNOP table comes from.
#[derive(Debug, Clone)]
pub enum SynopLocation {
    /// Download per hour from a URL template into `download_dir`.
    Remote {
        url_template: String,
        download_dir: PathBuf,
    },
    /// Read an already downloaded file, ignoring the query time.
    Local(PathBuf),
}

/// SYNOP source reading hourly CSV exports.
pub struct SynopCsvSource {
    client: Client,
    location: SynopLocation,
}

impl SynopCsvSource {
    pub fn remote(client: Client, url_template: impl Into<String>, download_dir: PathBuf) -> Self {
        Self {
            client,
            location: SynopLocation::Remote {
                url_template: url_template.into(),
                download_dir,
            },
        }
    }

    pub fn local(path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            location: SynopLocation::Local(path),
        }
    }

    pub fn location(&self) -> &SynopLocation {
        &self.location
    }

    async fn download(
        &self,
        url_template: &str,
        download_dir: &Path,
        time: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let url = synop_url(url_template, time)?;
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("synop_{}.csv", time.format("%Y%m%d%H")));

        debug!(url = %url, "Downloading SYNOP table");
        let body = get_text(&self.client, url).await?;

        tokio::fs::create_dir_all(download_dir).await?;
        let path = download_dir.join(filename);
        tokio::fs::write(&path, body).await?;

        info!(path = %path.display(), "Saved SYNOP table");
        Ok(path)
    }
}

#[async_trait]
impl ObservationSource for SynopCsvSource {
    fn kind(&self) -> ReportKind {
        ReportKind::Synop
    }

    fn name(&self) -> &str {
        match self.location {
            SynopLocation::Remote { .. } => "synop-remote",
            SynopLocation::Local(_) => "synop-file",
        }
    }

    async fn fetch(&self, query: &ObservationQuery) -> Result<Vec<ObservationRecord>> {
        let path = match &self.location {
            SynopLocation::Remote {
                url_template,
                download_dir,
            } => self.download(url_template, download_dir, query.time).await?,
            SynopLocation::Local(path) => path.clone(),
        };
        let body = tokio::fs::read_to_string(&path).await?;
        parse_synop_csv(&body)
    }
}

/// Fill the URL template for an observation hour.
///
/// Month, day and hour are zero padded to two digits.
pub fn synop_url(template: &str, time: DateTime<Utc>) -> Result<Url> {
    let filled = template
        .replace("{year}", &format!("{:04}", time.year()))
        .replace("{month}", &format!("{:02}", time.month()))
        .replace("{day}", &format!("{:02}", time.day()))
        .replace("{hour}", &format!("{:02}", time.hour()));
    Url::parse(&filled)
        .map_err(|e| FetchError::InvalidConfig(format!("bad SYNOP URL '{}': {}", filled, e)))
}

/// Parse a SYNOP CSV table into raw records.
pub fn parse_synop_csv(body: &str) -> Result<Vec<ObservationRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::malformed(format!("unreadable header: {}", e)))?
        .clone();
    let columns = Columns::new(&headers);

    let station = columns.require("station")?;
    let latitude = columns.require("latitude")?;
    let longitude = columns.require("longitude")?;
    let temperature = columns.find("tt");
    let dew_point = columns.find("td");
    let speed_knots = columns.find("ff");
    let direction = columns.find("dd");
    let slp = columns.find("slp");
    let ww = columns.find("ww");
    let cloud_cover = columns.find("cloud_cover");
    let station_type = columns.find("stationtype");
    let pressure_def = columns.find("pressuredefid");
    let height = columns.find("hp");

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| FetchError::malformed(format!("line {}: {}", line, e)))?;

        records.push(ObservationRecord {
            station: text(&row, Some(station)).unwrap_or_default().to_string(),
            longitude: number(&row, Some(longitude), line)?,
            latitude: number(&row, Some(latitude), line)?,
            air_temperature: number(&row, temperature, line)?,
            dew_point: number(&row, dew_point, line)?,
            wind_speed: number(&row, speed_knots, line)?.map(knots_to_ms),
            wind_direction: number(&row, direction, line)?,
            sea_level_pressure: number(&row, slp, line)?,
            present_weather: number(&row, ww, line)?.and_then(|v| code(v, 99)),
            cloud_cover: number(&row, cloud_cover, line)?.and_then(|v| code(v, 9)),
            station_type: number(&row, station_type, line)?.map(|v| v as i32),
            pressure_definition: text(&row, pressure_def).map(PressureDefinition::parse),
            station_height: number(&row, height, line)?,
            ..Default::default()
        });
    }

    Ok(records)
}

/// Integral code in `0..=max`, otherwise absent.
fn code(value: f64, max: u8) -> Option<u8> {
    (value >= 0.0 && value <= max as f64 && value.fract() == 0.0).then_some(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::SYNOP_CSV;

    #[test]
    fn test_parse_synop_csv() {
        let records = parse_synop_csv(SYNOP_CSV).unwrap();
        assert_eq!(records.len(), 3);

        let vienna = &records[0];
        assert_eq!(vienna.station, "11035");
        assert_eq!(vienna.air_temperature, Some(-2.5));
        assert!((vienna.wind_speed.unwrap() - 5.144).abs() < 0.001);
        assert_eq!(vienna.present_weather, Some(71));
        assert_eq!(vienna.cloud_cover, Some(8));
        assert_eq!(vienna.station_type, Some(1));
        assert_eq!(
            vienna.pressure_definition,
            Some(PressureDefinition::MeanSeaLevel)
        );
        assert_eq!(vienna.station_height, Some(198.0));

        let sonnblick = &records[1];
        assert_eq!(sonnblick.sea_level_pressure, None);
        assert_eq!(sonnblick.station_type, Some(4));

        assert_eq!(records[2].latitude, None);
        assert_eq!(records[2].longitude, None);
    }

    #[test]
    fn test_synop_url() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        let url = synop_url(
            "https://example.org/synop/{year}/{month}/synop_{year}{month}{day}{hour}.csv",
            time,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/synop/2024/03/synop_2024030506.csv"
        );
    }

    #[test]
    fn test_synop_url_rejects_garbage() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        assert!(matches!(
            synop_url("not a url {year}", time),
            Err(FetchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_code_range() {
        assert_eq!(code(71.0, 99), Some(71));
        assert_eq!(code(100.0, 99), None);
        assert_eq!(code(-1.0, 9), None);
        assert_eq!(code(2.5, 9), None);
    }
}
