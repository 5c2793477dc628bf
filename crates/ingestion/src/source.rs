//! Observation sources.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use reqwest::Client;
use station_common::{GeoBounds, Observation, ObservationRecord, ReportKind};
use tracing::info;

use crate::error::{FetchError, Result};
use crate::retry::RetryPolicy;
use crate::validate::validate_records;

/// What to fetch: a region and an observation hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub bounds: GeoBounds,
    /// Observation time, truncated to the hour
    pub time: DateTime<Utc>,
}

impl ObservationQuery {
    /// Query for the given hour. Minutes and seconds are dropped.
    pub fn at_hour(bounds: GeoBounds, time: DateTime<Utc>) -> Self {
        Self {
            bounds,
            time: truncate_to_hour(time),
        }
    }

    /// Query for the current hour.
    pub fn latest(bounds: GeoBounds) -> Self {
        Self::at_hour(bounds, Utc::now())
    }
}

fn truncate_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// A provider of raw observation rows.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Kind of report this source delivers.
    fn kind(&self) -> ReportKind;

    /// Human readable name for logs.
    fn name(&self) -> &str;

    /// Fetch the raw rows for a query. A single try, no retry.
    async fn fetch(&self, query: &ObservationQuery) -> Result<Vec<ObservationRecord>>;
}

/// Fetch with retry and validate the rows into observations.
pub async fn fetch_observations(
    source: &dyn ObservationSource,
    query: &ObservationQuery,
    policy: &RetryPolicy,
) -> Result<Vec<Observation>> {
    let records = policy.run(|| source.fetch(query)).await?;
    let fetched = records.len();
    let observations = validate_records(source.kind(), records);

    info!(
        source = source.name(),
        time = %query.time,
        fetched = fetched,
        valid = observations.len(),
        "Fetched observations"
    );

    Ok(observations)
}

/// Build the HTTP client shared by the remote sources.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| FetchError::InvalidConfig(format!("failed to create HTTP client: {}", e)))
}

/// GET a URL and return its body as text.
pub(crate) async fn get_text(client: &Client, url: reqwest::Url) -> Result<String> {
    let url_str = url.to_string();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: url_str.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url_str,
            status,
        });
    }

    response.text().await.map_err(|source| FetchError::Http {
        url: url_str,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_truncates_to_hour() {
        let bounds = GeoBounds::new(-58.5, 32.0, 42.0, 74.0);
        let time = Utc.with_ymd_and_hms(2024, 1, 15, 12, 47, 31).unwrap();
        let query = ObservationQuery::at_hour(bounds, time);
        assert_eq!(query.time, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    }
}
