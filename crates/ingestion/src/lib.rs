//! Surface observation retrieval.
//!
//! Provides the data sources feeding the station maps:
//!
//! - [`NcssMetarSource`]: METAR reports from a THREDDS NetCDF Subset endpoint
//! - [`SynopCsvSource`]: SYNOP reports from hourly CSV exports or a local file
//!
//! Sources implement [`ObservationSource`] and make a single try per call.
//! [`fetch_observations`] wraps a source with the bounded [`retry`] policy
//! and validates the raw rows into [`station_common::Observation`]s.

pub mod error;
pub mod metar;
pub mod retry;
pub mod source;
pub mod synop;
mod table;
pub mod validate;

// Re-exports
pub use error::{FetchError, Result};
pub use metar::{parse_ncss_csv, NcssMetarSource, DEFAULT_NCSS_URL};
pub use retry::{attempt, RetryPolicy};
pub use source::{fetch_observations, http_client, ObservationQuery, ObservationSource};
pub use synop::{parse_synop_csv, synop_url, SynopCsvSource, SynopLocation};
pub use validate::validate_records;
