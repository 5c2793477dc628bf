//! Column lookup for CSV observation tables.

use csv::StringRecord;
use station_common::observation::present;

use crate::error::{FetchError, Result};

/// Header positions of a CSV table, keyed by normalized column name.
///
/// Names are lower-cased and stripped of unit suffixes, so
/// `air_temperature[unit="Celsius"]` is found as `air_temperature`.
pub(crate) struct Columns {
    names: Vec<String>,
}

impl Columns {
    pub fn new(headers: &StringRecord) -> Self {
        Self {
            names: headers.iter().map(normalize_header).collect(),
        }
    }

    /// Position of a column, if present.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Position of a column that must be present.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.find(name).ok_or_else(|| {
            FetchError::malformed(format!(
                "missing required column '{}' (have {:?})",
                name, self.names
            ))
        })
    }
}

pub(crate) fn normalize_header(raw: &str) -> String {
    raw.split('[').next().unwrap_or(raw).trim().to_ascii_lowercase()
}

/// Raw text of an optional column, trimmed; empty cells are `None`.
pub(crate) fn text<'r>(record: &'r StringRecord, col: Option<usize>) -> Option<&'r str> {
    col.and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Numeric value of an optional column.
///
/// Empty cells, the missing sentinel and NaN are absent; anything else that
/// does not parse is a malformed response.
pub(crate) fn number(record: &StringRecord, col: Option<usize>, line: usize) -> Result<Option<f64>> {
    match text(record, col) {
        None => Ok(None),
        Some(s) => s.parse::<f64>().map(present).map_err(|_| {
            FetchError::malformed(format!("line {}: '{}' is not a number", line, s))
        }),
    }
}
