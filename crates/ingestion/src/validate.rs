//! Validation of raw rows into observations.

use station_common::{Observation, ObservationRecord, ReportKind};
use tracing::{debug, warn};

/// Validate raw rows, dropping those that cannot be plotted.
///
/// Rows without a usable position are dropped for every source. METAR rows
/// are additionally dropped when wind direction, wind speed or dew point is
/// missing, since such reports are usually partial.
pub fn validate_records(kind: ReportKind, records: Vec<ObservationRecord>) -> Vec<Observation> {
    let total = records.len();
    let mut incomplete = 0usize;
    let mut unplaced = 0usize;

    let observations: Vec<Observation> = records
        .into_iter()
        .filter(|record| {
            let complete = kind != ReportKind::Metar
                || (record.wind_direction.is_some()
                    && record.wind_speed.is_some()
                    && record.dew_point.is_some());
            if !complete {
                debug!(station = %record.station, "Dropping incomplete METAR");
                incomplete += 1;
            }
            complete
        })
        .filter_map(|record| match Observation::from_record(kind, record) {
            Ok(obs) => Some(obs),
            Err(e) => {
                debug!(error = %e, "Dropping observation");
                unplaced += 1;
                None
            }
        })
        .collect();

    if incomplete + unplaced > 0 {
        warn!(
            kind = ?kind,
            total = total,
            incomplete = incomplete,
            without_position = unplaced,
            "Dropped observations during validation"
        );
    }

    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metar(station: &str, dew_point: Option<f64>, lat: Option<f64>) -> ObservationRecord {
        ObservationRecord {
            station: station.to_string(),
            longitude: Some(10.0),
            latitude: lat,
            dew_point,
            wind_speed: Some(3.0),
            wind_direction: Some(200.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_incomplete_metar() {
        let records = vec![
            metar("AAAA", Some(1.0), Some(50.0)),
            metar("BBBB", None, Some(50.0)),
            metar("CCCC", Some(2.0), None),
        ];
        let obs = validate_records(ReportKind::Metar, records);
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].station, "AAAA");
    }

    #[test]
    fn test_synop_keeps_partial_reports() {
        let records = vec![metar("11035", None, Some(48.0))];
        let obs = validate_records(ReportKind::Synop, records);
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].kind, ReportKind::Synop);
    }
}
