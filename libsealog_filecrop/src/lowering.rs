use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::LoweringError;
use super::time_window::TimeWindow;

/// A lowering (dive) record as exported from the sealog server.
///
/// Only the fields needed to build a TimeWindow are kept; everything else in the record is
/// ignored. Timestamps are ISO-8601 / RFC 3339 strings, e.g. `2021-04-21T13:45:00.000Z`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lowering {
    #[serde(default)]
    pub lowering_id: String,
    pub start_ts: String,
    pub stop_ts: String,
}

impl Lowering {
    /// Read a lowering record from a JSON file
    pub fn read_file(path: &Path) -> Result<Self, LoweringError> {
        if !path.exists() {
            return Err(LoweringError::BadFilePath(path.to_path_buf()));
        }

        let json_str = std::fs::read_to_string(path)?;

        Ok(serde_json::from_str::<Self>(&json_str)?)
    }

    /// The window from the start to the stop of the lowering
    pub fn window(&self) -> Result<TimeWindow, LoweringError> {
        Ok(TimeWindow::new(
            parse_iso("start_ts", &self.start_ts)?,
            parse_iso("stop_ts", &self.stop_ts)?,
        ))
    }
}

fn parse_iso(field: &'static str, value: &str) -> Result<NaiveDateTime, LoweringError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.naive_utc())
        .map_err(|e| LoweringError::BadTimestamp(field, value.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_sealog_record() {
        let record = r#"{
            "id": "6081cb1a3c5d9f3b8f9e1a22",
            "lowering_id": "S0413",
            "start_ts": "2021-04-21T10:00:00.000Z",
            "stop_ts": "2021-04-21T12:00:00.000Z",
            "lowering_location": "Kermadec Arc",
            "lowering_tags": ["dive"]
        }"#;
        let lowering: Lowering = serde_json::from_str(record).unwrap();
        assert_eq!(lowering.lowering_id, "S0413");
        let window = lowering.window().unwrap();
        assert_eq!(window.start.to_string(), "2021-04-21 10:00:00");
        assert_eq!(window.end.to_string(), "2021-04-21 12:00:00");
    }

    #[test]
    fn test_offsets_are_converted_to_utc() {
        let lowering = Lowering {
            lowering_id: String::from("S0001"),
            start_ts: String::from("2021-04-21T10:00:00+02:00"),
            stop_ts: String::from("2021-04-21T12:00:00Z"),
        };
        assert_eq!(
            lowering.window().unwrap().start.to_string(),
            "2021-04-21 08:00:00"
        );
    }

    #[test]
    fn test_bad_timestamp() {
        let lowering = Lowering {
            lowering_id: String::new(),
            start_ts: String::from("2021-04-21T10:00:00.000Z"),
            stop_ts: String::from("yesterday"),
        };
        assert!(matches!(
            lowering.window(),
            Err(LoweringError::BadTimestamp("stop_ts", _, _))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Lowering::read_file(Path::new("/does/not/exist/lowering.json")),
            Err(LoweringError::BadFilePath(_))
        ));
    }
}
