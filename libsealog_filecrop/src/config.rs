use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::lowering::Lowering;
use super::time_window::TimeWindow;
use super::timestamp::DEFAULT_TIMESTAMP_FORMAT;

/// Structure representing the application configuration. Contains the inputs, output and
/// the window to crop to.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to write the cropped lines. Written to stdout if None
    pub output_path: Option<PathBuf>,
    pub delimiter: String,
    pub timestamp_format: String,
    pub has_header: bool,
    /// A sealog lowering record (JSON) providing the window
    pub lowering_path: Option<PathBuf>,
    /// RFC 3339 start of the window, overrides the lowering
    pub start: Option<String>,
    /// RFC 3339 end of the window, overrides the lowering
    pub stop: Option<String>,
    /// Input files or glob patterns
    pub inputs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: None,
            delimiter: String::from(","),
            timestamp_format: String::from(DEFAULT_TIMESTAMP_FORMAT),
            has_header: false,
            lowering_path: None,
            start: None,
            stop: None,
            inputs: vec![],
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write a default configuration to a YAML file, to be filled out by hand
    pub fn write_template(config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(&Self::default())?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Work out the window to crop to.
    ///
    /// The lowering record (if any) provides both bounds, then explicit start/stop values
    /// override it. Missing bounds fall back to the unix epoch and the current time.
    pub fn resolve_window(&self) -> Result<TimeWindow, ConfigError> {
        let mut window = match &self.lowering_path {
            Some(path) => Lowering::read_file(path)?.window()?,
            None => TimeWindow::default(),
        };
        if let Some(start) = &self.start {
            window.start = parse_bound(start)?;
        }
        if let Some(stop) = &self.stop {
            window.end = parse_bound(stop)?;
        }
        Ok(window)
    }

    pub fn has_output_path(&self) -> bool {
        self.output_path.is_some()
    }
}

fn parse_bound(value: &str) -> Result<NaiveDateTime, ConfigError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.naive_utc())
        .map_err(|e| ConfigError::BadWindowBound(value.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("inputs:\n  - /data/nav/*.csv\n").unwrap();
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(config.inputs, vec![String::from("/data/nav/*.csv")]);
        assert!(!config.has_output_path());
    }

    #[test]
    fn test_template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        Config::write_template(&path).unwrap();
        assert_eq!(Config::read_config_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            Config::read_config_file(Path::new("/does/not/exist.yml")),
            Err(ConfigError::BadFilePath(_))
        ));
    }

    #[test]
    fn test_window_from_lowering_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let lowering_path = dir.path().join("lowering.json");
        let mut file = std::fs::File::create(&lowering_path).unwrap();
        file.write_all(
            br#"{"lowering_id": "S0413", "start_ts": "2021-04-21T10:00:00.000Z", "stop_ts": "2021-04-21T12:00:00.000Z"}"#,
        )
        .unwrap();

        let config = Config {
            lowering_path: Some(lowering_path),
            stop: Some(String::from("2021-04-21T11:00:00Z")),
            ..Default::default()
        };
        let window = config.resolve_window().unwrap();
        assert_eq!(window.start.to_string(), "2021-04-21 10:00:00");
        assert_eq!(window.end.to_string(), "2021-04-21 11:00:00");
    }

    #[test]
    fn test_bad_window_bound() {
        let config = Config {
            start: Some(String::from("not a time")),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_window(),
            Err(ConfigError::BadWindowBound(..))
        ));
    }
}
