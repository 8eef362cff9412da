use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TimestampError {
    #[error("Line is empty; expected a leading timestamp field")]
    EmptyLine,
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
    #[error("Timestamp field {0:?} is missing its fractional seconds")]
    MissingFraction(String),
    #[error("Failed to parse timestamp field {0:?}: {1}")]
    BadTimestamp(String, #[source] chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config was given an invalid timestamp format {0:?}")]
    BadTimestampFormat(String),
    #[error("Config was given an empty field delimiter")]
    EmptyDelimiter,
    #[error("Config was given an invalid input pattern: {0}")]
    BadPattern(#[from] glob::PatternError),
    #[error("Config failed to parse window bound {0:?}: {1}")]
    BadWindowBound(String, #[source] chrono::ParseError),
    #[error("Config failed to load lowering record: {0}")]
    LoweringError(#[from] LoweringError),
}

#[derive(Debug, Error)]
pub enum LoweringError {
    #[error("Failed to load lowering record as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Lowering record failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Lowering record failed to parse JSON: {0}")]
    ParsingError(#[from] serde_json::Error),
    #[error("Lowering record has an invalid {0} timestamp {1:?}: {2}")]
    BadTimestamp(&'static str, String, #[source] chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum FileCropError {
    #[error("FileCrop failed due to IO error on file {0:?}: {1}")]
    IOError(PathBuf, #[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to FileCrop error: {0}")]
    FileCropError(#[from] FileCropError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
