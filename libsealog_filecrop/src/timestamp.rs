use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::NaiveDateTime;

use super::error::{ConfigError, TimestampError};

/// The timestamp format used by sealog and the OpenRVDAS loggers, e.g. `2021-04-21T13:45:00.123Z`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%fZ";

/// Most fraction digits read by `.%f`
const MAX_FRACTION_DIGITS: usize = 9;

/// A validated strftime-style format used to parse the leading field of a log line.
///
/// Formats are accepted in the strptime dialect used by the rest of the sealog tooling. chrono has
/// no specifier for strptime's `.%f` (a required `.` followed by any number of fraction digits),
/// so the format is split around the first `.%f` and the fraction is read by hand between the
/// two halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    format: String,
    prefix: String,
    suffix: Option<String>,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::split(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl TimestampFormat {
    /// Create a new TimestampFormat, rejecting format strings chrono cannot interpret
    pub fn new(format: &str) -> Result<Self, ConfigError> {
        let fmt = Self::split(format);
        let is_bad = format.is_empty()
            || has_bad_item(&fmt.prefix)
            || fmt.suffix.as_deref().is_some_and(has_bad_item);
        if is_bad {
            return Err(ConfigError::BadTimestampFormat(format.to_string()));
        }
        Ok(fmt)
    }

    fn split(format: &str) -> Self {
        match format.split_once(".%f") {
            Some((prefix, suffix)) => Self {
                format: format.to_string(),
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
            },
            None => Self {
                format: format.to_string(),
                prefix: format.to_string(),
                suffix: None,
            },
        }
    }

    /// The format string as given
    pub fn as_str(&self) -> &str {
        &self.format
    }

    /// Parse a bare timestamp string
    pub fn parse(&self, value: &str) -> Result<NaiveDateTime, TimestampError> {
        let bad = |e| TimestampError::BadTimestamp(value.to_string(), e);
        let Some(suffix) = &self.suffix else {
            return NaiveDateTime::parse_from_str(value, &self.prefix).map_err(bad);
        };

        let mut parsed = Parsed::new();
        let rest = format::parse_and_remainder(&mut parsed, value, StrftimeItems::new(&self.prefix))
            .map_err(bad)?;
        let (nanos, rest) =
            split_fraction(rest).ok_or_else(|| TimestampError::MissingFraction(value.to_string()))?;
        parsed.set_nanosecond(nanos).map_err(bad)?;
        format::parse(&mut parsed, rest, StrftimeItems::new(suffix)).map_err(bad)?;
        parsed.to_naive_datetime_with_offset(0).map_err(bad)
    }

    /// Parse the first `delimiter` separated field of a line.
    ///
    /// The line terminator is ignored. The remaining fields are never inspected.
    pub fn parse_leading(&self, line: &str, delimiter: &str) -> Result<NaiveDateTime, TimestampError> {
        self.parse_leading_bytes(line.as_bytes(), delimiter)
    }

    /// Same as [TimestampFormat::parse_leading] for a raw line.
    ///
    /// Only the leading field has to be UTF-8; the rest of the line can hold anything.
    pub fn parse_leading_bytes(
        &self,
        line: &[u8],
        delimiter: &str,
    ) -> Result<NaiveDateTime, TimestampError> {
        let mut line = line;
        while let [rest @ .., b'\n' | b'\r'] = line {
            line = rest;
        }
        if line.is_empty() {
            return Err(TimestampError::EmptyLine);
        }
        let field = std::str::from_utf8(leading_field(line, delimiter.as_bytes()))
            .map_err(|_| TimestampError::InvalidUtf8)?;
        self.parse(field)
    }
}

fn has_bad_item(format: &str) -> bool {
    StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn leading_field<'a>(line: &'a [u8], delimiter: &[u8]) -> &'a [u8] {
    if delimiter.is_empty() {
        return line;
    }
    match line.windows(delimiter.len()).position(|w| w == delimiter) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Read a `.` and at least one fraction digit, returning nanoseconds and the rest of the string
fn split_fraction(s: &str) -> Option<(i64, &str)> {
    let digits = s.strip_prefix('.')?;
    let n_digits = digits
        .bytes()
        .take(MAX_FRACTION_DIGITS)
        .take_while(u8::is_ascii_digit)
        .count();
    if n_digits == 0 {
        return None;
    }
    let mut nanos: i64 = digits[..n_digits].parse().ok()?;
    for _ in n_digits..MAX_FRACTION_DIGITS {
        nanos *= 10;
    }
    Some((nanos, &digits[n_digits..]))
}
