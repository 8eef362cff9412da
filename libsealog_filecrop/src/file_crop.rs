use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use spdlog::Logger;

use super::config::Config;
use super::error::{ConfigError, FileCropError};
use super::source::{FsSource, LogSource};
use super::tail::read_last_line;
use super::time_window::TimeWindow;
use super::timestamp::TimestampFormat;

/// Selects and crops timestamped line-oriented log files to a TimeWindow.
///
/// Every line of a log file is expected to start with a timestamp field, separated from the rest
/// of the line by the delimiter. Files can optionally start with a single header line. Lines that
/// do not start with a valid timestamp are logged as warnings and skipped; they never abort the
/// selection or the crop.
///
/// There are two independent passes:
/// - [TimeWindowFileFilter::select_overlapping] keeps the files whose first and last lines
///   span a time range that intersects the window. Only the boundary lines are read.
/// - [TimeWindowFileFilter::stream_filtered_lines] lazily yields every line of every file whose
///   timestamp lies in the window.
pub struct TimeWindowFileFilter<S: LogSource = FsSource> {
    window: TimeWindow,
    delimiter: String,
    format: TimestampFormat,
    has_header: bool,
    logger: Arc<Logger>,
    source: S,
}

impl Default for TimeWindowFileFilter {
    /// Everything from the epoch until now, comma delimited, default timestamp format, no header
    fn default() -> Self {
        Self {
            window: TimeWindow::default(),
            delimiter: String::from(","),
            format: TimestampFormat::default(),
            has_header: false,
            logger: spdlog::default_logger(),
            source: FsSource,
        }
    }
}

impl TimeWindowFileFilter {
    /// Create a new filter reading from the local filesystem and logging to the default logger
    pub fn new(
        window: TimeWindow,
        delimiter: &str,
        format: TimestampFormat,
        has_header: bool,
    ) -> Result<Self, ConfigError> {
        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(Self {
            window,
            delimiter: delimiter.to_string(),
            format,
            has_header,
            logger: spdlog::default_logger(),
            source: FsSource,
        })
    }

    /// Create a filter from the delimiter, format and header settings of a Config
    pub fn from_config(config: &Config, window: TimeWindow) -> Result<Self, ConfigError> {
        Self::new(
            window,
            &config.delimiter,
            TimestampFormat::new(&config.timestamp_format)?,
            config.has_header,
        )
    }
}

impl<S: LogSource> TimeWindowFileFilter<S> {
    /// Send this filter's warnings to a specific logger
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Read files through a different LogSource
    pub fn with_source<T: LogSource>(self, source: T) -> TimeWindowFileFilter<T> {
        TimeWindowFileFilter {
            window: self.window,
            delimiter: self.delimiter,
            format: self.format,
            has_header: self.has_header,
            logger: self.logger,
            source,
        }
    }

    /// The window lines and files are checked against
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Separator between the timestamp and the rest of a line
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Whether select_overlapping skips a header line
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Keep the files whose time span overlaps the window, in their original order.
    ///
    /// A file's span is taken from the timestamps of its first data line (after the header, if
    /// any) and its last line. Files where either timestamp can't be read are dropped with a
    /// warning. A file that only touches a window bound is kept.
    ///
    /// Pass a single file as a one element slice.
    pub fn select_overlapping<I, P>(&self, files: I) -> Result<Vec<PathBuf>, FileCropError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut selected: Vec<PathBuf> = Vec::new();
        for file in files {
            let path = file.as_ref();
            let Some((first, last)) = self.read_span(path)? else {
                continue;
            };
            if self.window.overlaps(&first, &last) {
                spdlog::debug!(
                    logger: self.logger,
                    "Including {} which spans {first} to {last}",
                    path.display()
                );
                selected.push(path.to_path_buf());
            } else {
                spdlog::debug!(
                    logger: self.logger,
                    "Excluding {} which spans {first} to {last}, outside of the window",
                    path.display()
                );
            }
        }
        Ok(selected)
    }

    /// Lazily yield the lines of each file, in order, whose timestamp lies in the window.
    ///
    /// Lines are yielded as raw bytes, unmodified and including their terminator; only the
    /// timestamp field has to be UTF-8. Files are opened one at a time
    /// only once the previous one is exhausted, and closed as soon as they run out. The header
    /// setting is not used here; a header line just fails to parse and is skipped.
    pub fn stream_filtered_lines<I, P>(&self, files: I) -> FilteredLines<'_, S>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let files: Vec<PathBuf> = files
            .into_iter()
            .map(|file| file.as_ref().to_path_buf())
            .collect();
        FilteredLines {
            filter: self,
            files: files.into_iter(),
            active: None,
            buffer: Vec::new(),
            malformed_lines: 0,
            files_opened: 0,
            is_ended: false,
        }
    }

    /// Timestamps of the first data line and the last line of a file.
    ///
    /// Returns None (after logging a warning) if either can't be parsed.
    fn read_span(
        &self,
        path: &Path,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, FileCropError> {
        let io_error = |e| FileCropError::IOError(path.to_path_buf(), e);
        let mut reader = BufReader::new(self.source.open(path).map_err(io_error)?);
        let mut line: Vec<u8> = Vec::new();

        if self.has_header {
            reader.read_until(b'\n', &mut line).map_err(io_error)?;
            line.clear();
        }

        if reader.read_until(b'\n', &mut line).map_err(io_error)? == 0 {
            spdlog::warn!(
                logger: self.logger,
                "Excluding {}: file has no data lines",
                path.display()
            );
            return Ok(None);
        }
        let first = match self.format.parse_leading_bytes(&line, &self.delimiter) {
            Ok(ts) => ts,
            Err(e) => {
                spdlog::warn!(
                    logger: self.logger,
                    "Excluding {}: could not read timestamp of first line: {e}",
                    path.display()
                );
                return Ok(None);
            }
        };

        let last_line = match read_last_line(&mut reader).map_err(io_error)? {
            Some(l) => l,
            None => {
                spdlog::warn!(
                    logger: self.logger,
                    "Excluding {}: could not find last line",
                    path.display()
                );
                return Ok(None);
            }
        };
        let last = match self.format.parse_leading_bytes(&last_line, &self.delimiter) {
            Ok(ts) => ts,
            Err(e) => {
                spdlog::warn!(
                    logger: self.logger,
                    "Excluding {}: could not read timestamp of last line: {e}",
                    path.display()
                );
                return Ok(None);
            }
        };

        Ok(Some((first, last)))
    }
}

/// The file currently being streamed by FilteredLines
struct ActiveFile<R> {
    path: PathBuf,
    reader: BufReader<R>,
    line_number: u64,
}

/// Iterator over the in-window lines of a set of files. See
/// [TimeWindowFileFilter::stream_filtered_lines].
///
/// An IO error is yielded once, after which the iterator is finished.
pub struct FilteredLines<'a, S: LogSource> {
    filter: &'a TimeWindowFileFilter<S>,
    files: std::vec::IntoIter<PathBuf>,
    active: Option<ActiveFile<S::Reader>>,
    buffer: Vec<u8>,
    malformed_lines: u64,
    files_opened: usize,
    is_ended: bool,
}

impl<S: LogSource> FilteredLines<'_, S> {
    /// Number of lines dropped so far because their timestamp could not be read
    pub fn malformed_lines(&self) -> u64 {
        self.malformed_lines
    }

    /// Number of files opened so far
    pub fn files_opened(&self) -> usize {
        self.files_opened
    }

    /// Move to the next file in the list. Returns false when there are none left.
    fn open_next_file(&mut self) -> Result<bool, FileCropError> {
        let Some(path) = self.files.next() else {
            return Ok(false);
        };
        let file = self
            .filter
            .source
            .open(&path)
            .map_err(|e| FileCropError::IOError(path.clone(), e))?;
        spdlog::debug!(
            logger: self.filter.logger,
            "Streaming lines from {}",
            path.display()
        );
        self.files_opened += 1;
        self.active = Some(ActiveFile {
            path,
            reader: BufReader::new(file),
            line_number: 0,
        });
        Ok(true)
    }
}

impl<S: LogSource> Iterator for FilteredLines<'_, S> {
    type Item = Result<Vec<u8>, FileCropError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_ended {
                return None;
            }

            let Some(active) = self.active.as_mut() else {
                match self.open_next_file() {
                    Ok(true) => continue,
                    Ok(false) => {
                        self.is_ended = true;
                        return None;
                    }
                    Err(e) => {
                        self.is_ended = true;
                        return Some(Err(e));
                    }
                }
            };

            self.buffer.clear();
            match active.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    // Dropping the reader closes the file
                    self.active = None;
                }
                Ok(_) => {
                    active.line_number += 1;
                    match self
                        .filter
                        .format
                        .parse_leading_bytes(&self.buffer, &self.filter.delimiter)
                    {
                        Ok(ts) => {
                            if self.filter.window.contains(&ts) {
                                return Some(Ok(self.buffer.clone()));
                            }
                        }
                        Err(e) => {
                            self.malformed_lines += 1;
                            spdlog::warn!(
                                logger: self.filter.logger,
                                "Skipping line {} of {}: {e}",
                                active.line_number,
                                active.path.display()
                            );
                        }
                    }
                }
                Err(e) => {
                    let path = active.path.clone();
                    self.active = None;
                    self.is_ended = true;
                    return Some(Err(FileCropError::IOError(path, e)));
                }
            }
        }
    }
}
