//! # sealog_filecrop
//!
//! sealog_filecrop crops the timestamped sensor logs recorded alongside a
//! [sealog](https://github.com/OceanDataTools/sealog-server) event log down to the time span of a
//! single lowering (dive). Navigation and sensor loggers write one record per line, with the
//! timestamp as the first field, and typically roll over to a new file every day or so. Cropping a
//! lowering out of those files is done in two passes:
//!
//! - Selection: each file's time span is taken from its first and last lines only (the last line
//!   is found by reading backwards from the end of the file), and files which don't overlap the
//!   lowering are dropped.
//! - Streaming: every line of the remaining files is checked against the lowering window and the
//!   in-window lines are passed on unmodified, one at a time.
//!
//! Lines with a missing or unparseable timestamp are logged as warnings and skipped; field-recorded
//! logs are rarely perfect and a bad line should never cost the whole crop.
//!
//! ## Installation
//!
//! Currently the only method of install is from source. Clone the repository and use
//! `cargo install --path ./sealog_filecrop_cli` from the top level of the repository.
//!
//! ## Library use
//!
//! ```no_run
//! use libsealog_filecrop::file_crop::TimeWindowFileFilter;
//! use libsealog_filecrop::lowering::Lowering;
//! use libsealog_filecrop::timestamp::TimestampFormat;
//! use std::io::Write;
//! use std::path::Path;
//!
//! let window = Lowering::read_file(Path::new("S0413.json"))?.window()?;
//! let filter = TimeWindowFileFilter::new(window, ",", TimestampFormat::default(), false)?;
//! let files = filter.select_overlapping(["nav_20210421.csv", "nav_20210422.csv"])?;
//! for line in filter.stream_filtered_lines(&files) {
//!     std::io::stdout().write_all(&line?)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration
//!
//! The CLI can be driven by a YAML configuration file (a template can be made with
//! `sealog_filecrop_cli new -p config.yml`). The format is as follows:
//!
//! ```yml
//! output_path: null
//! delimiter: ','
//! timestamp_format: '%Y-%m-%dT%H:%M:%S.%fZ'
//! has_header: false
//! lowering_path: null
//! start: null
//! stop: null
//! inputs: []
//! ```
//!
//! - `output_path`: file to write the cropped lines to. If `null` the lines go to stdout.
//! - `delimiter`: the field separator of the log files.
//! - `timestamp_format`: strftime style format of the leading timestamp field.
//! - `has_header`: whether each log file starts with a header line.
//! - `lowering_path`: a lowering record (JSON) exported from sealog; its `start_ts` and `stop_ts`
//!   define the window.
//! - `start`/`stop`: RFC 3339 timestamps overriding the lowering bounds. A bound that is given
//!   by neither defaults to the unix epoch (start) or the current time (stop).
//! - `inputs`: files or glob patterns to crop.
pub mod config;
pub mod error;
pub mod file_crop;
pub mod inputs;
pub mod lowering;
pub mod process;
pub mod source;
pub mod tail;
pub mod time_window;
pub mod timestamp;
