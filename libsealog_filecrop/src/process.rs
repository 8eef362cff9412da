use spdlog::Logger;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use super::config::Config;
use super::error::ProcessorError;
use super::file_crop::TimeWindowFileFilter;
use super::inputs::expand_inputs;
use super::source::LogSource;

/// What a crop did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropSummary {
    pub candidate_files: usize,
    pub selected_files: usize,
    pub lines_written: u64,
    pub malformed_lines: u64,
}

/// Crop a set of files into a writer.
///
/// The files are first narrowed down to those overlapping the filter's window, then the in-window
/// lines of each selected file are written in order. `on_file` is called with the number of files
/// done and the number selected after each file. No overlapping files is not an error; nothing gets
/// written.
pub fn crop<S: LogSource, W: Write>(
    filter: &TimeWindowFileFilter<S>,
    files: &[PathBuf],
    writer: &mut W,
    logger: &Logger,
    mut on_file: impl FnMut(usize, usize),
) -> Result<CropSummary, ProcessorError> {
    let mut summary = CropSummary {
        candidate_files: files.len(),
        ..Default::default()
    };

    let selected = filter.select_overlapping(files)?;
    summary.selected_files = selected.len();
    if selected.is_empty() {
        spdlog::warn!(
            logger: logger,
            "None of the {} input files overlap the window {} to {}",
            files.len(),
            filter.window().start,
            filter.window().end
        );
        return Ok(summary);
    }

    let total_size = selected
        .iter()
        .filter_map(|path| path.metadata().ok())
        .fold(0, |sum, meta| sum + meta.len());
    spdlog::info!(
        logger: logger,
        "Selected {} of {} files with total size: {}",
        selected.len(),
        files.len(),
        human_bytes::human_bytes(total_size as f64)
    );

    for (idx, path) in selected.iter().enumerate() {
        let mut lines = filter.stream_filtered_lines([path]);
        for line in lines.by_ref() {
            writer.write_all(&line?)?;
            summary.lines_written += 1;
        }
        summary.malformed_lines += lines.malformed_lines();
        on_file(idx + 1, selected.len());
    }
    writer.flush()?;

    spdlog::info!(
        logger: logger,
        "Wrote {} lines, skipped {} malformed lines",
        summary.lines_written,
        summary.malformed_lines
    );
    Ok(summary)
}

/// The main loop of sealog_filecrop.
///
/// Resolves the window and inputs of a config, then crops them into the output file (or stdout).
pub fn process(
    config: &Config,
    logger: Arc<Logger>,
    on_file: impl FnMut(usize, usize),
) -> Result<CropSummary, ProcessorError> {
    let window = config.resolve_window()?;
    spdlog::info!(logger: logger, "Cropping to window {} to {}", window.start, window.end);
    let filter = TimeWindowFileFilter::from_config(config, window)?.with_logger(logger.clone());
    let files = expand_inputs(&config.inputs, &logger)?;

    match &config.output_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            crop(&filter, &files, &mut writer, &logger, on_file)
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            crop(&filter, &files, &mut writer, &logger, on_file)
        }
    }
}
