//! # sealog_filecrop_cli
//!
//! Part of the sealog_filecrop crate family.
//!
//! Crops timestamped sensor logs to the time span of a sealog lowering from the command line.
//!
//! ## Install
//!
//! Use `cargo install --path ./sealog_filecrop_cli`
//!
//! ## Use
//!
//! ```bash
//! sealog_filecrop_cli -l S0413.json -o S0413_nav.csv '/data/nav/*.csv'
//! ```
//!
//! Settings can also be loaded from a YAML config file with `-p`; any setting given on the
//! command line overrides the config file. Use `sealog_filecrop_cli new -p config.yml` to make a
//! template config. Cropped lines go to stdout unless an output file is given; logs always go to
//! stderr.
use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::ProgressBar;
use spdlog::sink::{FileSink, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use libsealog_filecrop::config::Config;
use libsealog_filecrop::process::process;

fn cli() -> Command {
    Command::new("sealog_filecrop_cli")
        .about("Crop timestamped log files to the time span of a lowering")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .global(true)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("File to write the cropped lines to (default: stdout)"),
        )
        .arg(
            Arg::new("delimiter")
                .short('d')
                .long("delimiter")
                .help("Field delimiter of the input files (default: ,)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Format of the leading timestamp (default: %Y-%m-%dT%H:%M:%S.%fZ)"),
        )
        .arg(
            Arg::new("header")
                .long("header")
                .action(ArgAction::SetTrue)
                .help("Input files start with a header line"),
        )
        .arg(
            Arg::new("lowering")
                .short('l')
                .long("lowering")
                .help("Lowering record (JSON) exported from sealog"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .help("Start of the window (RFC 3339), overrides the lowering"),
        )
        .arg(
            Arg::new("stop")
                .long("stop")
                .help("End of the window (RFC 3339), overrides the lowering"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Also write the log to this file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log the decision made for every file"),
        )
        .arg(
            Arg::new("inputs")
                .num_args(1..)
                .help("Input files or glob patterns"),
        )
}

/// Log to stderr, and optionally to a file as well. Stdout is reserved for output.
fn make_logger(log_path: Option<&Path>, verbose: bool) -> spdlog::Result<Arc<Logger>> {
    let stderr_sink = Arc::new(
        StdStreamSink::builder()
            .std_stream(StdStream::Stderr)
            .build()?,
    );
    let mut builder = Logger::builder();
    builder.name("sealog_filecrop").sink(stderr_sink);
    if let Some(path) = log_path {
        let file_sink = Arc::new(
            FileSink::builder()
                .path(path)
                .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                    spdlog::formatter::pattern!(
                        "[{date_short} {time_short}] - [{^{level}}] - {payload}{eol}"
                    ),
                )))
                .truncate(true)
                .build()?,
        );
        builder.sink(file_sink);
    }
    let level = if verbose {
        LevelFilter::MoreSevereEqual(Level::Debug)
    } else {
        LevelFilter::MoreSevereEqual(Level::Info)
    };
    builder
        .level_filter(level)
        .flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));
    Ok(Arc::new(builder.build()?))
}

/// Command line values take precedence over the config file
fn apply_args(config: &mut Config, matches: &ArgMatches) {
    if let Some(output) = matches.get_one::<String>("output") {
        config.output_path = Some(PathBuf::from(output));
    }
    if let Some(delimiter) = matches.get_one::<String>("delimiter") {
        config.delimiter = delimiter.clone();
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.timestamp_format = format.clone();
    }
    if matches.get_flag("header") {
        config.has_header = true;
    }
    if let Some(lowering) = matches.get_one::<String>("lowering") {
        config.lowering_path = Some(PathBuf::from(lowering));
    }
    if let Some(start) = matches.get_one::<String>("start") {
        config.start = Some(start.clone());
    }
    if let Some(stop) = matches.get_one::<String>("stop") {
        config.stop = Some(stop.clone());
    }
    if let Some(inputs) = matches.get_many::<String>("inputs") {
        config.inputs = inputs.cloned().collect();
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    // Initialize feedback
    let log_path = matches.get_one::<String>("log").map(PathBuf::from);
    let logger = match make_logger(log_path.as_deref(), matches.get_flag("verbose")) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Could not create logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config_path = matches.get_one::<String>("path").map(PathBuf::from);

    if let Some(("new", _)) = matches.subcommand() {
        let Some(config_path) = config_path else {
            spdlog::error!(logger: logger, "A path (-p) is required to make a template config");
            return ExitCode::FAILURE;
        };
        spdlog::info!(
            logger: logger,
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        if let Err(e) = Config::write_template(&config_path) {
            spdlog::error!(logger: logger, "{e}");
            return ExitCode::FAILURE;
        }
        spdlog::info!(logger: logger, "Done.");
        return ExitCode::SUCCESS;
    }

    // Load our config
    let mut config = match &config_path {
        Some(path) => {
            spdlog::info!(logger: logger, "Loading config from {}...", path.to_string_lossy());
            match Config::read_config_file(path) {
                Ok(c) => c,
                Err(e) => {
                    spdlog::error!(logger: logger, "{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Config::default(),
    };
    apply_args(&mut config, &matches);

    if config.inputs.is_empty() {
        spdlog::error!(logger: logger, "No input files were given");
        return ExitCode::FAILURE;
    }
    match &config.output_path {
        Some(path) => spdlog::info!(logger: logger, "Output Path: {}", path.to_string_lossy()),
        None => spdlog::info!(logger: logger, "Output Path: stdout"),
    }
    if let Some(path) = &config.lowering_path {
        spdlog::info!(logger: logger, "Lowering: {}", path.to_string_lossy());
    }
    spdlog::info!(logger: logger, "Timestamp Format: {}", config.timestamp_format);
    spdlog::info!(logger: logger, "Has Header: {}", config.has_header);

    // Only draw progress when stdout is not carrying the output
    let pb = if config.has_output_path() {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    let result = process(&config, logger.clone(), |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            spdlog::info!(
                logger: logger,
                "Cropped {} of {} files.",
                summary.selected_files,
                summary.candidate_files
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            spdlog::error!(logger: logger, "Cropping failed with error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_new_takes_path() {
        let matches = cli()
            .try_get_matches_from(["sealog_filecrop_cli", "new", "-p", "config.yml"])
            .unwrap();
        assert!(matches!(matches.subcommand(), Some(("new", _))));
        assert_eq!(
            matches.get_one::<String>("path").map(String::as_str),
            Some("config.yml")
        );
    }

    #[test]
    fn test_args_override_config() {
        let matches = cli()
            .try_get_matches_from([
                "sealog_filecrop_cli",
                "-d",
                "\t",
                "--header",
                "--stop",
                "2021-04-21T12:00:00Z",
                "a.csv",
                "b/*.csv",
            ])
            .unwrap();
        let mut config = Config {
            delimiter: String::from(";"),
            start: Some(String::from("2021-04-21T10:00:00Z")),
            inputs: vec![String::from("old.csv")],
            ..Default::default()
        };
        apply_args(&mut config, &matches);

        assert_eq!(config.delimiter, "\t");
        assert!(config.has_header);
        assert_eq!(config.start.as_deref(), Some("2021-04-21T10:00:00Z"));
        assert_eq!(config.stop.as_deref(), Some("2021-04-21T12:00:00Z"));
        assert_eq!(config.inputs, vec!["a.csv", "b/*.csv"]);
        assert!(config.output_path.is_none());
    }
}
