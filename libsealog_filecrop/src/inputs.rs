use spdlog::Logger;
use std::collections::HashSet;
use std::path::PathBuf;

use super::error::ConfigError;

/// Expand a list of files and glob patterns into the files to crop.
///
/// Pattern order is kept, and the matches of each pattern are in glob's (alphabetical) order.
/// A file matched by more than one pattern is only kept the first time. Patterns that match
/// nothing are logged and skipped.
pub fn expand_inputs<I, S>(patterns: I, logger: &Logger) -> Result<Vec<PathBuf>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut n_matches = 0;
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(std::io::Error::from)?;
            if !path.is_file() {
                continue;
            }
            n_matches += 1;
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
        if n_matches == 0 {
            spdlog::warn!(logger: logger, "No files matched input {pattern}");
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_keeps_pattern_order_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "c.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.csv")).unwrap();
        let root = dir.path().to_string_lossy();
        let patterns = vec![
            format!("{root}/c.txt"),
            format!("{root}/*.csv"),
            format!("{root}/a.csv"),
            format!("{root}/missing_*.csv"),
        ];

        let files = expand_inputs(&patterns, &spdlog::default_logger()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("c.txt"),
                dir.path().join("a.csv"),
                dir.path().join("b.csv"),
            ]
        );
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(
            expand_inputs(["/data/[nav"], &spdlog::default_logger()),
            Err(ConfigError::BadPattern(_))
        ));
    }
}
