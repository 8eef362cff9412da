use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Where the filter gets its readers from.
///
/// The default is the local filesystem. Anything that can hand out seekable readers by path
/// can stand in, which is mostly useful for observing which files actually get opened.
pub trait LogSource {
    type Reader: Read + Seek;

    fn open(&self, path: &Path) -> std::io::Result<Self::Reader>;
}

/// Read-only access to files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl LogSource for FsSource {
    type Reader = File;

    fn open(&self, path: &Path) -> std::io::Result<Self::Reader> {
        File::open(path)
    }
}
