use {
    snafu::{prelude::*, Backtrace},
    std::{io, path::PathBuf},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("file {} already exists", path.display()))]
    FileExists { path: PathBuf, backtrace: Backtrace },

    #[snafu(display("file {} does not exist", path.display()))]
    FileNotFound { path: PathBuf, backtrace: Backtrace },

    #[snafu(display("I/O error on {}: {}", path.display(), source))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("{} is not a valid {} file", path.display(), kind))]
    BadHeader { path: PathBuf, kind: &'static str },

    #[snafu(display("record size must be positive"))]
    InvalidRecordSize { backtrace: Backtrace },

    #[snafu(display("an index needs at least one key column"))]
    EmptyKey { backtrace: Backtrace },

    #[snafu(display("index key is longer than {} bytes", u32::MAX))]
    KeyTooLarge { backtrace: Backtrace },

    #[snafu(display(
        "index file {} has a {} byte key, expected {}",
        path.display(),
        stored,
        expected
    ))]
    KeyMismatch {
        path: PathBuf,
        stored: u32,
        expected: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
