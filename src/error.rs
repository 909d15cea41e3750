use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the file-level entry points.
///
/// The in-memory engine never fails: every input line is claimed by a
/// passthrough fall-through, so only I/O can go wrong.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace {path}: {source}")]
    Replace { path: PathBuf, source: io::Error },
}
