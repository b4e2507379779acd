//! Error types for transcript loading.
//!
//! Only failures that make a whole session unreadable surface here. Malformed
//! lines inside a readable transcript are skipped by the loader and never
//! become errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    /// The transcript could not be opened
    #[error("Failed to open session log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed part-way through the transcript
    #[error("Failed to read session log {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path exists but is a directory or other non-regular file
    #[error("Session log is not a file: {}", .0.display())]
    NotAFile(PathBuf),
}

impl ReplayError {
    /// The transcript path the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ReplayError::Open { path, .. } | ReplayError::Read { path, .. } => path,
            ReplayError::NotAFile(path) => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplayError>;
