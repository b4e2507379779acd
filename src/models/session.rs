use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A session transcript found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// File stem, normally the session UUID
    pub id: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    /// Display name of the project the session belongs to
    pub project: String,
}

impl SessionInfo {
    /// `YYYY-MM-DD` of the last modification
    pub fn date(&self) -> String {
        self.modified.format("%Y-%m-%d").to_string()
    }

    /// First 8 characters of the id, as shown in listings
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}
