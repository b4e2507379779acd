use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ReplayError, Result};
use crate::models::RawRecord;

/// Load a session transcript (one JSON record per line) in file order.
///
/// The file is streamed line by line. Blank lines are ignored and lines that
/// are not a JSON object (including invalid UTF-8) are skipped and logged;
/// they never abort the load. Only failing to open or read the file is an error.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path)
        .map_err(|source| ReplayError::Open { path: path.to_path_buf(), source })?;

    let metadata = file
        .metadata()
        .map_err(|source| ReplayError::Open { path: path.to_path_buf(), source })?;
    if !metadata.is_file() {
        return Err(ReplayError::NotAFile(path.to_path_buf()));
    }

    read_records(BufReader::new(file), path)
}

/// Parse records from any buffered source; `path` is only used for messages
pub fn read_records<R: BufRead>(reader: R, path: &Path) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut skipped_count = 0;

    for (line_num, line) in reader.split(b'\n').enumerate() {
        let bytes =
            line.map_err(|source| ReplayError::Read { path: path.to_path_buf(), source })?;

        let Ok(line) = std::str::from_utf8(&bytes) else {
            debug!(line = line_num + 1, path = %path.display(), "Skipping line with invalid UTF-8");
            skipped_count += 1;
            continue;
        };

        // Skip empty lines (also covers a lone '\r' from CRLF files)
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Only JSON objects are records; arrays and scalars are malformed lines
        let parsed = serde_json::from_str::<Value>(line).and_then(|value| {
            if value.is_object() {
                serde_json::from_value::<RawRecord>(value)
            } else {
                Err(serde::de::Error::custom("record is not a JSON object"))
            }
        });

        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(line = line_num + 1, path = %path.display(), error = %e, "Skipping malformed line");
                skipped_count += 1;
            }
        }
    }

    if skipped_count > 0 {
        warn!(
            path = %path.display(),
            records = records.len(),
            skipped = skipped_count,
            "Skipped malformed lines in session log"
        );
    }

    Ok(records)
}
