use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;
use walkdir::WalkDir;

use crate::models::SessionInfo;
use crate::utils::{project_label_from_slug, project_name_from_cwd, project_slug};

const TRANSCRIPT_EXTENSION: &str = "jsonl";

fn projects_dir(claude_dir: &Path) -> PathBuf {
    claude_dir.join("projects")
}

fn is_transcript(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TRANSCRIPT_EXTENSION)
}

fn session_id_of(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Build a [`SessionInfo`] for a transcript file, `None` if it vanished or is unreadable
fn session_info(path: PathBuf, project: String) -> Option<SessionInfo> {
    let id = session_id_of(&path)?;
    let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
        Ok(time) => DateTime::<Utc>::from(time),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable session file");
            return None;
        }
    };
    Some(SessionInfo { id, path, modified, project })
}

fn newest_first(sessions: &mut [SessionInfo]) {
    sessions.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
}

/// Transcripts directly inside one project directory
fn transcripts_in(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_transcript(path))
            .collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read project directory");
            Vec::new()
        }
    }
}

/// All sessions recorded for the project at `cwd`, newest first
///
/// Returns an empty Vec if the project has no session directory (not an error).
pub fn list_sessions(claude_dir: &Path, cwd: &Path) -> Vec<SessionInfo> {
    let dir = projects_dir(claude_dir).join(project_slug(cwd));
    if !dir.is_dir() {
        return Vec::new();
    }

    let project = project_name_from_cwd(cwd);
    let mut sessions: Vec<SessionInfo> = transcripts_in(&dir)
        .into_iter()
        .filter_map(|path| session_info(path, project.clone()))
        .collect();
    newest_first(&mut sessions);
    sessions
}

/// Most recently modified session of the project at `cwd`
pub fn latest_session(claude_dir: &Path, cwd: &Path) -> Option<SessionInfo> {
    list_sessions(claude_dir, cwd).into_iter().next()
}

/// Find a session by full or partial id
///
/// The project at `cwd` is searched first (exact id or prefix). Otherwise
/// every project directory is scanned for a file name starting with or
/// containing `id`; the first hit in directory order wins.
pub fn find_session(claude_dir: &Path, id: &str, cwd: Option<&Path>) -> Option<SessionInfo> {
    if id.is_empty() {
        return None;
    }

    if let Some(cwd) = cwd
        && let Some(found) =
            list_sessions(claude_dir, cwd).into_iter().find(|s| s.id == id || s.id.starts_with(id))
    {
        return Some(found);
    }

    let root = projects_dir(claude_dir);
    let mut project_dirs: Vec<PathBuf> = fs::read_dir(&root)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    project_dirs.sort();

    for dir in project_dirs {
        let mut candidates = transcripts_in(&dir);
        candidates.sort();

        let matched = candidates.into_iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| name.starts_with(id) || name.contains(id))
        });

        if let Some(path) = matched {
            let slug = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            return session_info(path, project_label_from_slug(&slug, 1));
        }
    }

    None
}

/// Every session across all projects, newest first
///
/// Only files exactly one level below `projects/` count; nested directories
/// (subagent transcripts and the like) are not sessions of their own.
pub fn list_all_sessions(claude_dir: &Path) -> Result<Vec<SessionInfo>> {
    let root = projects_dir(claude_dir);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in WalkDir::new(&root).min_depth(2).max_depth(2) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry under {}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_transcript(entry.path()) {
            continue;
        }

        let slug = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .context("Session file has no project directory")?;

        if let Some(info) = session_info(entry.into_path(), project_label_from_slug(&slug, 2)) {
            sessions.push(info);
        }
    }

    newest_first(&mut sessions);
    Ok(sessions)
}
