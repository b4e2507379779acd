use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Overrides where HTML replays are written
pub const REPLAY_DIR_ENV: &str = "SESSION_REPLAY_DIR";
/// Project directory exported by Claude Code hooks
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

const REPLAYS_DIR_NAME: &str = ".session-replays";
const UNKNOWN_BRANCH: &str = "unknown";

fn home_dir() -> Result<PathBuf> {
    match env::var_os("HOME").filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home)),
        None => dirs::home_dir().context("HOME environment variable not set"),
    }
}

/// Get the Claude directory path (~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".claude"))
}

/// Directory for rendered replays: `$SESSION_REPLAY_DIR` or `~/.session-replays`
pub fn get_replays_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(REPLAY_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    Ok(home_dir()?.join(REPLAYS_DIR_NAME))
}

/// Project directory whose sessions are replayed: `--cwd`, then
/// `$CLAUDE_PROJECT_DIR`, then the process working directory
pub fn resolve_project_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::var_os(PROJECT_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    env::current_dir().context("Failed to determine current directory")
}

/// Checked-out branch of the repository at `cwd`, or "unknown"
pub fn git_branch(cwd: Option<&str>) -> String {
    let Some(cwd) = cwd.filter(|c| Path::new(c).is_dir()) else {
        return UNKNOWN_BRANCH.to_string();
    };

    Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|branch| !branch.is_empty())
        .unwrap_or_else(|| UNKNOWN_BRANCH.to_string())
}
