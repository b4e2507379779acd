//! Output surfaces for an analyzed timeline.
//!
//! - [`terminal`] - line-per-step replay for a terminal
//! - [`html`] - self-contained replay page plus metadata extraction from saved pages
//! - [`fork`] - markdown prompt for continuing a session from a given step

pub mod fork;
pub mod format;
pub mod html;
pub mod terminal;

pub use fork::build_fork_prompt;
pub use format::{format_duration, format_duration_long, sanitize_line, truncate_chars};
pub use html::{
    ArtifactMeta, DATA_MARKER, ReplayData, ReplayMeta, SavedReplay, build_html,
    extract_artifact_meta, list_replays, open_in_browser, write_replay,
};
pub use terminal::{describe_event, render_terminal};
