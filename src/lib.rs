//! Session Replay - Reconstruct Claude Code sessions as step-by-step timelines
//!
//! This library reads the JSONL transcripts Claude Code stores under
//! `~/.claude/projects/` and turns them into a numbered timeline of user
//! turns, thinking and tool calls. It supports:
//!
//! - Lenient line-by-line loading of session transcripts
//! - Pairing tool invocations with their results and timing each step
//! - Enrichment: branch points (the user stepping in) and failure detection
//! - Terminal and self-contained HTML replays, and fork prompts
//! - Discovery of sessions per project and across all projects
//!
//! # Example
//!
//! ```no_run
//! use session_replay::load_analyzed;
//! use std::path::Path;
//!
//! let timeline = load_analyzed(Path::new("/Users/alice/.claude/projects/-work-app/abc.jsonl"))?;
//! println!("{} steps, {} edited files", timeline.meta.total_steps, timeline.meta.files_edited.len());
//! # Ok::<(), session_replay::ReplayError>(())
//! ```

pub mod cli;
pub mod clipboard;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod render;
pub mod timeline;
pub mod utils;

// Re-export commonly used types
pub use clipboard::copy_to_clipboard;
pub use error::{ReplayError, Result};
pub use models::{SessionMeta, Timeline, TimelineEvent};
pub use parsers::load_records;
pub use timeline::{analyze, load_analyzed, load_timeline, reconstruct, summarize};
pub use utils::paths::{format_path_with_tilde, project_slug};
