//! Session transcript discovery under `~/.claude/projects/`
//!
//! Claude Code stores one transcript per session at
//! `~/.claude/projects/<slug>/<session-id>.jsonl`, where the slug is the
//! project's working directory with separators replaced by `-`.
//!
//! # Error Handling Strategy
//!
//! Scans are blocking, read-only and best-effort: a missing projects directory
//! means "no sessions", and unreadable directories or files are logged as
//! warnings and skipped rather than failing the listing.

pub mod sessions;

pub use sessions::{find_session, latest_session, list_all_sessions, list_sessions};
