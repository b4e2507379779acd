//! JSONL loader for Claude Code session transcripts
//!
//! # Error Handling Strategy
//!
//! Loading follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: Blank lines are ignored. Lines that are not a JSON object
//!   (bad JSON, arrays, scalars, invalid UTF-8) are logged at debug level and skipped. There is
//!   no failure-rate threshold, so a partially written or corrupted transcript still replays.
//!
//! - **Field-level tolerance**: Fields with an unexpected shape (unparsable timestamps, string
//!   `toolUseResult`, unknown content blocks) are dropped by the lenient deserializers instead
//!   of rejecting the line.
//!
//! - **Fatal errors**: Only a transcript that cannot be opened or read at all fails, with a typed
//!   [`crate::error::ReplayError`]. No partial record list is returned in that case.

pub mod deserializers;
pub mod transcript;

pub use transcript::{load_records, read_records};
