//! Data models for session replay.
//!
//! - [`RawRecord`] - One line of a Claude Code session transcript, kept loosely typed
//! - [`TimelineEvent`] / [`SessionMeta`] - The reconstructed timeline
//! - [`Summary`] - Statistics computed after enrichment
//! - [`SessionInfo`] - A transcript discovered on disk
//!
//! Transcript fields are decoded leniently through the custom deserializers in
//! `parsers::deserializers`; timeline types serialize to the camelCase JSON
//! embedded in replay artifacts.

pub mod record;
pub mod session;
pub mod timeline;

pub use record::{ContentBlock, MessageContent, RawRecord, RecordKind, RecordMessage, ToolUseResult};
pub use session::SessionInfo;
pub use timeline::{
    EventKind, SessionMeta, Summary, Timeline, TimelineEvent, ToolDescriptor, ToolResult,
    UNKNOWN_TOOL,
};
