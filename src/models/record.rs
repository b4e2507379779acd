use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::parsers::deserializers::{deserialize_content, deserialize_lenient, deserialize_timestamp};

const RECORD_TYPE_USER: &str = "user";
const RECORD_TYPE_ASSISTANT: &str = "assistant";

/// Which part of the conversation a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Assistant,
    /// file-history-snapshot, summary, system, progress, ...
    Other,
}

/// One line of a session transcript.
///
/// Every field is optional: a line only has to be a JSON object to be kept.
/// Fields of an unexpected shape are dropped instead of rejecting the line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub message: Option<RecordMessage>,
    /// Side channel for shell-like tools; applies to every tool_result block in the record
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub tool_use_result: Option<ToolUseResult>,
}

impl RawRecord {
    pub fn kind(&self) -> RecordKind {
        match self.record_type.as_deref() {
            Some(RECORD_TYPE_USER) => RecordKind::User,
            Some(RECORD_TYPE_ASSISTANT) => RecordKind::Assistant,
            _ => RecordKind::Other,
        }
    }

    /// Message content, or `None` when the record carries no message
    pub fn content(&self) -> Option<&MessageContent> {
        self.message.as_ref().map(|m| &m.content)
    }

    /// Content blocks, if the content is a block list
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match self.content() {
            Some(MessageContent::Blocks(blocks)) => Some(blocks),
            _ => None,
        }
    }

    /// True when the record delivers tool output rather than a human turn
    pub fn carries_tool_result(&self) -> bool {
        self.blocks()
            .is_some_and(|blocks| blocks.iter().any(|b| matches!(b, ContentBlock::ToolResult { .. })))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMessage {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "deserialize_content")]
    pub content: MessageContent,
}

/// `message.content` is either a plain string or a list of typed blocks
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// Any other JSON shape; contributes nothing to the timeline
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Other(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        id: Option<String>,
        #[serde(default, deserialize_with = "deserialize_lenient")]
        name: Option<String>,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Value,
    },
    /// image, document, redacted_thinking, or anything malformed
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Decode a single block, degrading to [`ContentBlock::Unknown`] on any mismatch
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(ContentBlock::Unknown)
    }
}

/// `toolUseResult` as written next to tool_result blocks
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolUseResult {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub stdout: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub stderr: String,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub interrupted: bool,
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, String>(deserializer)?.unwrap_or_default())
}

fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, bool>(deserializer)?.unwrap_or(false))
}
