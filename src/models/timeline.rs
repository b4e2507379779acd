use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool name used when a tool_use block has no name
pub const UNKNOWN_TOOL: &str = "Unknown";

/// One step of a reconstructed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// 1-based, dense, in emission order
    pub step: usize,
    /// uuid of the record the event came from
    pub uuid: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    #[serde(flatten)]
    pub kind: EventKind,
    pub failed: bool,
    pub is_branch_point: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    User {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolCall {
        #[serde(rename = "toolUseId")]
        tool_use_id: Option<String>,
        tool: ToolDescriptor,
        /// `None` while the call is outstanding or its result was never logged
        result: Option<ToolResult>,
    },
}

impl TimelineEvent {
    pub fn is_user(&self) -> bool {
        matches!(self.kind, EventKind::User { .. })
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self.kind, EventKind::ToolCall { .. })
    }

    pub fn user_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::User { text } => Some(text),
            _ => None,
        }
    }

    pub fn tool(&self) -> Option<&ToolDescriptor> {
        match &self.kind {
            EventKind::ToolCall { tool, .. } => Some(tool),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ToolResult> {
        match &self.kind {
            EventKind::ToolCall { result, .. } => result.as_ref(),
            _ => None,
        }
    }

    /// "user", "thinking", or the tool name
    pub fn label(&self) -> &str {
        match &self.kind {
            EventKind::User { .. } => "user",
            EventKind::Thinking { .. } => "thinking",
            EventKind::ToolCall { tool, .. } => &tool.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub input: Value,
    pub description: Option<String>,
}

impl ToolDescriptor {
    /// A string-valued input parameter
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }

    /// Path written by a file-mutation tool, if this is one
    pub fn edited_path(&self) -> Option<&str> {
        match self.name.as_str() {
            "Edit" | "Write" | "MultiEdit" => self.input_str("file_path"),
            "NotebookEdit" => self.input_str("notebook_path"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Text of the tool_result block itself
    pub output: String,
    pub stdout: String,
    pub stderr: String,
    pub interrupted: bool,
    /// Failure verdict at reconstruction time
    pub is_error: bool,
}

/// Aggregate facts about one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// Sorted, distinct
    pub files_edited: Vec<String>,
    pub total_steps: usize,
    /// Events already failed at reconstruction, before enrichment
    pub error_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    pub meta: SessionMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_steps: usize,
    pub error_count: usize,
    pub branch_points: usize,
    pub files_edited: Vec<String>,
    pub tool_counts: BTreeMap<String, usize>,
    pub duration_ms: Option<i64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tool_call(name: &str, input: Value) -> TimelineEvent {
        TimelineEvent {
            step: 1,
            uuid: None,
            timestamp: None,
            duration_ms: None,
            kind: EventKind::ToolCall {
                tool_use_id: Some("toolu_1".to_string()),
                tool: ToolDescriptor { name: name.to_string(), input, description: None },
                result: None,
            },
            failed: false,
            is_branch_point: false,
        }
    }

    #[test]
    fn test_event_serializes_flat_with_type_tag() {
        let event = tool_call("Bash", json!({"command": "ls"}));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "tool_call");
        assert_eq!(value["step"], 1);
        assert_eq!(value["toolUseId"], "toolu_1");
        assert_eq!(value["tool"]["name"], "Bash");
        assert!(value["result"].is_null());
        assert_eq!(value["isBranchPoint"], false);
        assert!(value["durationMs"].is_null());
    }

    #[test]
    fn test_event_json_roundtrip_through_flatten() {
        let event = TimelineEvent {
            step: 3,
            uuid: Some("u-3".to_string()),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000),
            duration_ms: Some(1500),
            kind: EventKind::User { text: "fix bug".to_string() },
            failed: false,
            is_branch_point: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_edited_path_only_for_mutation_tools() {
        assert_eq!(tool_call("Edit", json!({"file_path": "/a.rs"})).tool().unwrap().edited_path(), Some("/a.rs"));
        assert_eq!(
            tool_call("NotebookEdit", json!({"notebook_path": "/n.ipynb"})).tool().unwrap().edited_path(),
            Some("/n.ipynb")
        );
        assert_eq!(tool_call("Read", json!({"file_path": "/a.rs"})).tool().unwrap().edited_path(), None);
        assert_eq!(tool_call("Write", json!({})).tool().unwrap().edited_path(), None);
    }

    #[test]
    fn test_label() {
        assert_eq!(tool_call("Grep", json!({})).label(), "Grep");
    }
}
