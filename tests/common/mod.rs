//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

pub const SESSION_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const PROJECT_CWD: &str = "/work/app";

/// Builder for a fake home directory containing `.claude/projects/...`
pub struct ClaudeDirBuilder {
    home: TempDir,
}

impl ClaudeDirBuilder {
    pub fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(home.path().join(".claude/projects")).expect("Failed to create projects dir");
        Self { home }
    }

    /// The fake HOME
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// The `.claude` directory inside HOME
    pub fn claude_dir(&self) -> PathBuf {
        self.home.path().join(".claude")
    }

    /// Write `projects/<slug>/<id>.jsonl` with raw content
    pub fn with_session_lines(self, slug: &str, id: &str, content: &str) -> Self {
        let dir = self.claude_dir().join("projects").join(slug);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        fs::write(dir.join(format!("{}.jsonl", id)), content).expect("Failed to write session");
        self
    }

    /// Write a session built from records
    pub fn with_session(self, slug: &str, id: &str, records: &[RecordBuilder]) -> Self {
        let content = transcript(records);
        self.with_session_lines(slug, id, &content)
    }

    pub fn build(self) -> TempDir {
        self.home
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Join records into JSONL
pub fn transcript(records: &[RecordBuilder]) -> String {
    records.iter().map(RecordBuilder::to_json).collect::<Vec<_>>().join("\n")
}

/// Write records to a standalone transcript file
pub fn write_transcript(dir: &Path, records: &[RecordBuilder]) -> PathBuf {
    let path = dir.join("session.jsonl");
    fs::write(&path, transcript(records)).expect("Failed to write transcript");
    path
}

/// Builder for one transcript line
#[derive(Clone)]
pub struct RecordBuilder {
    value: Value,
}

impl RecordBuilder {
    fn base(kind: &str, role: &str, content: Value) -> Self {
        Self {
            value: json!({
                "type": kind,
                "sessionId": SESSION_ID,
                "cwd": PROJECT_CWD,
                "message": { "role": role, "content": content },
            }),
        }
    }

    /// A human turn with plain string content
    pub fn user(text: &str) -> Self {
        Self::base("user", "user", json!(text))
    }

    /// An assistant turn; add blocks with the methods below
    pub fn assistant() -> Self {
        Self::base("assistant", "assistant", json!([]))
    }

    /// A user record carrying a single tool_result block
    pub fn tool_result(tool_use_id: &str, content: &str) -> Self {
        Self::base(
            "user",
            "user",
            json!([{ "type": "tool_result", "tool_use_id": tool_use_id, "content": content }]),
        )
    }

    fn push_block(mut self, block: Value) -> Self {
        if let Some(blocks) = self.value["message"]["content"].as_array_mut() {
            blocks.push(block);
        }
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.push_block(json!({ "type": "text", "text": text }))
    }

    pub fn thinking(self, thinking: &str) -> Self {
        self.push_block(json!({ "type": "thinking", "thinking": thinking }))
    }

    pub fn tool_use(self, id: &str, name: &str, input: Value) -> Self {
        self.push_block(json!({ "type": "tool_use", "id": id, "name": name, "input": input }))
    }

    pub fn at(mut self, timestamp: &str) -> Self {
        self.value["timestamp"] = json!(timestamp);
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.value["uuid"] = json!(uuid);
        self
    }

    pub fn session(mut self, session_id: &str, cwd: &str) -> Self {
        self.value["sessionId"] = json!(session_id);
        self.value["cwd"] = json!(cwd);
        self
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        self.value["toolUseResult"]["stdout"] = json!(stdout);
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        self.value["toolUseResult"]["stderr"] = json!(stderr);
        self
    }

    pub fn interrupted(mut self) -> Self {
        self.value["toolUseResult"]["interrupted"] = json!(true);
        self
    }

    pub fn to_json(&self) -> String {
        self.value.to_string()
    }
}

/// The three-step session used across tests: a failing Bash run, then the
/// user stepping in
pub fn failing_build_session() -> Vec<RecordBuilder> {
    vec![
        RecordBuilder::user("fix bug").at("2025-01-01T00:00:00Z").uuid("u1"),
        RecordBuilder::assistant()
            .tool_use("t1", "Bash", json!({ "command": "npm test" }))
            .at("2025-01-01T00:00:05Z")
            .uuid("a1"),
        RecordBuilder::tool_result("t1", "FAIL")
            .stderr("1 failing")
            .at("2025-01-01T00:00:09Z")
            .uuid("r1"),
        RecordBuilder::user("also fix lint").at("2025-01-01T00:01:00Z").uuid("u2"),
    ]
}
