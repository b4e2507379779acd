//! Transcript → timeline reconstruction.
//!
//! Tool results can land in any record after (or, in odd logs, before) the
//! invocation they answer, so reconstruction is two explicit passes over the
//! buffered records:
//!
//! 1. Index every `tool_result` block by its `tool_use_id`.
//! 2. Walk the records in log order and emit steps, pairing each `tool_use`
//!    with its indexed result.
//!
//! A final pass back-fills durations that no result timestamp could provide.
//! Reconstruction is a pure function: no state survives between calls.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{
    ContentBlock, EventKind, MessageContent, RawRecord, RecordKind, SessionMeta, Timeline,
    TimelineEvent, ToolDescriptor, ToolResult, UNKNOWN_TOOL,
};
use crate::timeline::failure::FailurePolicy;

/// Outcome of a tool call, as found in pass 1
#[derive(Debug, Clone, Default, PartialEq)]
struct PendingResult {
    output: String,
    stdout: String,
    stderr: String,
    interrupted: bool,
    timestamp: Option<DateTime<Utc>>,
}

/// Earliest and latest timestamp seen on any record
#[derive(Debug, Default)]
struct TimeBounds {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeBounds {
    fn observe(&mut self, ts: DateTime<Utc>) {
        if self.start.is_none_or(|start| ts < start) {
            self.start = Some(ts);
        }
        if self.end.is_none_or(|end| ts > end) {
            self.end = Some(ts);
        }
    }

    fn duration_ms(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

/// Rebuild the step-by-step timeline of a session from its raw records.
pub fn reconstruct(records: &[RawRecord]) -> Timeline {
    let pending = index_results(records);
    let policy = FailurePolicy::emission();

    let mut events: Vec<TimelineEvent> = Vec::new();
    let mut step = 0;
    let mut session_id = None;
    let mut cwd = None;
    let mut bounds = TimeBounds::default();
    let mut files_edited = BTreeSet::new();

    for record in records {
        // Bounds come from every record, including ones that emit nothing
        if let Some(ts) = record.timestamp {
            bounds.observe(ts);
        }

        let kind = record.kind();
        if kind == RecordKind::Other {
            continue;
        }

        if let Some(id) = non_empty(&record.session_id) {
            session_id = Some(id.to_string());
        }
        if let Some(dir) = non_empty(&record.cwd) {
            cwd = Some(dir.to_string());
        }

        match kind {
            RecordKind::User => {
                if let Some(text) = human_text(record) {
                    step += 1;
                    events.push(new_event(step, record, EventKind::User { text }, None, false));
                }
            }
            RecordKind::Assistant => {
                let Some(blocks) = record.blocks() else {
                    continue;
                };
                for block in blocks {
                    match block {
                        ContentBlock::Thinking { thinking } if !thinking.trim().is_empty() => {
                            step += 1;
                            let thought = EventKind::Thinking { thinking: thinking.clone() };
                            events.push(new_event(step, record, thought, None, false));
                        }
                        ContentBlock::ToolUse { id, name, input } => {
                            // a missing input is recorded as an empty object
                            let input = match input {
                                Value::Null => Value::Object(Default::default()),
                                other => other.clone(),
                            };
                            let tool = ToolDescriptor {
                                name: name.clone().unwrap_or_else(|| UNKNOWN_TOOL.to_string()),
                                description: input
                                    .get("description")
                                    .and_then(Value::as_str)
                                    .map(str::to_string),
                                input,
                            };
                            if let Some(path) = tool.edited_path() {
                                files_edited.insert(path.to_string());
                            }

                            let matched = id.as_deref().and_then(|id| pending.get(id));
                            let duration_ms = matched.and_then(|p| elapsed_ms(record.timestamp, p.timestamp));
                            let result = matched.map(|p| {
                                let mut result = ToolResult {
                                    output: p.output.clone(),
                                    stdout: p.stdout.clone(),
                                    stderr: p.stderr.clone(),
                                    interrupted: p.interrupted,
                                    is_error: false,
                                };
                                result.is_error = policy.is_failure(&result);
                                result
                            });
                            let failed = result.as_ref().is_some_and(|r| r.is_error);

                            step += 1;
                            let call = EventKind::ToolCall { tool_use_id: id.clone(), tool, result };
                            events.push(new_event(step, record, call, duration_ms, failed));
                        }
                        _ => {}
                    }
                }
            }
            RecordKind::Other => {}
        }
    }

    backfill_durations(&mut events);

    let error_count = events.iter().filter(|e| e.failed).count();
    let meta = SessionMeta {
        session_id,
        cwd,
        start_time: bounds.start,
        end_time: bounds.end,
        duration_ms: bounds.duration_ms(),
        files_edited: files_edited.into_iter().collect(),
        total_steps: step,
        error_count,
    };

    Timeline { events, meta }
}

/// Pass 1: tool_use_id → result; later records overwrite earlier ones
fn index_results(records: &[RawRecord]) -> HashMap<String, PendingResult> {
    let mut pending = HashMap::new();

    for record in records.iter().filter(|r| r.kind() == RecordKind::User) {
        let Some(blocks) = record.blocks() else {
            continue;
        };
        let side = record.tool_use_result.clone().unwrap_or_default();

        for block in blocks {
            if let ContentBlock::ToolResult { tool_use_id: Some(id), content } = block
                && !id.is_empty()
            {
                pending.insert(
                    id.clone(),
                    PendingResult {
                        output: result_text(content),
                        stdout: side.stdout.clone(),
                        stderr: side.stderr.clone(),
                        interrupted: side.interrupted,
                        timestamp: record.timestamp,
                    },
                );
            }
        }
    }

    pending
}

/// Text of a human turn, or `None` for tool-result carriers and blank turns
fn human_text(record: &RawRecord) -> Option<String> {
    if record.carries_tool_result() {
        return None;
    }

    let text = match record.content()? {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        MessageContent::Other(_) => return None,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// tool_result content: strings verbatim, block lists as their joined text
fn result_text(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let texts: Vec<&str> = items
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|item| item.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() { content.to_string() } else { texts.join("\n") }
        }
        other => other.to_string(),
    }
}

/// Post-pass: a step with no explicit duration lasts until the next step starts
fn backfill_durations(events: &mut [TimelineEvent]) {
    for i in 0..events.len().saturating_sub(1) {
        if events[i].duration_ms.is_none() {
            events[i].duration_ms = elapsed_ms(events[i].timestamp, events[i + 1].timestamp);
        }
    }
}

/// Non-negative milliseconds from `from` to `to`, when both are known
fn elapsed_ms(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<i64> {
    Some((to? - from?).num_milliseconds().max(0))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn new_event(
    step: usize,
    record: &RawRecord,
    kind: EventKind,
    duration_ms: Option<i64>,
    failed: bool,
) -> TimelineEvent {
    TimelineEvent {
        step,
        uuid: record.uuid.clone(),
        timestamp: record.timestamp,
        duration_ms,
        kind,
        failed,
        is_branch_point: false,
    }
}
