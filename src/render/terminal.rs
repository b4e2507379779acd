//! Plain terminal replay: one line per step

use std::io::{self, Write};

use chrono::Utc;
use crossterm::style::{Color, Stylize};

use crate::models::{EventKind, Timeline, TimelineEvent};
use crate::render::format::{format_duration, sanitize_line, truncate_chars};
use crate::timeline::summarize;
use crate::utils::file_basename;

const RULE_WIDTH: usize = 60;
const SUMMARY_WIDTH: usize = 70;
const INPUT_WIDTH: usize = 60;

const ORANGE: Color = Color::AnsiValue(214);

fn label_color(label: &str) -> Color {
    match label {
        "Bash" => Color::Yellow,
        "Edit" => Color::Blue,
        "Write" => Color::Green,
        "Read" | "Glob" | "Grep" | "thinking" => Color::DarkGrey,
        "WebFetch" | "Task" => Color::Magenta,
        "user" => ORANGE,
        _ => Color::Reset,
    }
}

/// Applies colours only when enabled, so output can go to pipes and tests
struct Painter {
    enabled: bool,
}

impl Painter {
    fn color(&self, text: &str, color: Color) -> String {
        if self.enabled && color != Color::Reset {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.enabled { text.bold().to_string() } else { text.to_string() }
    }

    fn dim(&self, text: &str) -> String {
        if self.enabled { text.dim().to_string() } else { text.to_string() }
    }
}

/// One-line description of what a step did
pub fn describe_event(event: &TimelineEvent) -> String {
    match &event.kind {
        EventKind::User { text } => truncate_chars(&sanitize_line(text), SUMMARY_WIDTH).to_string(),
        EventKind::Thinking { .. } => "(thinking)".to_string(),
        EventKind::ToolCall { tool, .. } => {
            let input = |key: &str| tool.input_str(key).unwrap_or_default();
            match tool.name.as_str() {
                "Bash" => {
                    let what = tool
                        .input_str("description")
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| input("command"));
                    truncate_chars(&sanitize_line(what), SUMMARY_WIDTH).to_string()
                }
                "Edit" | "Write" | "Read" => sanitize_line(file_basename(input("file_path"))),
                "Glob" | "Grep" => sanitize_line(input("pattern")),
                "WebFetch" => truncate_chars(&sanitize_line(input("url")), INPUT_WIDTH).to_string(),
                _ => truncate_chars(&sanitize_line(&tool.input.to_string()), INPUT_WIDTH).to_string(),
            }
        }
    }
}

/// Write the whole timeline to `out`
pub fn render_terminal<W: Write>(
    out: &mut W,
    timeline: &Timeline,
    project: &str,
    color: bool,
) -> io::Result<()> {
    let paint = Painter { enabled: color };
    let summary = summarize(&timeline.events, &timeline.meta);
    let date = timeline.meta.start_time.unwrap_or_else(Utc::now).format("%Y-%m-%d");
    let rule = "━".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{}", paint.bold(&format!("Session Replay — {} — {}", sanitize_line(project), date)))?;
    writeln!(out, "{}", paint.color(&rule, Color::DarkGrey))?;

    for event in &timeline.events {
        if event.is_branch_point {
            writeln!(out, "{}", paint.color("  ─── ⑂  User intervened ───", ORANGE))?;
        }

        let label = sanitize_line(event.label());
        let step = paint.color(&format!("{:>3}", event.step), Color::DarkGrey);
        let kind = paint.color(&format!("{:<10}", label), label_color(&label));

        let mut description = describe_event(event);
        if matches!(event.kind, EventKind::Thinking { .. }) {
            description = paint.color(&description, Color::DarkGrey);
        }

        let duration = match event.duration_ms {
            Some(ms) if ms > 0 => format!(" {}", paint.color(&format_duration(Some(ms)), Color::DarkGrey)),
            _ => String::new(),
        };
        let failed =
            if event.failed { format!(" {}", paint.color("❌ FAILED", Color::Red)) } else { String::new() };

        writeln!(out, "{}  {} {}{}{}", step, kind, description, duration, failed)?;
    }

    writeln!(out, "{}", paint.color(&rule, Color::DarkGrey))?;
    let footer = format!(
        "{} steps  {} files  {} errors  {}",
        summary.total_steps,
        summary.files_edited.len(),
        summary.error_count,
        format_duration(summary.duration_ms)
    );
    writeln!(out, "{}", paint.dim(&footer))?;
    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;
    use crate::models::{SessionMeta, ToolDescriptor};

    fn event(step: usize, kind: EventKind) -> TimelineEvent {
        TimelineEvent {
            step,
            uuid: None,
            timestamp: None,
            duration_ms: None,
            kind,
            failed: false,
            is_branch_point: false,
        }
    }

    fn tool(name: &str, input: serde_json::Value) -> EventKind {
        EventKind::ToolCall {
            tool_use_id: None,
            tool: ToolDescriptor { name: name.to_string(), input, description: None },
            result: None,
        }
    }

    fn render(timeline: &Timeline) -> String {
        let mut buf = Vec::new();
        render_terminal(&mut buf, timeline, "demo", false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_describe_tools() {
        let bash = event(1, tool("Bash", json!({"command": "npm test"})));
        assert_eq!(describe_event(&bash), "npm test");

        let described = event(1, tool("Bash", json!({"command": "npm test", "description": "Run tests"})));
        assert_eq!(describe_event(&described), "Run tests");

        let edit = event(1, tool("Edit", json!({"file_path": "/src/lib.rs"})));
        assert_eq!(describe_event(&edit), "lib.rs");

        let grep = event(1, tool("Grep", json!({"pattern": "fn main"})));
        assert_eq!(describe_event(&grep), "fn main");

        let other = event(1, tool("TodoWrite", json!({"todos": []})));
        assert_eq!(describe_event(&other), r#"{"todos":[]}"#);
    }

    #[test]
    fn test_describe_user_is_sanitized_and_truncated() {
        let long = "x".repeat(100);
        assert_eq!(describe_event(&event(1, EventKind::User { text: long })).len(), 70);

        let nasty = event(1, EventKind::User { text: "\x1b[2Jhi\nthere".to_string() });
        assert_eq!(describe_event(&nasty), "hi there");
    }

    #[test]
    fn test_render_plain_output() {
        let mut failed = event(2, tool("Bash", json!({"command": "npm test"})));
        failed.failed = true;
        failed.duration_ms = Some(3_000);
        let mut branch = event(3, EventKind::User { text: "also fix lint".to_string() });
        branch.is_branch_point = true;

        let timeline = Timeline {
            events: vec![event(1, EventKind::User { text: "fix bug".to_string() }), failed, branch],
            meta: SessionMeta {
                start_time: DateTime::from_timestamp_millis(1_735_689_600_000),
                total_steps: 3,
                duration_ms: Some(65_000),
                ..Default::default()
            },
        };
        let output = render(&timeline);

        assert!(output.contains("Session Replay — demo — 2025-01-01"));
        assert!(output.contains("  1  user       fix bug"));
        assert!(output.contains("  2  Bash       npm test 3s ❌ FAILED"));
        assert!(output.contains("─── ⑂  User intervened ───"));
        assert!(output.contains("3 steps  0 files  1 errors  1m 5s"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_render_with_color_emits_escapes() {
        let timeline = Timeline {
            events: vec![event(1, EventKind::User { text: "hi".to_string() })],
            meta: SessionMeta { total_steps: 1, ..Default::default() },
        };
        let mut buf = Vec::new();
        render_terminal(&mut buf, &timeline, "demo", true).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains('\x1b'));
    }
}
