//! Markdown briefing for resuming a session from an earlier step

use crate::models::{EventKind, Timeline, TimelineEvent};

const RECENT_COMMANDS: usize = 5;

fn step_description(event: &TimelineEvent) -> String {
    match &event.kind {
        EventKind::ToolCall { tool, .. } => {
            let target = tool
                .input_str("file_path")
                .or_else(|| tool.input_str("command"))
                .unwrap_or_default();
            format!("{}: {}", tool.name, target)
        }
        EventKind::User { text } => text.clone(),
        EventKind::Thinking { .. } => "(thinking)".to_string(),
    }
}

/// Build the fork prompt covering steps `1..=step`
pub fn build_fork_prompt(timeline: &Timeline, project: &str, branch: &str, step: usize) -> String {
    let prior: Vec<&TimelineEvent> = timeline.events.iter().filter(|e| e.step <= step).collect();

    let mut files: Vec<&str> = Vec::new();
    for path in prior.iter().filter_map(|e| e.tool()).filter_map(|t| t.edited_path()) {
        if !files.contains(&path) {
            files.push(path);
        }
    }

    let commands: Vec<&str> = prior
        .iter()
        .filter_map(|e| e.tool())
        .filter(|t| t.name == "Bash")
        .map(|t| t.input_str("command").unwrap_or_default())
        .collect();
    let recent = &commands[commands.len().saturating_sub(RECENT_COMMANDS)..];

    let last_user = prior.iter().rev().find_map(|e| e.user_text()).unwrap_or_default();
    let at_step = prior.last().map(|e| step_description(e)).unwrap_or_default();

    let mut out = format!("# Session Fork — {} from step {}\n\n", project, step);
    out.push_str(&format!("## What happened before this point (steps 1–{})\n\n", step));

    out.push_str("**Files changed:**\n");
    if files.is_empty() {
        out.push_str("- (none)\n");
    }
    for file in &files {
        out.push_str(&format!("- {}\n", file));
    }

    out.push_str(&format!("\n**Last {} commands run:**\n", recent.len()));
    if recent.is_empty() {
        out.push_str("  (none)\n");
    }
    for command in recent {
        out.push_str(&format!("  $ {}\n", command));
    }

    out.push_str(&format!("\n**Last user message:**\n> {}\n\n", last_user));
    out.push_str(&format!("## At step {}\nThe agent was executing: {}\n\n", step, at_step));

    out.push_str("## Continue from here\n");
    out.push_str(&format!(
        "Pick up this session from step {}. The files listed above have been modified.\n",
        step
    ));
    out.push_str(&format!("Branch: {}\n", branch));
    out.push_str(&format!(
        "Session ID: {}\n",
        timeline.meta.session_id.as_deref().unwrap_or("unknown")
    ));

    out
}
