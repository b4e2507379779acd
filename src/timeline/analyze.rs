//! Post-hoc enrichment of a reconstructed timeline.
//!
//! Runs after reconstruction as its own pass. Every update is OR-only
//! (flags go from false to true, never back), so running it twice gives the
//! same flags as running it once.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{SessionMeta, Summary, TimelineEvent};
use crate::timeline::failure::FailurePolicy;

/// Tag branch points and re-tag failures in place
pub fn analyze(events: &mut [TimelineEvent]) {
    tag_branch_points(events);
    retag_failures(events, &FailurePolicy::enrichment());
}

/// A user turn after any tool call is the human redirecting the session
pub fn tag_branch_points(events: &mut [TimelineEvent]) {
    let mut seen_tool_call = false;
    for event in events.iter_mut() {
        if event.is_tool_call() {
            seen_tool_call = true;
        } else if event.is_user() && seen_tool_call {
            event.is_branch_point = true;
        }
    }
}

/// Mark tool calls whose result trips `policy` as failed. Never clears a flag.
pub fn retag_failures(events: &mut [TimelineEvent], policy: &FailurePolicy) {
    for event in events.iter_mut() {
        if event.failed {
            continue;
        }
        if let Some(signal) = event.result().and_then(|result| policy.first_match(result)) {
            debug!(step = event.step, %signal, "Re-tagged tool call as failed");
            event.failed = true;
        }
    }
}

/// Statistics for headers, footers and the replay sidebar
pub fn summarize(events: &[TimelineEvent], meta: &SessionMeta) -> Summary {
    let mut tool_counts: BTreeMap<String, usize> = BTreeMap::new();
    for tool in events.iter().filter_map(|e| e.tool()) {
        *tool_counts.entry(tool.name.clone()).or_default() += 1;
    }

    Summary {
        total_steps: meta.total_steps,
        error_count: events.iter().filter(|e| e.failed).count(),
        branch_points: events.iter().filter(|e| e.is_branch_point).count(),
        files_edited: meta.files_edited.clone(),
        tool_counts,
        duration_ms: meta.duration_ms,
    }
}
