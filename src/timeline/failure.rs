//! Heuristic failure classification for tool results.
//!
//! Each heuristic is a named [`FailureSignal`]. A [`FailurePolicy`] is an
//! ordered set of signals: reconstruction applies the conservative
//! [`FailurePolicy::emission`] set, enrichment the full
//! [`FailurePolicy::enrichment`] set. Both are best-effort guesses from text,
//! not ground truth: a real error whose stderr also mentions "warning" slips
//! past `UnexpectedStderr`, and anything printing "failed" trips
//! `StderrErrorKeyword`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ToolResult;

/// Case-sensitive substrings that mark stderr as a warning rather than an error
pub const BENIGN_STDERR_MARKERS: &[&str] = &["warning", "Warning", "npm warn"];

/// Matched against lower-cased stdout + stderr
static EXIT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"exit code [1-9]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureSignal {
    /// The user or the harness interrupted the tool
    Interrupted,
    /// Non-blank stderr without any benign marker
    UnexpectedStderr,
    /// Output mentions a non-zero exit code
    NonZeroExitCode,
    /// stderr contains "error:" or "failed", ignoring case
    StderrErrorKeyword,
}

impl FailureSignal {
    pub fn matches(self, result: &ToolResult) -> bool {
        match self {
            FailureSignal::Interrupted => result.interrupted,
            FailureSignal::UnexpectedStderr => {
                !result.stderr.trim().is_empty()
                    && !BENIGN_STDERR_MARKERS.iter().any(|marker| result.stderr.contains(marker))
            }
            FailureSignal::NonZeroExitCode => {
                let combined = format!("{}\n{}", result.stdout, result.stderr).to_lowercase();
                EXIT_CODE_REGEX.is_match(&combined)
            }
            FailureSignal::StderrErrorKeyword => {
                let stderr = result.stderr.to_lowercase();
                stderr.contains("error:") || stderr.contains("failed")
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FailureSignal::Interrupted => "interrupted",
            FailureSignal::UnexpectedStderr => "unexpected-stderr",
            FailureSignal::NonZeroExitCode => "non-zero-exit-code",
            FailureSignal::StderrErrorKeyword => "stderr-error-keyword",
        }
    }
}

impl fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    signals: &'static [FailureSignal],
}

impl FailurePolicy {
    /// Applied while the timeline is built
    pub const fn emission() -> Self {
        Self { signals: &[FailureSignal::Interrupted, FailureSignal::UnexpectedStderr] }
    }

    /// Applied by the analyzer; a superset of [`FailurePolicy::emission`]
    pub const fn enrichment() -> Self {
        Self {
            signals: &[
                FailureSignal::Interrupted,
                FailureSignal::UnexpectedStderr,
                FailureSignal::NonZeroExitCode,
                FailureSignal::StderrErrorKeyword,
            ],
        }
    }

    pub fn signals(&self) -> &'static [FailureSignal] {
        self.signals
    }

    /// First signal, in policy order, that fires for `result`
    pub fn first_match(&self, result: &ToolResult) -> Option<FailureSignal> {
        self.signals.iter().copied().find(|signal| signal.matches(result))
    }

    pub fn is_failure(&self, result: &ToolResult) -> bool {
        self.first_match(result).is_some()
    }
}
