//! Self-contained HTML replays and the metadata embedded in them.
//!
//! Every artifact carries its complete [`ReplayData`] on a single line
//! starting with [`DATA_MARKER`], so other tools can recover session facts
//! by finding the marker and parsing to the end of that line.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{SessionMeta, Summary, Timeline, TimelineEvent};
use crate::timeline::summarize;

pub const DATA_MARKER: &str = "const DATA = ";

const TEMPLATE: &str = include_str!("template.html");
const DATA_SLOT: &str = "{{DATA}}";
const TITLE_SLOT: &str = "{{TITLE}}";

static SCRIPT_CLOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").unwrap());

/// Everything the viewer needs: events, extended meta and summary
#[derive(Debug, Serialize)]
pub struct ReplayData<'a> {
    pub events: &'a [TimelineEvent],
    pub meta: ReplayMeta<'a>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMeta<'a> {
    #[serde(flatten)]
    pub session: &'a SessionMeta,
    pub project: String,
    pub branch: String,
    /// `YYYY-MM-DD` of the session start, or today
    pub date: String,
}

impl<'a> ReplayData<'a> {
    pub fn new(timeline: &'a Timeline, project: &str, branch: &str) -> Self {
        let date = timeline.meta.start_time.unwrap_or_else(Utc::now).format("%Y-%m-%d").to_string();
        Self {
            events: &timeline.events,
            summary: summarize(&timeline.events, &timeline.meta),
            meta: ReplayMeta {
                session: &timeline.meta,
                project: project.to_string(),
                branch: branch.to_string(),
                date,
            },
        }
    }
}

/// Serialize for embedding inside a `<script>` element
///
/// `</script` and `<!--` can only occur inside JSON strings, so escaping
/// them keeps the line valid for both the browser and a JSON parser.
fn embeddable_json(data: &ReplayData<'_>) -> Result<String> {
    let json = serde_json::to_string(data).context("Failed to serialize replay data")?;
    let json = SCRIPT_CLOSE_REGEX.replace_all(&json, r"<\/$1");
    Ok(json.replace("<!--", r"<\u0021--"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the complete HTML page
pub fn build_html(data: &ReplayData<'_>) -> Result<String> {
    let json = embeddable_json(data)?;
    let (head, tail) =
        TEMPLATE.split_once(DATA_SLOT).context("Replay template has no data slot")?;
    let head = head.replacen(TITLE_SLOT, &escape_html(&data.meta.project), 1);

    let mut html = String::with_capacity(head.len() + json.len() + tail.len());
    html.push_str(&head);
    html.push_str(&json);
    html.push_str(tail);
    Ok(html)
}

/// Write the replay into `dir` as `<sessionId>.html` and return its path
pub fn write_replay(dir: &Path, data: &ReplayData<'_>) -> Result<PathBuf> {
    let html = build_html(data)?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create replay directory {}", dir.display()))?;

    let name = replay_file_stem(data.meta.session.session_id.as_deref());
    let path = dir.join(format!("{}.html", name));
    fs::write(&path, html).with_context(|| format!("Failed to write replay {}", path.display()))?;

    info!(path = %path.display(), steps = data.events.len(), "Replay written");
    Ok(path)
}

/// The session id if it is a single plain file name, otherwise `session`
fn replay_file_stem(session_id: Option<&str>) -> &str {
    const FALLBACK: &str = "session";

    let Some(id) = session_id else {
        return FALLBACK;
    };
    let mut components = Path::new(id).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single_normal && !id.contains(['/', '\\', '\0']) {
        id
    } else {
        warn!(session_id = id, "Session id is not a plain file name, using fallback");
        FALLBACK
    }
}

/// Open `path` with the platform's default handler; false if that failed
pub fn open_in_browser(path: &Path) -> bool {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    let status = command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => true,
        Ok(status) => {
            debug!(%status, "Browser opener exited unsuccessfully");
            false
        }
        Err(e) => {
            debug!(error = %e, "Failed to launch browser opener");
            false
        }
    }
}

/// Session facts recovered from a saved replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactMeta {
    pub project: Option<String>,
    pub branch: Option<String>,
    pub date: Option<String>,
    pub session_id: Option<String>,
    pub total_steps: Option<u64>,
    pub error_count: Option<u64>,
    pub duration_ms: Option<i64>,
}

#[derive(Deserialize)]
struct EmbeddedData {
    #[serde(default)]
    meta: Value,
    #[serde(default)]
    summary: Value,
}

/// Pull [`ArtifactMeta`] out of replay HTML; `None` without a parseable data line
pub fn extract_artifact_meta(html: &str) -> Option<ArtifactMeta> {
    let start = html.find(DATA_MARKER)? + DATA_MARKER.len();
    let line = html[start..].lines().next()?;
    let json = line.trim_end().trim_end_matches(';');

    let data: EmbeddedData = serde_json::from_str(json).ok()?;
    let text = |key: &str| data.meta.get(key).and_then(Value::as_str).map(str::to_string);
    let number = |from: &Value, key: &str| from.get(key).and_then(Value::as_u64);

    Some(ArtifactMeta {
        project: text("project"),
        branch: text("branch"),
        date: text("date"),
        session_id: text("sessionId"),
        total_steps: number(&data.meta, "totalSteps").or_else(|| number(&data.summary, "totalSteps")),
        // enriched count lives in the summary
        error_count: number(&data.summary, "errorCount").or_else(|| number(&data.meta, "errorCount")),
        duration_ms: data.meta.get("durationMs").and_then(Value::as_i64),
    })
}

/// A replay file on disk with whatever metadata it yielded
#[derive(Debug, Clone)]
pub struct SavedReplay {
    pub path: PathBuf,
    pub meta: Option<ArtifactMeta>,
}

/// Every `*.html` in `dir`, sorted by file name
///
/// A missing directory is an empty list.
pub fn list_replays(dir: &Path) -> Result<Vec<SavedReplay>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read replay directory {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    paths.sort();

    let replays = paths
        .into_iter()
        .map(|path| {
            let meta = match fs::read_to_string(&path) {
                Ok(html) => extract_artifact_meta(&html),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read replay");
                    None
                }
            };
            SavedReplay { path, meta }
        })
        .collect();
    Ok(replays)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{EventKind, ToolDescriptor, ToolResult};

    fn sample_timeline() -> Timeline {
        Timeline {
            events: vec![
                TimelineEvent {
                    step: 1,
                    uuid: Some("u1".to_string()),
                    timestamp: None,
                    duration_ms: Some(1000),
                    kind: EventKind::User { text: "print </script><!-- done".to_string() },
                    failed: false,
                    is_branch_point: false,
                },
                TimelineEvent {
                    step: 2,
                    uuid: Some("a1".to_string()),
                    timestamp: None,
                    duration_ms: None,
                    kind: EventKind::ToolCall {
                        tool_use_id: Some("t1".to_string()),
                        tool: ToolDescriptor {
                            name: "Bash".to_string(),
                            input: json!({"command": "false"}),
                            description: None,
                        },
                        result: Some(ToolResult {
                            stderr: "boom".to_string(),
                            is_error: true,
                            ..Default::default()
                        }),
                    },
                    failed: true,
                    is_branch_point: false,
                },
            ],
            meta: SessionMeta {
                session_id: Some("abc-123".to_string()),
                cwd: Some("/work/app".to_string()),
                start_time: DateTime::from_timestamp_millis(1_735_689_600_000),
                duration_ms: Some(42_000),
                total_steps: 2,
                error_count: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_build_html_embeds_single_data_line() {
        let timeline = sample_timeline();
        let data = ReplayData::new(&timeline, "app", "main");
        let html = build_html(&data).unwrap();

        let lines: Vec<&str> = html.lines().filter(|l| l.contains(DATA_MARKER)).collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].trim_end().ends_with(';'));
        assert!(html.contains("<title>Session Replay — app</title>"));
    }

    #[test]
    fn test_build_html_escapes_script_breakers() {
        let timeline = sample_timeline();
        let html = build_html(&ReplayData::new(&timeline, "app", "main")).unwrap();
        let data_line = html.lines().find(|l| l.contains(DATA_MARKER)).unwrap();

        assert!(!data_line.to_lowercase().contains("</script"));
        assert!(!data_line.contains("<!--"));
        assert!(data_line.contains(r"<\/script>"));
    }

    #[test]
    fn test_escaping_is_case_insensitive() {
        let mut timeline = sample_timeline();
        timeline.events[0].kind = EventKind::User { text: "</SCRIPT> </Script>".to_string() };
        let html = build_html(&ReplayData::new(&timeline, "app", "main")).unwrap();
        let data_line = html.lines().find(|l| l.contains(DATA_MARKER)).unwrap();
        assert!(data_line.contains(r"<\/SCRIPT>"));
        assert!(data_line.contains(r"<\/Script>"));
    }

    #[test]
    fn test_title_is_html_escaped() {
        let timeline = sample_timeline();
        let html = build_html(&ReplayData::new(&timeline, "<b>app</b>", "main")).unwrap();
        assert!(html.contains("<title>Session Replay — &lt;b&gt;app&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_extract_artifact_meta_round_trip() {
        let timeline = sample_timeline();
        let html = build_html(&ReplayData::new(&timeline, "app", "feature/x")).unwrap();
        let meta = extract_artifact_meta(&html).unwrap();

        assert_eq!(meta.project.as_deref(), Some("app"));
        assert_eq!(meta.branch.as_deref(), Some("feature/x"));
        assert_eq!(meta.date.as_deref(), Some("2025-01-01"));
        assert_eq!(meta.session_id.as_deref(), Some("abc-123"));
        assert_eq!(meta.total_steps, Some(2));
        assert_eq!(meta.error_count, Some(1));
        assert_eq!(meta.duration_ms, Some(42_000));
    }

    #[test]
    fn test_escaped_payload_still_parses() {
        let timeline = sample_timeline();
        let html = build_html(&ReplayData::new(&timeline, "app", "main")).unwrap();
        let start = html.find(DATA_MARKER).unwrap() + DATA_MARKER.len();
        let line = html[start..].lines().next().unwrap().trim_end_matches(';');

        let value: Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["events"][0]["text"], "print </script><!-- done");
        assert_eq!(value["events"][1]["type"], "tool_call");
        assert_eq!(value["events"][1]["toolUseId"], "t1");
        assert_eq!(value["summary"]["errorCount"], 1);
    }

    #[test]
    fn test_extract_artifact_meta_rejects_bad_input() {
        assert!(extract_artifact_meta("<html>no data</html>").is_none());
        assert!(extract_artifact_meta("const DATA = {not json};\n").is_none());
    }

    #[test]
    fn test_write_replay_and_list() {
        let dir = TempDir::new().unwrap();
        let timeline = sample_timeline();
        let path = write_replay(dir.path(), &ReplayData::new(&timeline, "app", "main")).unwrap();
        assert_eq!(path, dir.path().join("abc-123.html"));

        fs::write(dir.path().join("broken.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let replays = list_replays(dir.path()).unwrap();
        assert_eq!(replays.len(), 2);
        assert_eq!(replays[0].path, path);
        assert_eq!(replays[0].meta.as_ref().unwrap().project.as_deref(), Some("app"));
        assert!(replays[1].meta.is_none());
    }

    #[test]
    fn test_write_replay_without_session_id() {
        let dir = TempDir::new().unwrap();
        let mut timeline = sample_timeline();
        timeline.meta.session_id = None;
        let path = write_replay(&dir.path().join("nested"), &ReplayData::new(&timeline, "app", "main")).unwrap();
        assert_eq!(path.file_name().unwrap(), "session.html");
    }

    #[test]
    fn test_write_replay_stays_inside_dir() {
        let root = TempDir::new().unwrap();
        let replays = root.path().join("replays");
        let mut timeline = sample_timeline();

        for hostile in ["../escaped", "a/b", "..", ".", "/etc/passwd", "x\0y", ""] {
            timeline.meta.session_id = Some(hostile.to_string());
            let path = write_replay(&replays, &ReplayData::new(&timeline, "app", "main")).unwrap();
            assert_eq!(path, replays.join("session.html"), "id {:?}", hostile);
        }
        assert!(!root.path().join("escaped.html").exists());
    }

    #[test]
    fn test_replay_file_stem_keeps_plain_ids() {
        assert_eq!(replay_file_stem(Some("550e8400-e29b-41d4")), "550e8400-e29b-41d4");
        assert_eq!(replay_file_stem(Some("a..b")), "a..b");
        assert_eq!(replay_file_stem(None), "session");
    }

    #[test]
    fn test_list_replays_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_replays(&dir.path().join("absent")).unwrap().is_empty());
    }
}
