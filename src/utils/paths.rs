use std::borrow::Cow;
use std::env;
use std::path::Path;

/// Claude's project directory name for a working directory
///
/// Every character that is not ASCII alphanumeric or `-` becomes `-`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use session_replay::project_slug;
///
/// assert_eq!(project_slug(Path::new("/Users/foo/my.app")), "-Users-foo-my-app");
/// ```
pub fn project_slug(cwd: &Path) -> String {
    cwd.to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Display name for a project given its working directory (the basename)
pub fn project_name_from_cwd(cwd: &Path) -> String {
    cwd.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cwd.to_string_lossy().into_owned())
}

/// Last `segments` dash-separated parts of a slug, joined by `/`
///
/// Slugs are lossy, so this is a best-effort label, not a path.
///
/// # Examples
///
/// ```
/// use session_replay::utils::paths::project_label_from_slug;
///
/// assert_eq!(project_label_from_slug("-Users-alice-code-api", 2), "code/api");
/// assert_eq!(project_label_from_slug("-Users-alice-code-api", 1), "api");
/// ```
pub fn project_label_from_slug(slug: &str, segments: usize) -> String {
    let parts: Vec<&str> = slug.trim_start_matches('-').split('-').collect();
    let start = parts.len().saturating_sub(segments);
    parts[start..].join("/")
}

/// Last path component, for compact one-line summaries
pub fn file_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use session_replay::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/.session-replays");
/// // Returns "~/.session-replays" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref()).filter(|h| !h.is_empty());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && let Some(rest) = path_str.strip_prefix(home)
        && (rest.is_empty() || rest.starts_with('/'))
    {
        return format!("~{}", rest);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
