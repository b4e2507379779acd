pub mod environment;
pub mod paths;

pub use environment::{get_claude_dir, get_replays_dir, git_branch, resolve_project_dir};
pub use paths::{
    file_basename, format_path_with_tilde, project_label_from_slug, project_name_from_cwd,
    project_slug,
};
