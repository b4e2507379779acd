use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::clipboard::copy_to_clipboard;
use crate::discovery::{find_session, latest_session, list_all_sessions};
use crate::models::{SessionInfo, Timeline};
use crate::render::{
    ReplayData, build_fork_prompt, build_html, format_duration_long, list_replays,
    open_in_browser, render_terminal, write_replay,
};
use crate::timeline::load_analyzed;
use crate::utils::{format_path_with_tilde, get_claude_dir, get_replays_dir, git_branch, resolve_project_dir};

#[derive(Parser)]
#[command(name = "session-replay")]
#[command(version)]
#[command(about = "Replay Claude Code sessions as step-by-step timelines", long_about = None)]
pub struct Cli {
    /// Project directory whose sessions to use (default: $CLAUDE_PROJECT_DIR or the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a session in the browser (latest of this project by default)
    Show {
        /// Full or partial session id
        id: Option<String>,
        /// Print to the terminal instead of opening HTML
        #[arg(short, long)]
        terminal: bool,
    },
    /// List sessions across all projects, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Write the HTML replay to stdout or a file
    Export {
        id: Option<String>,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print a prompt for continuing a session from a step
    Fork {
        id: String,
        step: usize,
        /// Also copy the prompt to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// List saved HTML replays
    Replays,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let claude_dir = get_claude_dir()?;
    let cwd = resolve_project_dir(cli.cwd.as_deref())?;
    debug!(claude_dir = %claude_dir.display(), cwd = %cwd.display(), "Resolved directories");

    match cli.command.unwrap_or(Commands::Show { id: None, terminal: false }) {
        Commands::Show { id, terminal } => show(&claude_dir, &cwd, id.as_deref(), terminal),
        Commands::List { limit } => list(&claude_dir, limit),
        Commands::Export { id, output } => export(&claude_dir, &cwd, id.as_deref(), output.as_deref()),
        Commands::Fork { id, step, copy } => fork(&claude_dir, &cwd, &id, step, copy),
        Commands::Replays => replays(),
    }
}

fn resolve_session(claude_dir: &Path, cwd: &Path, id: Option<&str>) -> Result<SessionInfo> {
    match id {
        Some(id) => find_session(claude_dir, id, Some(cwd)).with_context(|| {
            format!("No session found (id: {}).\nRun \"session-replay list\" to see available sessions.", id)
        }),
        None => latest_session(claude_dir, cwd).with_context(|| {
            format!(
                "No session found for {}.\nRun \"session-replay list\" to see available sessions.",
                format_path_with_tilde(cwd)
            )
        }),
    }
}

fn load(session: &SessionInfo) -> Result<Timeline> {
    load_analyzed(&session.path)
        .with_context(|| format!("Failed to replay session {}", session.short_id()))
}

fn branch_of(timeline: &Timeline) -> String {
    git_branch(timeline.meta.cwd.as_deref())
}

fn print_terminal(timeline: &Timeline, project: &str) -> Result<()> {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    render_terminal(&mut out, timeline, project, color).context("Failed to write replay")?;
    out.flush()?;
    Ok(())
}

fn show(claude_dir: &Path, cwd: &Path, id: Option<&str>, terminal: bool) -> Result<()> {
    let session = resolve_session(claude_dir, cwd, id)?;
    eprintln!("Loading session {}…", session.short_id());
    let timeline = load(&session)?;

    if terminal {
        return print_terminal(&timeline, &session.project);
    }

    let branch = branch_of(&timeline);
    let path = write_replay(&get_replays_dir()?, &ReplayData::new(&timeline, &session.project, &branch))?;
    eprintln!("Replay saved: {}", format_path_with_tilde(&path));

    if !open_in_browser(&path) {
        eprintln!("Could not open browser. Use --terminal flag or open:\n  {}", path.display());
        print_terminal(&timeline, &session.project)?;
    }
    Ok(())
}

fn list(claude_dir: &Path, limit: usize) -> Result<()> {
    let sessions = list_all_sessions(claude_dir)?;
    if sessions.is_empty() {
        println!("No sessions found in {}", format_path_with_tilde(&claude_dir.join("projects")));
        return Ok(());
    }

    println!("\nAvailable sessions:\n");
    for session in sessions.iter().take(limit) {
        println!("  {}…  {}  {}", session.short_id(), session.date(), session.project);
    }
    if sessions.len() > limit {
        println!("\n  ({} more, use --limit to see them)", sessions.len() - limit);
    }
    println!("\n  Use: session-replay show <id>");
    Ok(())
}

fn export(claude_dir: &Path, cwd: &Path, id: Option<&str>, output: Option<&Path>) -> Result<()> {
    let session = resolve_session(claude_dir, cwd, id)?;
    let timeline = load(&session)?;
    let branch = branch_of(&timeline);
    let html = build_html(&ReplayData::new(&timeline, &session.project, &branch))?;

    match output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} steps to {}", timeline.meta.total_steps, path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(html.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

fn fork(claude_dir: &Path, cwd: &Path, id: &str, step: usize, copy: bool) -> Result<()> {
    if step == 0 {
        bail!("Steps are numbered from 1");
    }

    let session = resolve_session(claude_dir, cwd, Some(id))?;
    let timeline = load(&session)?;
    let prompt = build_fork_prompt(&timeline, &session.project, &branch_of(&timeline), step);
    print!("{}", prompt);

    if copy {
        match copy_to_clipboard(&prompt) {
            Ok(()) => eprintln!("Fork prompt copied to clipboard"),
            Err(e) => eprintln!("Warning: {:#}", e),
        }
    }
    Ok(())
}

fn replays() -> Result<()> {
    let dir = get_replays_dir()?;
    let saved = list_replays(&dir)?;
    if saved.is_empty() {
        println!("No replays in {}", format_path_with_tilde(&dir));
        return Ok(());
    }

    println!("\nSaved replays in {}:\n", format_path_with_tilde(&dir));
    for replay in &saved {
        let name = replay.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let Some(meta) = &replay.meta else {
            println!("  {}  (no replay data)", name);
            continue;
        };

        let id = meta.session_id.as_deref().unwrap_or("?");
        let short: String = id.chars().take(8).collect();
        println!(
            "  {}…  {}  {}  [{}]  {} steps  {} errors  {}",
            short,
            meta.date.as_deref().unwrap_or("?"),
            meta.project.as_deref().unwrap_or("?"),
            meta.branch.as_deref().unwrap_or("unknown"),
            meta.total_steps.unwrap_or(0),
            meta.error_count.unwrap_or(0),
            format_duration_long(meta.duration_ms),
        );
    }
    Ok(())
}
