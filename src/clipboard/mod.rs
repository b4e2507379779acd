//! Putting fork prompts on the system clipboard.

use anyhow::{Context, Result, bail};
use arboard::Clipboard;
use tracing::debug;

/// Fork prompts are short markdown; anything past this is a bug upstream
const MAX_PROMPT_BYTES: usize = 1024 * 1024;

/// Destination for copied text (swapped for a recorder in tests)
trait ClipboardSink {
    fn put(&mut self, text: &str) -> Result<()>;
}

struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn open() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to access the system clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardSink for SystemClipboard {
    fn put(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")
    }
}

fn check_prompt(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Refusing to copy an empty prompt to the clipboard");
    }
    if text.len() > MAX_PROMPT_BYTES {
        bail!("Prompt too large for clipboard ({} bytes, max {})", text.len(), MAX_PROMPT_BYTES);
    }
    Ok(())
}

fn copy_into(text: &str, sink: &mut dyn ClipboardSink) -> Result<()> {
    check_prompt(text)?;
    sink.put(text)?;
    debug!(bytes = text.len(), "Copied prompt to clipboard");
    Ok(())
}

/// Copy a prompt to the system clipboard
///
/// # Errors
/// Fails on an empty or oversized prompt, or when no clipboard is available
/// (headless sessions, missing display server).
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    check_prompt(text)?;
    let mut clipboard = SystemClipboard::open()?;
    copy_into(text, &mut clipboard)
}
