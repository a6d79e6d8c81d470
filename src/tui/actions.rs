//! Imperative shell for workbench effects.
//!
//! The workbench decides *what* should happen; this module touches the
//! clipboard, the file system and the async runtime, then reports back with
//! the follow-up command.

use crate::export::write_report;
use crate::workbench::{Command, Effect};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Copy text to the system clipboard.
///
/// Never panics: an unavailable clipboard (SSH sessions, headless
/// environments) comes back as an error message for the modal.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => clipboard
            .set_text(text)
            .map_err(|e| format!("Clipboard error: {}", e)),
        Err(e) => Err(format!("Clipboard not available: {}", e)),
    }
}

/// Carry out one effect.
///
/// Spawned tasks post their command on `completions` when done; immediate
/// effects return their follow-up command directly.
pub fn execute_effect(
    effect: Effect,
    runtime: &Handle,
    completions: &UnboundedSender<Command>,
) -> Option<Command> {
    match effect {
        Effect::Spawn(task) => {
            let completions = completions.clone();
            runtime.spawn(async move {
                let command = task.await;
                if completions.send(command).is_err() {
                    debug!("Workbench closed before task completed");
                }
            });
            None
        }
        Effect::CopyToClipboard(text) => Some(Command::Copied(copy_to_clipboard(&text))),
        Effect::SaveReport {
            dir,
            filename,
            contents,
        } => Some(Command::Saved(write_report(&dir, &filename, &contents))),
    }
}
