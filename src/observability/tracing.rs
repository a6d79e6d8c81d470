//! Structured logging setup.
//!
//! Events go to stderr through `tracing-subscriber`, filtered by
//! `SOURCELAB_LOG` (or `RUST_LOG`). While the terminal UI owns the screen
//! the writer swallows output so log lines cannot corrupt the display.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "SOURCELAB_LOG";

static TUI_ACTIVE: AtomicBool = AtomicBool::new(false);
static TRACING_INIT: Once = Once::new();

/// Mark whether the terminal UI currently owns the screen.
pub fn set_tui_active(active: bool) {
    TUI_ACTIVE.store(active, Ordering::SeqCst);
}

pub fn is_tui_active() -> bool {
    TUI_ACTIVE.load(Ordering::SeqCst)
}

/// Default level for a `-v` count when no filter is set in the environment.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Install the global subscriber.
///
/// Repeated calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbosity))
            .with_target(false)
            .with_writer(TuiAwareWriter::default)
            .try_init();
    });
}

/// stderr, muted while the TUI is active.
#[derive(Debug, Default)]
pub struct TuiAwareWriter;

impl Write for TuiAwareWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if is_tui_active() {
            return Ok(buf.len());
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing(0);
        init_tracing(2);
    }

    #[test]
    fn muted_writer_reports_full_write() {
        set_tui_active(true);
        let written = TuiAwareWriter.write(b"hidden").unwrap();
        set_tui_active(false);
        assert_eq!(written, 6);
    }
}
