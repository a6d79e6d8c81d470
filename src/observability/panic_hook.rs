//! Custom panic hook for structured crash reports.
//!
//! The hook leaves TUI mode (alternate screen, raw mode) before printing so
//! the report is visible, then prints the panic message, its location, the
//! current tracing span and a backtrace hint.

use super::tracing::set_tui_active;
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE: &str =
    "════════════════════════════════════════════════════════════════════════════════";

/// Install the custom panic hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    exit_tui_mode();

    eprintln!();
    print_header();
    print_panic_details(info);
    print_context_section();
    print_backtrace_section();
}

fn exit_tui_mode() {
    // Mark TUI as inactive so subsequent logging works
    set_tui_active(false);

    // Ignore errors - we're already panicking
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(
        std::io::stderr(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}

fn print_header() {
    let platform = std::env::consts::OS;
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    eprintln!("╔══════════════════════════════════════════════════════════════════════════════╗");
    eprintln!("║                          SOURCELAB CRASH REPORT                              ║");
    eprintln!("╠══════════════════════════════════════════════════════════════════════════════╣");
    eprintln!("║  Version: {:<67} ║", VERSION);
    eprintln!("║  Platform: {:<66} ║", platform);
    eprintln!("║  Time: {:<70} ║", timestamp);
    eprintln!("╠══════════════════════════════════════════════════════════════════════════════╣");
}

fn print_panic_details(info: &PanicHookInfo<'_>) {
    let message = extract_panic_message(info);
    eprintln!("║  PANIC: {:<68} ║", truncate(&message, 68));

    if let Some(location) = info.location() {
        let loc_str = format!(
            "{}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
        eprintln!("║  Location: {:<66} ║", truncate(&loc_str, 66));
    }
}

fn print_context_section() {
    let current_span = Span::current();
    if let Some(metadata) = current_span.metadata() {
        eprintln!("╠══════════════════════════════════════════════════════════════════════════════╣");
        eprintln!("║  Span: {:<70} ║", truncate(metadata.name(), 70));
    }
}

fn print_backtrace_section() {
    eprintln!("╠══════════════════════════════════════════════════════════════════════════════╣");

    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("║  STACK TRACE:                                                                ║");
        eprintln!("╚══════════════════════════════════════════════════════════════════════════════╝");
        eprintln!();
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("║  Run with RUST_BACKTRACE=1 for stack trace                                   ║");
        eprintln!("╚══════════════════════════════════════════════════════════════════════════════╝");
    }
    eprintln!("{}", RULE);
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Shorten to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("this is a long message", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("análise léxica completa", 8), "análi...");
    }
}
