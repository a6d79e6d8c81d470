//! Plain terminal output for rendered views.

use super::RenderedView;
use std::fmt::Write;

/// Render `view` for a terminal without styling.
///
/// Tokens are listed one per line with a 1-based index and the category
/// padded to 15 columns. Lexemes are written verbatim.
pub fn to_text(view: &RenderedView) -> String {
    let mut out = String::new();
    match view {
        RenderedView::Placeholder { kind } => {
            let _ = writeln!(out, "No {} results.", kind);
        }
        RenderedView::Loading { .. } => out.push_str("Analyzing...\n"),
        RenderedView::Tokens { items } => {
            for token in items {
                let _ = writeln!(out, "{:>4}  {:<15} {}", token.id + 1, token.category, token.lexeme);
            }
            let _ = writeln!(out, "\n{} tokens", items.len());
        }
        RenderedView::EmptyTokens => out.push_str("No tokens found.\n"),
        RenderedView::Logs { status, text } => {
            let _ = writeln!(out, "{}\n", status);
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        RenderedView::Error { message } => {
            let _ = writeln!(out, "{}", message);
        }
    }
    out
}
