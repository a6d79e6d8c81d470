//! Markup fragment output for rendered views.

use super::{RenderedView, StatusLabel};
use html_escape::encode_text;
use std::fmt::Write;

/// Render `view` as an HTML fragment.
///
/// Lexemes go out in their escaped form, so markup inside source text is
/// shown literally and never interpreted.
pub fn to_html(view: &RenderedView) -> String {
    let mut out = String::new();
    match view {
        RenderedView::Placeholder { kind } => {
            let _ = writeln!(
                out,
                "<p class=\"placeholder\">{} results will appear here</p>",
                kind.title()
            );
        }
        RenderedView::Loading { .. } => {
            out.push_str("<div class=\"loading\">Analyzing...</div>\n");
        }
        RenderedView::Tokens { items } => {
            out.push_str("<div class=\"token-list\">\n");
            for token in items {
                let _ = writeln!(
                    out,
                    "  <div class=\"token-item {}\" data-id=\"{}\"><span class=\"token-category\">{}</span> <span class=\"token-lexeme\">{}</span></div>",
                    token.class.as_str(),
                    token.id,
                    encode_text(&token.category),
                    token.escaped
                );
            }
            out.push_str("</div>\n");
        }
        RenderedView::EmptyTokens => {
            out.push_str("<p class=\"empty\">No tokens found</p>\n");
        }
        RenderedView::Logs { status, text } => {
            let class = match status {
                StatusLabel::Valid => "valid",
                StatusLabel::Invalid => "invalid",
            };
            let _ = writeln!(out, "<div class=\"status {}\">{}</div>", class, status);
            let _ = writeln!(out, "<pre class=\"logs\">{}</pre>", encode_text(text));
        }
        RenderedView::Error { message } => {
            let _ = writeln!(out, "<div class=\"error\">{}</div>", encode_text(message));
        }
    }
    out
}
