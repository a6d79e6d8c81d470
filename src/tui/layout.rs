//! Frame layout and drawing.
//!
//! Drawing is a function of [`Screen`], a borrowed snapshot of everything
//! visible, so it can be exercised against ratatui's `TestBackend`.

use super::keymap::Focus;
use super::theme::Theme;
use crate::core::PipelineKind;
use crate::render::RenderedView;
use crate::workbench::Workbench;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Everything needed to draw one frame.
pub struct Screen<'a> {
    pub workbench: &'a Workbench,
    pub focus: Focus,
    /// Contents of the open file path prompt.
    pub prompt: Option<&'a str>,
    pub theme: &'a Theme,
}

/// Header, main panels, footer
pub fn calculate_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Pipeline tabs
            Constraint::Min(5),    // Editor and results
            Constraint::Length(1), // Key hints
        ])
        .split(area)
        .to_vec()
}

/// Side-by-side panels on wide terminals, stacked on narrow ones.
pub fn split_panels(area: Rect) -> Vec<Rect> {
    let direction = if area.width >= 80 {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
        .to_vec()
}

pub fn draw(frame: &mut Frame, screen: &Screen) {
    let chunks = calculate_layout(frame.area());
    let panels = split_panels(chunks[1]);

    draw_tabs(frame, screen, chunks[0]);
    draw_editor(frame, screen, panels[0]);
    draw_results(frame, screen, panels[1]);
    draw_footer(frame, screen, chunks[2]);

    draw_toasts(frame, screen);
    if let Some(prompt) = screen.prompt {
        draw_prompt(frame, screen, prompt);
    }
    if let Some(confirmation) = screen.workbench.pending_confirmation() {
        draw_dialog(
            frame,
            "Confirm",
            confirmation.prompt(),
            screen.theme.active_style(),
        );
    }
    if let Some(message) = screen.workbench.notifications().modal() {
        draw_dialog(frame, "Error", message, screen.theme.error_style());
    }
}

fn draw_tabs(frame: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let mut spans = vec![Span::styled(" sourcelab ", theme.active_style()), Span::raw(" ")];
    for kind in [PipelineKind::Lexical, PipelineKind::Syntactic] {
        let style = if kind == screen.workbench.active() {
            theme.selected_style()
        } else {
            theme.muted_style()
        };
        let busy = if screen.workbench.is_busy(kind) { " …" } else { "" };
        spans.push(Span::styled(format!(" {}{} ", kind.title(), busy), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_editor(frame: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let workbench = screen.workbench;
    let focused = screen.focus == Focus::Editor;

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(focused))
        .title(" Code ")
        .title_bottom(Line::styled(
            format!(" {} ", workbench.stats()),
            theme.muted_style(),
        ));
    if let Some(file) = workbench.loaded_file() {
        block = block.title(
            Line::styled(
                format!(" {} ({}) ", file.name, file.display_size()),
                theme.muted_style(),
            )
            .right_aligned(),
        );
    }

    let inner = block.inner(area);
    let (line, _) = workbench.cursor_position();
    let scroll = line.saturating_sub(inner.height.saturating_sub(1) as usize);
    let paragraph = Paragraph::new(workbench.text())
        .block(block)
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);

    let blocks_input = screen.prompt.is_some()
        || workbench.pending_confirmation().is_some()
        || workbench.notifications().has_modal();
    if focused && !blocks_input {
        let (x, y) = cursor_cell(workbench, inner, scroll);
        frame.set_cursor_position((x, y));
    }
}

/// Terminal cell of the text cursor inside the editor area.
fn cursor_cell(workbench: &Workbench, inner: Rect, scroll: usize) -> (u16, u16) {
    let (line, col) = workbench.cursor_position();
    let prefix: String = workbench
        .text()
        .split('\n')
        .nth(line)
        .unwrap_or("")
        .chars()
        .take(col)
        .collect();
    let x = inner.x + (prefix.width() as u16).min(inner.width.saturating_sub(1));
    let y = inner.y + (line - scroll) as u16;
    (x, y)
}

fn draw_results(frame: &mut Frame, screen: &Screen, area: Rect) {
    let theme = screen.theme;
    let workbench = screen.workbench;
    let view = workbench.active_view();
    let focused = screen.focus == Focus::Results;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(focused))
        .title(format!(" {} ", workbench.active().title()))
        .title(Line::styled(format!(" {} ", view.summary()), theme.muted_style()).right_aligned());

    match &view {
        RenderedView::Tokens { items } => {
            let stats = statistics_line(workbench);
            let block = match stats {
                Some(line) => block.title_bottom(line),
                None => block,
            };
            let rows: Vec<ListItem> = items
                .iter()
                .map(|token| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:>4} ", token.id + 1), theme.muted_style()),
                        Span::styled(
                            format!("{:<15} ", token.category),
                            theme.class_style(token.class),
                        ),
                        Span::raw(token.lexeme.clone()),
                    ]))
                })
                .collect();
            let list = List::new(rows)
                .block(block)
                .highlight_style(theme.selected_style());
            let mut state = ListState::default().with_selected(workbench.selected_token());
            frame.render_stateful_widget(list, area, &mut state);
        }
        RenderedView::Logs { status, text } => {
            let mut lines = vec![
                Line::styled(status.to_string(), theme.status_style(*status)),
                Line::raw(""),
            ];
            lines.extend(text.lines().map(|l| Line::raw(l.to_string())));
            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        other => {
            let (message, style) = placeholder_text(other, theme);
            let paragraph = Paragraph::new(message)
                .style(style)
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }
}

fn placeholder_text(view: &RenderedView, theme: &Theme) -> (String, Style) {
    match view {
        RenderedView::Loading { .. } => ("Analyzing...".to_string(), theme.active_style()),
        RenderedView::EmptyTokens => (
            "No tokens found. The analyzed code contains no valid tokens.".to_string(),
            theme.muted_style(),
        ),
        RenderedView::Error { message } => (message.clone(), theme.error_style()),
        _ => (
            "No analysis yet. Type some code and press Ctrl+R to analyze.".to_string(),
            theme.muted_style(),
        ),
    }
}

fn statistics_line(workbench: &Workbench) -> Option<Line<'static>> {
    let stats = workbench.token_statistics();
    if stats.is_empty() {
        return None;
    }
    let text = stats
        .iter()
        .map(|(category, count)| format!("{}: {}", category, count))
        .collect::<Vec<_>>()
        .join("  ");
    Some(Line::raw(format!(" {} ", text)))
}

fn footer_hints(focus: Focus, can_export: bool) -> String {
    let export = if can_export { "^S export  " } else { "" };
    match focus {
        Focus::Editor => format!(
            "^R analyze  ^L clear  ^E example  ^O open  ^D remove file  {}F2 pipeline  S-Tab results  ^Q quit",
            export
        ),
        Focus::Results => format!(
            "↑/↓ select  Enter/y copy  Esc editor  {}F2 pipeline  ^Q quit",
            export
        ),
    }
}

fn draw_footer(frame: &mut Frame, screen: &Screen, area: Rect) {
    let hints = footer_hints(screen.focus, screen.workbench.can_export());
    frame.render_widget(
        Paragraph::new(Span::styled(hints, screen.theme.muted_style())),
        area,
    );
}

fn draw_toasts(frame: &mut Frame, screen: &Screen) {
    let area = frame.area();
    for (row, toast) in screen.workbench.notifications().toasts().iter().enumerate() {
        let width = (toast.message.width() as u16 + 4).min(area.width);
        let toast_area = Rect {
            x: area.width.saturating_sub(width),
            y: area.y + 1 + row as u16,
            width,
            height: 1,
        };
        if toast_area.y >= area.bottom() {
            break;
        }
        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" ✓ {}", toast.message),
                screen.theme.toast_style(),
            )),
            toast_area,
        );
    }
}

fn draw_prompt(frame: &mut Frame, screen: &Screen, prompt: &str) {
    let area = frame.area();
    let prompt_area = centered_rect(area.width.saturating_sub(8).min(70), 3, area);
    frame.render_widget(Clear, prompt_area);
    let widget = Paragraph::new(prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(screen.theme.focused_border())
            .title(" Open file (.txt or .docx) - Enter to upload, Esc to cancel "),
    );
    frame.render_widget(widget, prompt_area);
    let x = prompt_area.x + 1 + (prompt.width() as u16).min(prompt_area.width.saturating_sub(3));
    frame.set_cursor_position((x, prompt_area.y + 1));
}

fn draw_dialog(frame: &mut Frame, title: &str, message: &str, style: Style) {
    let area = frame.area();
    let width = area.width.saturating_sub(8).min(60);
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let text_lines = message.width().div_ceil(inner_width).max(1) as u16;
    let dialog = centered_rect(width, text_lines + 4, area);

    frame.render_widget(Clear, dialog);
    let body = Text::from(vec![
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("Esc to dismiss", Style::default().add_modifier(ratatui::style::Modifier::DIM)),
    ]);
    let widget = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(Span::styled(format!(" {} ", title), style)),
        );
    frame.render_widget(widget, dialog);
}

/// A `width` x `height` rectangle centered in `area`, clamped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkbenchConfig;
    use crate::core::Token;
    use crate::testkit::MockBackend;
    use crate::workbench::{Command, Effect};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn workbench() -> Workbench {
        Workbench::new(Arc::new(MockBackend::new()), &WorkbenchConfig::default())
    }

    fn render_to_string(screen: &Screen, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, screen)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(50, 50, area), area);
    }

    #[test]
    fn test_panels_stack_on_narrow_terminals() {
        let wide = split_panels(Rect::new(0, 0, 120, 30));
        assert_eq!(wide[0].y, wide[1].y);
        let narrow = split_panels(Rect::new(0, 0, 60, 30));
        assert_eq!(narrow[0].x, narrow[1].x);
    }

    #[test]
    fn test_draws_text_and_counters() {
        let mut wb = workbench();
        wb.handle(Command::SetText("program teste;".into()));
        let theme = Theme::default();
        let screen = Screen {
            workbench: &wb,
            focus: Focus::Editor,
            prompt: None,
            theme: &theme,
        };
        let output = render_to_string(&screen, 120, 20);
        assert!(output.contains("program teste;"));
        assert!(output.contains("Lines: 1  Characters: 14"));
        assert!(output.contains("Lexical analysis"));
    }

    #[test]
    fn test_modal_is_drawn() {
        let mut wb = workbench();
        wb.handle(Command::Submit);
        let theme = Theme::default();
        let screen = Screen {
            workbench: &wb,
            focus: Focus::Editor,
            prompt: None,
            theme: &theme,
        };
        let output = render_to_string(&screen, 100, 24);
        assert!(output.contains("Error"));
        assert!(output.contains("Please enter some code"));
    }

    #[test]
    fn test_export_hint_follows_availability() {
        assert!(footer_hints(Focus::Editor, true).contains("^S export"));
        assert!(!footer_hints(Focus::Editor, false).contains("^S export"));
        assert!(!footer_hints(Focus::Results, false).contains("^S export"));
    }

    #[tokio::test]
    async fn test_footer_hides_export_for_empty_tokens() {
        let backends = [
            (MockBackend::new().with_tokens(vec![Token::new("ID", "x")]), true),
            (MockBackend::new().with_tokens(vec![]), false),
        ];
        for (backend, shows_export) in backends {
            let mut wb = Workbench::new(Arc::new(backend), &WorkbenchConfig::default());
            wb.handle(Command::SetText("x".into()));
            for effect in wb.handle(Command::Submit) {
                if let Effect::Spawn(task) = effect {
                    let done = task.await;
                    wb.handle(done);
                }
            }
            let theme = Theme::default();
            let screen = Screen {
                workbench: &wb,
                focus: Focus::Results,
                prompt: None,
                theme: &theme,
            };
            let output = render_to_string(&screen, 120, 20);
            assert_eq!(output.contains("^S export"), shows_export);
        }
    }
}
