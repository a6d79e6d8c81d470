//! Pure action determination for keyboard handling.
//!
//! `determine_action` maps a key plus the minimal interaction context to a
//! [`KeyAction`]; the event loop in [`super::WorkbenchTui`] executes it. No
//! terminal or workbench is needed to test the mapping.

use crate::workbench::{Command, Edit};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which panel receives plain keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Results,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Editor => Self::Results,
            Self::Results => Self::Editor,
        }
    }
}

/// What currently captures the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    /// The error modal is shown.
    Modal,
    /// A yes/no confirmation is pending.
    Confirm,
    /// The file path prompt is open.
    FilePrompt,
    Panel(Focus),
}

/// User intents recognised by the terminal front end.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Quit,
    Run(Command),
    ToggleFocus,
    OpenFilePrompt,
    PromptInput(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
}

const PAGE: isize = 10;

/// Map a key press to an action.
pub fn determine_action(key: KeyEvent, context: KeyContext) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        return Some(KeyAction::Quit);
    }

    match context {
        KeyContext::Modal => modal_action(key),
        KeyContext::Confirm => confirm_action(key),
        KeyContext::FilePrompt => prompt_action(key),
        KeyContext::Panel(focus) => global_action(key).or_else(|| match focus {
            Focus::Editor => editor_action(key),
            Focus::Results => results_action(key),
        }),
    }
}

fn modal_action(key: KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(KeyAction::Run(Command::DismissError)),
        _ => None,
    }
}

fn confirm_action(key: KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            Some(KeyAction::Run(Command::Confirm(true)))
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            Some(KeyAction::Run(Command::Confirm(false)))
        }
        _ => None,
    }
}

fn prompt_action(key: KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Enter => Some(KeyAction::PromptSubmit),
        KeyCode::Esc => Some(KeyAction::PromptCancel),
        KeyCode::Backspace => Some(KeyAction::PromptBackspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::PromptInput(c))
        }
        _ => None,
    }
}

/// Shortcuts available from either panel.
fn global_action(key: KeyEvent) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let run = |command| Some(KeyAction::Run(command));
    match key.code {
        KeyCode::Enter if ctrl => run(Command::Submit),
        KeyCode::Char('r') if ctrl => run(Command::Submit),
        KeyCode::F(5) => run(Command::Submit),
        KeyCode::Char('l') if ctrl => run(Command::Clear { confirmed: false }),
        KeyCode::Char('e') if ctrl => run(Command::LoadExample { confirmed: false }),
        KeyCode::Char('s') if ctrl => run(Command::Export),
        KeyCode::Char('d') if ctrl => run(Command::RemoveFile),
        KeyCode::Char('o') if ctrl => Some(KeyAction::OpenFilePrompt),
        KeyCode::F(2) => run(Command::SwitchPipeline),
        KeyCode::BackTab => Some(KeyAction::ToggleFocus),
        _ => None,
    }
}

fn editor_action(key: KeyEvent) -> Option<KeyAction> {
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    let edit = match key.code {
        KeyCode::Char(c) if plain => Edit::Insert(c),
        KeyCode::Enter if plain => Edit::Newline,
        KeyCode::Tab => Edit::Indent,
        KeyCode::Backspace => Edit::Backspace,
        KeyCode::Left => Edit::Left,
        KeyCode::Right => Edit::Right,
        KeyCode::Up => Edit::Up,
        KeyCode::Down => Edit::Down,
        KeyCode::Home => Edit::Home,
        KeyCode::End => Edit::End,
        _ => return None,
    };
    Some(KeyAction::Run(Command::Edit(edit)))
}

fn results_action(key: KeyEvent) -> Option<KeyAction> {
    let run = |command| Some(KeyAction::Run(command));
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => run(Command::MoveSelection(-1)),
        KeyCode::Down | KeyCode::Char('j') => run(Command::MoveSelection(1)),
        KeyCode::PageUp => run(Command::MoveSelection(-PAGE)),
        KeyCode::PageDown => run(Command::MoveSelection(PAGE)),
        KeyCode::Home | KeyCode::Char('g') => run(Command::SelectToken(0)),
        KeyCode::End | KeyCode::Char('G') => run(Command::SelectToken(usize::MAX)),
        KeyCode::Enter | KeyCode::Char('y') => run(Command::CopySelected),
        KeyCode::Esc | KeyCode::Tab => Some(KeyAction::ToggleFocus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    const EDITOR: KeyContext = KeyContext::Panel(Focus::Editor);
    const RESULTS: KeyContext = KeyContext::Panel(Focus::Results);

    #[test]
    fn submit_shortcuts() {
        let ctrl_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        for event in [ctrl_enter, ctrl('r'), key(KeyCode::F(5))] {
            assert_eq!(
                determine_action(event, EDITOR),
                Some(KeyAction::Run(Command::Submit))
            );
        }
    }

    #[test]
    fn plain_enter_is_a_newline_in_the_editor() {
        assert_eq!(
            determine_action(key(KeyCode::Enter), EDITOR),
            Some(KeyAction::Run(Command::Edit(Edit::Newline)))
        );
    }

    #[test]
    fn tab_indents_instead_of_moving_focus() {
        assert_eq!(
            determine_action(key(KeyCode::Tab), EDITOR),
            Some(KeyAction::Run(Command::Edit(Edit::Indent)))
        );
    }

    #[test]
    fn clear_and_example_ask_first() {
        assert_eq!(
            determine_action(ctrl('l'), EDITOR),
            Some(KeyAction::Run(Command::Clear { confirmed: false }))
        );
        assert_eq!(
            determine_action(ctrl('e'), RESULTS),
            Some(KeyAction::Run(Command::LoadExample { confirmed: false }))
        );
    }

    #[test]
    fn results_panel_copies_selection() {
        assert_eq!(
            determine_action(key(KeyCode::Char('y')), RESULTS),
            Some(KeyAction::Run(Command::CopySelected))
        );
        assert_eq!(
            determine_action(key(KeyCode::Down), RESULTS),
            Some(KeyAction::Run(Command::MoveSelection(1)))
        );
    }

    #[test]
    fn modal_swallows_everything_but_dismiss_and_quit() {
        assert_eq!(determine_action(key(KeyCode::Char('x')), KeyContext::Modal), None);
        assert_eq!(determine_action(ctrl('r'), KeyContext::Modal), None);
        assert_eq!(
            determine_action(key(KeyCode::Esc), KeyContext::Modal),
            Some(KeyAction::Run(Command::DismissError))
        );
        assert_eq!(determine_action(ctrl('q'), KeyContext::Modal), Some(KeyAction::Quit));
    }

    #[test]
    fn confirmation_answers() {
        assert_eq!(
            determine_action(key(KeyCode::Char('y')), KeyContext::Confirm),
            Some(KeyAction::Run(Command::Confirm(true)))
        );
        assert_eq!(
            determine_action(key(KeyCode::Esc), KeyContext::Confirm),
            Some(KeyAction::Run(Command::Confirm(false)))
        );
    }

    #[test]
    fn prompt_collects_text() {
        assert_eq!(
            determine_action(key(KeyCode::Char('a')), KeyContext::FilePrompt),
            Some(KeyAction::PromptInput('a'))
        );
        assert_eq!(
            determine_action(key(KeyCode::Enter), KeyContext::FilePrompt),
            Some(KeyAction::PromptSubmit)
        );
    }
}
