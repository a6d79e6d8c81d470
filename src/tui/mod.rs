//! Interactive terminal workbench.
//!
//! [`WorkbenchTui`] owns the terminal and runs the event loop: completed
//! background requests are drained from a channel, keys are mapped to
//! actions by [`keymap::determine_action`], and the resulting
//! [`Effect`](crate::workbench::Effect)s are carried out by
//! [`actions::execute_effect`].
//!
//! # Usage
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use sourcelab::{config::WorkbenchConfig, transport::HttpBackend, workbench::Workbench};
//! use sourcelab::tui::WorkbenchTui;
//!
//! let config = WorkbenchConfig::default();
//! let runtime = tokio::runtime::Runtime::new()?;
//! let backend = Arc::new(HttpBackend::new(&config.server.base_url, config.request_timeout()));
//! let mut tui = WorkbenchTui::new(Workbench::new(backend, &config), runtime.handle().clone())?;
//! tui.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod actions;
pub mod keymap;
pub mod layout;
pub mod theme;

use crate::observability::set_tui_active;
use crate::workbench::{Command, Workbench};
use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use keymap::{determine_action, Focus, KeyAction, KeyContext};
use layout::Screen;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use theme::Theme;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal front end for a [`Workbench`].
pub struct WorkbenchTui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    workbench: Workbench,
    runtime: Handle,
    completions: UnboundedSender<Command>,
    completed: UnboundedReceiver<Command>,
    focus: Focus,
    prompt: Option<String>,
    theme: Theme,
    enhanced_keys: bool,
}

impl WorkbenchTui {
    /// Enter raw mode and the alternate screen.
    ///
    /// Background requests are spawned on `runtime`.
    pub fn new(workbench: Workbench, runtime: Handle) -> Result<Self> {
        enable_raw_mode()?;
        let (terminal, enhanced_keys) = undo_on_error(enter_screen(), || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })?;
        set_tui_active(true);
        let (completions, completed) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            workbench,
            runtime,
            completions,
            completed,
            focus: Focus::default(),
            prompt: None,
            theme: Theme::default(),
            enhanced_keys,
        })
    }

    /// Run the event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        info!("Workbench started");
        loop {
            while let Ok(command) = self.completed.try_recv() {
                self.dispatch(command);
            }
            self.dispatch(Command::Tick(Instant::now()));

            let screen = Screen {
                workbench: &self.workbench,
                focus: self.focus,
                prompt: self.prompt.as_deref(),
                theme: &self.theme,
            };
            self.terminal.draw(|frame| layout::draw(frame, &screen))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(action) = determine_action(key, self.key_context()) else {
                continue;
            };
            if !self.apply(action) {
                break;
            }
        }

        info!("Workbench closed");
        self.cleanup()
    }

    fn key_context(&self) -> KeyContext {
        if self.workbench.notifications().has_modal() {
            KeyContext::Modal
        } else if self.workbench.pending_confirmation().is_some() {
            KeyContext::Confirm
        } else if self.prompt.is_some() {
            KeyContext::FilePrompt
        } else {
            KeyContext::Panel(self.focus)
        }
    }

    /// Returns false when the loop should stop.
    fn apply(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Quit => return false,
            KeyAction::Run(command) => self.dispatch(command),
            KeyAction::ToggleFocus => self.focus = self.focus.toggle(),
            KeyAction::OpenFilePrompt => self.prompt = Some(String::new()),
            KeyAction::PromptInput(c) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.push(c);
                }
            }
            KeyAction::PromptBackspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.pop();
                }
            }
            KeyAction::PromptCancel => self.prompt = None,
            KeyAction::PromptSubmit => {
                if let Some(path) = self.prompt.take() {
                    let path = path.trim();
                    if !path.is_empty() {
                        self.dispatch(Command::OpenFile(PathBuf::from(path)));
                    }
                }
            }
        }
        true
    }

    /// Feed a command to the workbench and run its effects to completion.
    fn dispatch(&mut self, command: Command) {
        let mut queue = vec![command];
        while let Some(command) = queue.pop() {
            for effect in self.workbench.handle(command) {
                debug!(?effect, "Executing effect");
                if let Some(follow_up) =
                    actions::execute_effect(effect, &self.runtime, &self.completions)
                {
                    queue.push(follow_up);
                }
            }
        }
    }

    /// Restore the terminal.
    fn cleanup(&mut self) -> Result<()> {
        set_tui_active(false);
        disable_raw_mode()?;
        if self.enhanced_keys {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for WorkbenchTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Switch to the alternate screen. Returns the terminal and whether
/// keyboard enhancement was pushed.
fn enter_screen() -> Result<(Terminal<CrosstermBackend<io::Stdout>>, bool)> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Ctrl+Enter is only distinguishable with the kitty protocol
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok((terminal, enhanced_keys))
}

/// Run `undo` when setup failed part-way, since `Drop` never runs for a
/// value that was not built.
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        undo();
    }
    result
}
