//! The analysis workflow controller.
//!
//! A [`Workbench`] owns the text buffer, both pipelines, the notification
//! center and the small bits of interaction state (cursor, selected token,
//! pending confirmation, loaded file). Every user action arrives as a
//! [`Command`]; [`Workbench::handle`] applies it and returns the [`Effect`]s
//! the front end must carry out (spawning a request, touching the clipboard,
//! writing a report). Effects report back with further commands, so all
//! state transitions happen here and can be tested without a terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut workbench = Workbench::new(backend, &WorkbenchConfig::default());
//! workbench.handle(Command::SetText("program p;".into()));
//! for effect in workbench.handle(Command::Submit) {
//!     if let Effect::Spawn(task) = effect {
//!         let done = task.await;
//!         workbench.handle(done);
//!     }
//! }
//! ```

pub mod samples;

use crate::config::WorkbenchConfig;
use crate::core::{LexicalResult, PipelineKind, SyntacticResult, TokenCategoryMap};
use crate::errors::{RenderingError, TransportError, ValidationError, WorkbenchError};
use crate::export::{export_filename, ExportSource, Exporter};
use crate::ingest::{FileDescriptor, IngestPolicy};
use crate::input::{cursor_position, offset_at, InputManager, TextStats};
use crate::notify::NotificationCenter;
use crate::pipeline::{Dispatcher, Finished, WorkflowState};
use crate::render::{self, CopyOnSelect, PipelineView, RenderedView};
use crate::transport::{AnalysisBackend, UploadFile, UploadOutcome};
use chrono::{DateTime, Local};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A request running in the background. Resolves to the command that
/// reports its outcome.
pub type Task = Pin<Box<dyn Future<Output = Command> + Send + 'static>>;

/// Cursor-level editing of the text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Newline,
    Backspace,
    /// Replace the current position with the 4-space indent.
    Indent,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Actions that need an explicit yes before they discard text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Clear,
    LoadExample,
}

impl Confirmation {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Clear => "Clear the code? (y/n)",
            Self::LoadExample => "This will replace the current code. Continue? (y/n)",
        }
    }
}

/// Everything the workbench reacts to.
#[derive(Clone, PartialEq)]
pub enum Command {
    Edit(Edit),
    SetText(String),
    /// Analyze the buffer with the active pipeline.
    Submit,
    SwitchPipeline,
    Clear { confirmed: bool },
    LoadExample { confirmed: bool },
    /// Answer to the pending confirmation prompt.
    Confirm(bool),
    /// A file chosen by path; validated before its contents are read.
    OpenFile(PathBuf),
    /// A file already in memory.
    FileDropped(UploadFile),
    /// Forget the loaded file, its text and all results.
    RemoveFile,
    Export,
    SelectToken(usize),
    MoveSelection(isize),
    CopySelected,
    DismissError,
    Tick(Instant),
    /// Background analysis finished.
    Analyzed {
        kind: PipelineKind,
        applied: bool,
        error: Option<WorkbenchError>,
    },
    /// Background upload finished.
    Uploaded {
        kind: PipelineKind,
        applied: bool,
        outcome: Result<UploadedText, WorkbenchError>,
    },
    /// Clipboard effect finished.
    Copied(Result<(), String>),
    /// Report effect finished.
    Saved(Result<PathBuf, RenderingError>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit(edit) => write!(f, "Edit({:?})", edit),
            Self::SetText(text) => write!(f, "SetText({} chars)", text.chars().count()),
            Self::Submit => write!(f, "Submit"),
            Self::SwitchPipeline => write!(f, "SwitchPipeline"),
            Self::Clear { confirmed } => write!(f, "Clear {{ confirmed: {} }}", confirmed),
            Self::LoadExample { confirmed } => {
                write!(f, "LoadExample {{ confirmed: {} }}", confirmed)
            }
            Self::Confirm(answer) => write!(f, "Confirm({})", answer),
            Self::OpenFile(path) => write!(f, "OpenFile({})", path.display()),
            Self::FileDropped(file) => write!(f, "FileDropped({})", file.descriptor.name),
            Self::RemoveFile => write!(f, "RemoveFile"),
            Self::Export => write!(f, "Export"),
            Self::SelectToken(index) => write!(f, "SelectToken({})", index),
            Self::MoveSelection(delta) => write!(f, "MoveSelection({})", delta),
            Self::CopySelected => write!(f, "CopySelected"),
            Self::DismissError => write!(f, "DismissError"),
            Self::Tick(_) => write!(f, "Tick"),
            Self::Analyzed { kind, applied, error } => f
                .debug_struct("Analyzed")
                .field("kind", kind)
                .field("applied", applied)
                .field("error", error)
                .finish(),
            Self::Uploaded {
                kind,
                applied,
                outcome,
            } => f
                .debug_struct("Uploaded")
                .field("kind", kind)
                .field("applied", applied)
                .field("ok", &outcome.is_ok())
                .finish(),
            Self::Copied(result) => write!(f, "Copied({:?})", result),
            Self::Saved(result) => write!(f, "Saved({:?})", result),
        }
    }
}

/// Text extracted from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedText {
    pub filename: String,
    pub content: String,
}

/// Side effects requested by [`Workbench::handle`].
pub enum Effect {
    /// Run the task and feed its command back.
    Spawn(Task),
    /// Put text on the system clipboard, then report with [`Command::Copied`].
    CopyToClipboard(String),
    /// Write a report, then report with [`Command::Saved`].
    SaveReport {
        dir: PathBuf,
        filename: String,
        contents: String,
    },
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(_) => write!(f, "Spawn(..)"),
            Self::CopyToClipboard(text) => write!(f, "CopyToClipboard({:?})", text),
            Self::SaveReport { dir, filename, .. } => f
                .debug_struct("SaveReport")
                .field("dir", dir)
                .field("filename", filename)
                .finish(),
        }
    }
}

type Clock = Box<dyn Fn() -> DateTime<Local> + Send>;

/// Interactive state of the whole client.
pub struct Workbench {
    input: InputManager,
    cursor: usize,
    active: PipelineKind,
    lexical: Dispatcher<LexicalResult>,
    syntactic: Dispatcher<SyntacticResult>,
    policy: IngestPolicy,
    categories: TokenCategoryMap,
    exporter: Exporter,
    output_dir: PathBuf,
    notifications: NotificationCenter,
    loaded_file: Option<FileDescriptor>,
    pending: Option<Confirmation>,
    selected: Option<usize>,
    clock: Clock,
}

impl Workbench {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: &WorkbenchConfig) -> Self {
        let timeout = config.request_timeout();
        Self {
            input: InputManager::new(),
            cursor: 0,
            active: PipelineKind::Lexical,
            lexical: Dispatcher::new(PipelineKind::Lexical, Arc::clone(&backend), timeout),
            syntactic: Dispatcher::new(PipelineKind::Syntactic, backend, timeout),
            policy: IngestPolicy::new(config.upload.max_size_bytes),
            categories: TokenCategoryMap::builtin(),
            exporter: Exporter::new(config.export.timestamp_format.clone()),
            output_dir: config.export.output_dir.clone(),
            notifications: NotificationCenter::new(config.toast_duration()),
            loaded_file: None,
            pending: None,
            selected: None,
            clock: Box::new(Local::now),
        }
    }

    /// Replace the clock used to date reports.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Local> + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_active(mut self, kind: PipelineKind) -> Self {
        self.active = kind;
        self
    }

    // Accessors

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn stats(&self) -> TextStats {
        self.input.stats()
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    /// Cursor as a character offset into the buffer.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as 0-based `(line, column)`.
    pub fn cursor_position(&self) -> (usize, usize) {
        cursor_position(self.input.text(), self.cursor)
    }

    pub fn active(&self) -> PipelineKind {
        self.active
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn loaded_file(&self) -> Option<&FileDescriptor> {
        self.loaded_file.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<Confirmation> {
        self.pending
    }

    pub fn selected_token(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_busy(&self, kind: PipelineKind) -> bool {
        match kind {
            PipelineKind::Lexical => self.lexical.is_busy(),
            PipelineKind::Syntactic => self.syntactic.is_busy(),
        }
    }

    pub fn lexical_state(&self) -> WorkflowState<LexicalResult> {
        self.lexical.state()
    }

    pub fn syntactic_state(&self) -> WorkflowState<SyntacticResult> {
        self.syntactic.state()
    }

    /// Rendered result area of `kind`, with every token copyable.
    pub fn view(&self, kind: PipelineKind) -> RenderedView {
        match kind {
            PipelineKind::Lexical => {
                let state = self.lexical.state();
                render::render(
                    PipelineView::Lexical(&state),
                    &self.categories,
                    Some(&CopyOnSelect),
                )
            }
            PipelineKind::Syntactic => {
                let state = self.syntactic.state();
                render::render(
                    PipelineView::Syntactic(&state),
                    &self.categories,
                    Some(&CopyOnSelect),
                )
            }
        }
    }

    pub fn active_view(&self) -> RenderedView {
        self.view(self.active)
    }

    /// Whether the active pipeline has a report to export: its last
    /// successful result, unless that result holds no tokens.
    pub fn can_export(&self) -> bool {
        match self.active {
            PipelineKind::Lexical => self.lexical.last_result().is_some_and(|r| !r.is_empty()),
            PipelineKind::Syntactic => self.syntactic.last_result().is_some(),
        }
    }

    /// Per-category counts for the displayed lexical result, preferring the
    /// server's figures and counting locally when it sent none.
    pub fn token_statistics(&self) -> Vec<(String, usize)> {
        let state = self.lexical.state();
        let Some(result) = state.result() else {
            return Vec::new();
        };
        match &result.metadata.token_types {
            Some(types) => types.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            None => result
                .category_counts()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    // Transitions

    /// Apply one command and return the effects it requests.
    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        debug!(?command, "Handling command");
        match command {
            Command::Edit(edit) => {
                self.apply_edit(edit);
                Vec::new()
            }
            Command::SetText(text) => {
                self.input.set_text(text);
                self.cursor = self.input.stats().chars;
                Vec::new()
            }
            Command::Submit => self.submit(),
            Command::SwitchPipeline => {
                self.active = self.active.other();
                self.selected = None;
                info!(pipeline = %self.active, "Switched pipeline");
                Vec::new()
            }
            Command::Clear { confirmed } => {
                self.guarded(Confirmation::Clear, confirmed);
                Vec::new()
            }
            Command::LoadExample { confirmed } => {
                self.guarded(Confirmation::LoadExample, confirmed);
                Vec::new()
            }
            Command::Confirm(answer) => {
                if let Some(action) = self.pending.take() {
                    if answer {
                        self.run_confirmed(action);
                    }
                }
                Vec::new()
            }
            Command::OpenFile(path) => self.open_file(&path),
            Command::FileDropped(file) => self.accept_file(file),
            Command::RemoveFile => {
                self.reset_all();
                Vec::new()
            }
            Command::Export if !self.can_export() => {
                debug!(pipeline = %self.active, "Nothing to export");
                Vec::new()
            }
            Command::Export => self.export(),
            Command::SelectToken(index) => {
                self.select(Some(index));
                Vec::new()
            }
            Command::MoveSelection(delta) => {
                self.move_selection(delta);
                Vec::new()
            }
            Command::CopySelected => self.copy_selected(),
            Command::DismissError => {
                self.notifications.dismiss_error();
                Vec::new()
            }
            Command::Tick(now) => {
                self.notifications.expire(now);
                Vec::new()
            }
            Command::Analyzed {
                kind,
                applied,
                error,
            } => {
                self.analysis_finished(kind, applied, error);
                Vec::new()
            }
            Command::Uploaded {
                kind,
                applied,
                outcome,
            } => {
                self.upload_finished(kind, applied, outcome);
                Vec::new()
            }
            Command::Copied(result) => {
                match result {
                    Ok(()) => self.notifications.push_success("Copied!", Instant::now()),
                    Err(message) => self.notifications.show_error(message),
                }
                Vec::new()
            }
            Command::Saved(result) => {
                match result {
                    Ok(path) => self
                        .notifications
                        .push_success(format!("Downloaded! {}", path.display()), Instant::now()),
                    Err(error) => self.fail(error.into()),
                }
                Vec::new()
            }
        }
    }

    fn fail(&mut self, error: WorkbenchError) {
        self.notifications.show_error(error.user_message());
    }

    fn apply_edit(&mut self, edit: Edit) {
        let (line, col) = cursor_position(self.input.text(), self.cursor);
        self.cursor = match edit {
            Edit::Insert(c) => self.input.insert(self.cursor, c.encode_utf8(&mut [0; 4])),
            Edit::Newline => self.input.insert(self.cursor, "\n"),
            Edit::Backspace => self.input.backspace(self.cursor),
            Edit::Indent => self.input.insert_indent(self.cursor, self.cursor),
            Edit::Left => self.cursor.saturating_sub(1),
            Edit::Right => (self.cursor + 1).min(self.input.stats().chars),
            Edit::Up if line == 0 => 0,
            Edit::Up => offset_at(self.input.text(), line - 1, col),
            Edit::Down => offset_at(self.input.text(), line + 1, col),
            Edit::Home => offset_at(self.input.text(), line, 0),
            Edit::End => offset_at(self.input.text(), line, usize::MAX),
        };
    }

    fn log_busy(&self) {
        debug!(pipeline = %self.active, "Ignoring action while request in flight");
    }

    fn submit(&mut self) -> Vec<Effect> {
        let kind = self.active;
        let text = self.input.text().to_string();
        let started: Result<Task, WorkbenchError> = match kind {
            PipelineKind::Lexical => self
                .lexical
                .start(&text)
                .map(|pending| analysis_task(kind, pending)),
            PipelineKind::Syntactic => self
                .syntactic
                .start(&text)
                .map(|pending| analysis_task(kind, pending)),
        };
        match started {
            Ok(task) => {
                self.selected = None;
                vec![Effect::Spawn(task)]
            }
            Err(WorkbenchError::Transport(TransportError::InFlight)) => {
                self.log_busy();
                Vec::new()
            }
            Err(error) => {
                self.fail(error);
                Vec::new()
            }
        }
    }

    fn guarded(&mut self, action: Confirmation, confirmed: bool) {
        if confirmed || self.input.text().trim().is_empty() {
            self.run_confirmed(action);
        } else {
            self.pending = Some(action);
        }
    }

    fn run_confirmed(&mut self, action: Confirmation) {
        match action {
            Confirmation::Clear => self.reset_all(),
            Confirmation::LoadExample => {
                self.input.set_text(samples::sample_for(self.active));
                self.cursor = 0;
            }
        }
    }

    /// Empty the buffer and drop both pipelines' results. Requests still in
    /// flight are abandoned.
    fn reset_all(&mut self) {
        self.input.clear();
        self.cursor = 0;
        self.lexical.reset();
        self.syntactic.reset();
        self.loaded_file = None;
        self.selected = None;
        info!("Workbench cleared");
    }

    fn open_file(&mut self, path: &Path) -> Vec<Effect> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let descriptor = match FileDescriptor::from_path(path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                self.fail(unreadable(&name, &e));
                return Vec::new();
            }
        };
        if let Err(rejection) = self.policy.validate(&descriptor) {
            self.fail(rejection.into());
            return Vec::new();
        }
        match std::fs::read(path) {
            Ok(bytes) => self.accept_file(UploadFile::new(descriptor, bytes)),
            Err(e) => {
                self.fail(unreadable(&name, &e));
                Vec::new()
            }
        }
    }

    fn accept_file(&mut self, file: UploadFile) -> Vec<Effect> {
        if let Err(rejection) = self.policy.validate(&file.descriptor) {
            info!(file = %file.descriptor.name, %rejection, "File rejected");
            self.fail(rejection.into());
            return Vec::new();
        }

        let kind = self.active;
        let descriptor = file.descriptor.clone();
        let started: Result<Task, WorkbenchError> = match kind {
            PipelineKind::Lexical => self
                .lexical
                .start_upload(file)
                .map(|pending| upload_task(kind, pending)),
            PipelineKind::Syntactic => self
                .syntactic
                .start_upload(file)
                .map(|pending| upload_task(kind, pending)),
        };
        match started {
            Ok(task) => {
                self.loaded_file = Some(descriptor);
                self.selected = None;
                vec![Effect::Spawn(task)]
            }
            Err(WorkbenchError::Transport(TransportError::InFlight)) => {
                self.log_busy();
                Vec::new()
            }
            Err(error) => {
                self.fail(error);
                Vec::new()
            }
        }
    }

    fn analysis_finished(
        &mut self,
        kind: PipelineKind,
        applied: bool,
        error: Option<WorkbenchError>,
    ) {
        if !applied {
            debug!(pipeline = %kind, "Ignoring abandoned analysis");
            return;
        }
        if let Some(error) = error {
            self.fail(error);
        }
    }

    fn upload_finished(
        &mut self,
        kind: PipelineKind,
        applied: bool,
        outcome: Result<UploadedText, WorkbenchError>,
    ) {
        if !applied {
            debug!(pipeline = %kind, "Ignoring abandoned upload");
            return;
        }
        match outcome {
            Ok(uploaded) => {
                self.input.set_text(uploaded.content);
                self.cursor = 0;
                self.notifications.push_success(
                    format!("File loaded: {}", uploaded.filename),
                    Instant::now(),
                );
            }
            Err(error) => {
                self.loaded_file = None;
                self.fail(error);
            }
        }
    }

    fn export(&mut self) -> Vec<Effect> {
        let at = (self.clock)();
        // A later failure leaves the last good result exportable.
        let lexical = self.lexical.last_result();
        let syntactic = self.syntactic.last_result();
        let source = match self.active {
            PipelineKind::Lexical => lexical.as_ref().map(ExportSource::Lexical),
            PipelineKind::Syntactic => syntactic.as_ref().map(ExportSource::Syntactic),
        };
        match self.exporter.serialize(source, at) {
            Ok(contents) => vec![Effect::SaveReport {
                dir: self.output_dir.clone(),
                filename: export_filename(self.active, at.date_naive()),
                contents,
            }],
            Err(error) => {
                self.fail(error.into());
                Vec::new()
            }
        }
    }

    fn token_count(&self) -> usize {
        match self.active {
            PipelineKind::Lexical => self.active_view().tokens().len(),
            PipelineKind::Syntactic => 0,
        }
    }

    fn select(&mut self, index: Option<usize>) {
        let count = self.token_count();
        self.selected = index.filter(|_| count > 0).map(|i| i.min(count - 1));
    }

    fn move_selection(&mut self, delta: isize) {
        let next = match self.selected {
            Some(current) => current.saturating_add_signed(delta),
            None => 0,
        };
        self.select(Some(next));
    }

    fn copy_selected(&mut self) -> Vec<Effect> {
        let Some(index) = self.selected else {
            return Vec::new();
        };
        let view = self.active_view();
        match view.tokens().get(index).and_then(|t| t.copy_text.clone()) {
            Some(text) => vec![Effect::CopyToClipboard(text)],
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for Workbench {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbench")
            .field("active", &self.active)
            .field("cursor", &self.cursor)
            .field("stats", &self.input.stats())
            .field("loaded_file", &self.loaded_file)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

fn unreadable(name: &str, error: &std::io::Error) -> WorkbenchError {
    ValidationError::Unreadable {
        name: name.to_string(),
        reason: error.to_string(),
    }
    .into()
}

fn analysis_task<R: Send + 'static>(
    kind: PipelineKind,
    pending: impl Future<Output = Finished<R>> + Send + 'static,
) -> Task {
    Box::pin(async move {
        let finished = pending.await;
        Command::Analyzed {
            kind,
            applied: finished.applied,
            error: finished.outcome.err(),
        }
    })
}

fn upload_task<R: Send + 'static>(
    kind: PipelineKind,
    pending: impl Future<Output = Finished<UploadOutcome<R>>> + Send + 'static,
) -> Task {
    Box::pin(async move {
        let finished = pending.await;
        Command::Uploaded {
            kind,
            applied: finished.applied,
            outcome: finished.outcome.map(|upload| UploadedText {
                filename: upload.filename,
                content: upload.content,
            }),
        }
    })
}
