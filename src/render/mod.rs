//! Pure rendering of pipeline state into a display model.
//!
//! [`render_lexical`] and [`render_syntactic`] turn a pipeline's
//! [`WorkflowState`] into a [`RenderedView`] without touching any UI toolkit.
//! The terminal front end draws a `RenderedView`; the CLI formats it as text,
//! JSON or markup.
//!
//! # Post-render hooks
//!
//! A [`PostRenderHook`] runs synchronously on every freshly built view. It is
//! the only extension point: callers pass the hooks they want instead of
//! patching the renderer. [`CopyOnSelect`] is the stock hook that makes each
//! token copyable.
//!
//! Rendering is idempotent: equal inputs always produce equal views.

pub mod html;
pub mod text;

use crate::core::{DisplayClass, LexicalResult, PipelineKind, SyntacticResult, TokenCategoryMap};
use crate::pipeline::WorkflowState;
use html_escape::encode_text;
use serde::Serialize;
use std::fmt;

/// Verdict label of a syntactic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLabel {
    Valid,
    Invalid,
}

impl StatusLabel {
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid code"),
            Self::Invalid => write!(f, "Invalid code"),
        }
    }
}

/// One token as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedToken {
    /// 0-based position in the token sequence.
    pub id: usize,
    pub category: String,
    pub class: DisplayClass,
    /// The lexeme exactly as received.
    pub lexeme: String,
    /// The lexeme with markup characters escaped.
    pub escaped: String,
    /// Clipboard text, set when a hook made the token copyable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_text: Option<String>,
}

impl RenderedToken {
    pub fn is_copyable(&self) -> bool {
        self.copy_text.is_some()
    }
}

/// Display model for the result area of one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderedView {
    /// Nothing analyzed yet.
    Placeholder { kind: PipelineKind },
    Loading { kind: PipelineKind },
    Tokens { items: Vec<RenderedToken> },
    /// A lexical analysis that returned zero tokens.
    EmptyTokens,
    Logs { status: StatusLabel, text: String },
    Error { message: String },
}

impl RenderedView {
    pub fn tokens(&self) -> &[RenderedToken] {
        match self {
            Self::Tokens { items } => items,
            _ => &[],
        }
    }

    /// Short status line for the results panel title.
    pub fn summary(&self) -> String {
        match self {
            Self::Placeholder { .. } => "Waiting for input".to_string(),
            Self::Loading { .. } => "Analyzing...".to_string(),
            Self::Tokens { items } => format!("{} tokens", items.len()),
            Self::EmptyTokens => "No tokens found".to_string(),
            Self::Logs { status, .. } => status.to_string(),
            Self::Error { .. } => "Analysis failed".to_string(),
        }
    }
}

/// Hook invoked on each freshly rendered view.
pub trait PostRenderHook {
    fn after_render(&self, view: &mut RenderedView);
}

/// Makes every rendered token copyable as `"{category}: {lexeme}"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOnSelect;

impl PostRenderHook for CopyOnSelect {
    fn after_render(&self, view: &mut RenderedView) {
        if let RenderedView::Tokens { items } = view {
            for item in items {
                item.copy_text = Some(format!("{}: {}", item.category, item.lexeme));
            }
        }
    }
}

/// State of either pipeline, for callers that handle both uniformly.
#[derive(Debug, Clone, Copy)]
pub enum PipelineView<'a> {
    Lexical(&'a WorkflowState<LexicalResult>),
    Syntactic(&'a WorkflowState<SyntacticResult>),
}

/// Render whichever pipeline `view` refers to.
pub fn render(
    view: PipelineView<'_>,
    categories: &TokenCategoryMap,
    hook: Option<&dyn PostRenderHook>,
) -> RenderedView {
    match view {
        PipelineView::Lexical(state) => render_lexical(state, categories, hook),
        PipelineView::Syntactic(state) => render_syntactic(state, hook),
    }
}

pub fn render_lexical(
    state: &WorkflowState<LexicalResult>,
    categories: &TokenCategoryMap,
    hook: Option<&dyn PostRenderHook>,
) -> RenderedView {
    let view = match state {
        WorkflowState::Displaying(result) => token_view(result, categories),
        other => non_result_view(other, PipelineKind::Lexical),
    };
    apply_hook(view, hook)
}

pub fn render_syntactic(
    state: &WorkflowState<SyntacticResult>,
    hook: Option<&dyn PostRenderHook>,
) -> RenderedView {
    let view = match state {
        WorkflowState::Displaying(result) => RenderedView::Logs {
            status: StatusLabel::from_valid(result.valid),
            text: result.logs.join("\n"),
        },
        other => non_result_view(other, PipelineKind::Syntactic),
    };
    apply_hook(view, hook)
}

fn token_view(result: &LexicalResult, categories: &TokenCategoryMap) -> RenderedView {
    if result.is_empty() {
        return RenderedView::EmptyTokens;
    }
    let items = result
        .tokens
        .iter()
        .enumerate()
        .map(|(id, token)| RenderedToken {
            id,
            category: token.category.clone(),
            class: categories.classify(&token.category),
            lexeme: token.lexeme.clone(),
            escaped: encode_text(&token.lexeme).into_owned(),
            copy_text: None,
        })
        .collect();
    RenderedView::Tokens { items }
}

fn non_result_view<R>(state: &WorkflowState<R>, kind: PipelineKind) -> RenderedView {
    match state {
        WorkflowState::Idle | WorkflowState::Displaying(_) => RenderedView::Placeholder { kind },
        WorkflowState::Submitting => RenderedView::Loading { kind },
        WorkflowState::Failed(error) => RenderedView::Error {
            message: error.user_message(),
        },
    }
}

fn apply_hook(mut view: RenderedView, hook: Option<&dyn PostRenderHook>) -> RenderedView {
    if let Some(hook) = hook {
        hook.after_render(&mut view);
    }
    view
}
