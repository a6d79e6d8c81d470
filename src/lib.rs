// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod input;
pub mod notify;
pub mod observability;
pub mod pipeline;
pub mod render;
pub mod testkit;
pub mod transport;
pub mod tui;
pub mod workbench;

// Re-export commonly used types
pub use crate::core::{
    DisplayClass, LexicalMetadata, LexicalResult, PipelineKind, SyntacticResult, Token,
    TokenCategoryMap,
};

pub use crate::errors::{RenderingError, TransportError, ValidationError, WorkbenchError};

pub use crate::export::{export_filename, ExportSource, Exporter};

pub use crate::ingest::{FileDescriptor, IngestPolicy};

pub use crate::input::{InputManager, TextStats};

pub use crate::notify::NotificationCenter;

pub use crate::pipeline::{Dispatcher, Finished, WorkflowState};

pub use crate::render::{render_lexical, render_syntactic, PostRenderHook, RenderedView};

pub use crate::transport::{AnalysisBackend, HttpBackend, UploadFile, UploadOutcome};

pub use crate::workbench::{Command, Effect, Workbench};
