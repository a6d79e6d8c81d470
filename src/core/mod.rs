//! Core data model shared by every layer of the workbench.
//!
//! Results are immutable once received: a pipeline replaces its stored result
//! wholesale on each successful response and never merges.

pub mod category;
pub mod token;

pub use category::{DisplayClass, TokenCategoryMap};
pub use token::{LexicalMetadata, LexicalResult, SyntacticResult, Token};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent analysis workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Lexical,
    Syntactic,
}

impl PipelineKind {
    pub fn other(self) -> Self {
        match self {
            Self::Lexical => Self::Syntactic,
            Self::Syntactic => Self::Lexical,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Lexical => "Lexical analysis",
            Self::Syntactic => "Syntactic analysis",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntactic => write!(f, "syntactic"),
        }
    }
}
