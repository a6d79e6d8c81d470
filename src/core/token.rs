//! Tokens and analysis results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A classified lexical unit.
///
/// Serialized as the two-element array `[category, lexeme]` used by the
/// analysis server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Token {
    /// Raw category tag as reported by the server (e.g. `RESERVED_TOKEN`).
    pub category: String,
    /// Exact source substring.
    pub lexeme: String,
}

impl Token {
    pub fn new(category: impl Into<String>, lexeme: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            lexeme: lexeme.into(),
        }
    }
}

impl From<(String, String)> for Token {
    fn from((category, lexeme): (String, String)) -> Self {
        Self { category, lexeme }
    }
}

impl From<Token> for (String, String) {
    fn from(token: Token) -> Self {
        (token.category, token.lexeme)
    }
}

/// Source-derived metadata reported alongside a token sequence.
///
/// Every field is optional: upload responses omit the code statistics and
/// older servers omit everything but the tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalMetadata {
    pub total_tokens: Option<usize>,
    pub token_types: Option<BTreeMap<String, usize>>,
    pub code_length: Option<usize>,
    pub code_lines: Option<usize>,
}

/// Result of the lexical pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalResult {
    /// Tokens in source order; duplicates preserved.
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub metadata: LexicalMetadata,
}

impl LexicalResult {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            metadata: LexicalMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: LexicalMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Occurrences per category, counted from the tokens themselves.
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        self.tokens.iter().fold(BTreeMap::new(), |mut counts, token| {
            *counts.entry(token.category.as_str()).or_insert(0) += 1;
            counts
        })
    }
}

/// Result of the syntactic pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntacticResult {
    /// Single pass/fail verdict for the whole input.
    pub valid: bool,
    /// Diagnostic and trace output in emission order.
    #[serde(default)]
    pub logs: Vec<String>,
}

impl SyntacticResult {
    pub fn new(valid: bool, logs: Vec<String>) -> Self {
        Self { valid, logs }
    }
}
