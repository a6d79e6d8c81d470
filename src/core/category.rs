//! Mapping from raw token categories to display classes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visual class a token is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayClass {
    Reserved,
    Identifier,
    Number,
    String,
    Operator,
    Delimiter,
    Conditional,
    Loop,
    Default,
}

impl DisplayClass {
    /// Stable class name, used as the CSS class in markup output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::String => "string",
            Self::Operator => "operator",
            Self::Delimiter => "delimiter",
            Self::Conditional => "conditional",
            Self::Loop => "loop",
            Self::Default => "default",
        }
    }
}

const BUILTIN_CLASSES: &[(&str, DisplayClass)] = &[
    ("RESERVED_TOKEN", DisplayClass::Reserved),
    ("ID", DisplayClass::Identifier),
    ("NUMBER", DisplayClass::Number),
    ("STRING", DisplayClass::String),
    ("CHAR", DisplayClass::String),
    ("OP", DisplayClass::Operator),
    ("OP_LOGICO", DisplayClass::Operator),
    ("OP_RELACIONAL", DisplayClass::Operator),
    ("ASSIGN", DisplayClass::Operator),
    ("DELIMITER", DisplayClass::Delimiter),
    ("CONDITIONAL", DisplayClass::Conditional),
    ("BLOCK", DisplayClass::Conditional),
    ("READ", DisplayClass::Conditional),
    ("WRITE", DisplayClass::Conditional),
    ("WRITELN", DisplayClass::Conditional),
    ("LOOP", DisplayClass::Loop),
    ("REPEAT", DisplayClass::Loop),
    ("UNTIL", DisplayClass::Loop),
    ("FOR_TO_DO", DisplayClass::Loop),
];

/// Total classification of category tags.
///
/// Lookups never fail: tags missing from the table resolve to
/// [`DisplayClass::Default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCategoryMap {
    classes: HashMap<String, DisplayClass>,
}

impl TokenCategoryMap {
    pub fn builtin() -> Self {
        Self {
            classes: BUILTIN_CLASSES
                .iter()
                .map(|(tag, class)| (tag.to_string(), *class))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Add or replace a mapping.
    pub fn with(mut self, tag: impl Into<String>, class: DisplayClass) -> Self {
        self.classes.insert(tag.into(), class);
        self
    }

    pub fn classify(&self, tag: &str) -> DisplayClass {
        self.classes
            .get(tag)
            .copied()
            .unwrap_or(DisplayClass::Default)
    }
}

impl Default for TokenCategoryMap {
    fn default() -> Self {
        Self::builtin()
    }
}
