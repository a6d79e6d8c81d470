//! Plain-text reports of analysis results.
//!
//! Serialization is deterministic: the timestamp is passed in rather than
//! read from the clock, so the same result and instant always give the same
//! document.

use crate::core::{LexicalResult, PipelineKind, SyntacticResult};
use crate::errors::RenderingError;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const HEAVY_RULE_WIDTH: usize = 50;
const LIGHT_RULE_WIDTH: usize = 30;
const CATEGORY_WIDTH: usize = 15;
const FOOTER: &str = "Generated by sourcelab";

/// A result to export.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    Lexical(&'a LexicalResult),
    Syntactic(&'a SyntacticResult),
}

impl ExportSource<'_> {
    pub fn kind(&self) -> PipelineKind {
        match self {
            Self::Lexical(_) => PipelineKind::Lexical,
            Self::Syntactic(_) => PipelineKind::Syntactic,
        }
    }
}

/// Builds report documents with a fixed timestamp format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exporter {
    timestamp_format: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl Exporter {
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Serialize `source` as a report dated `at`.
    ///
    /// A missing result is [`RenderingError::NoResult`]; a lexical result
    /// without tokens is [`RenderingError::EmptyResult`].
    pub fn serialize(
        &self,
        source: Option<ExportSource<'_>>,
        at: DateTime<Local>,
    ) -> Result<String, RenderingError> {
        let date = at.format(&self.timestamp_format).to_string();
        match source.ok_or(RenderingError::NoResult)? {
            ExportSource::Lexical(result) => lexical_report(result, &date),
            ExportSource::Syntactic(result) => Ok(syntactic_report(result, &date)),
        }
    }
}

fn heavy_rule() -> String {
    "=".repeat(HEAVY_RULE_WIDTH)
}

fn lexical_report(result: &LexicalResult, date: &str) -> Result<String, RenderingError> {
    if result.is_empty() {
        return Err(RenderingError::EmptyResult);
    }

    let mut out = String::new();
    let _ = writeln!(out, "LEXICAL ANALYSIS - RESULTS");
    let _ = writeln!(out, "{}\n", heavy_rule());
    let _ = writeln!(out, "Date: {}", date);
    let _ = writeln!(out, "Total tokens: {}\n", result.len());
    let _ = writeln!(out, "IDENTIFIED TOKENS:");
    let _ = writeln!(out, "{}", "-".repeat(LIGHT_RULE_WIDTH));
    for (index, token) in result.tokens.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:03}. {:<width$} | {}",
            index + 1,
            token.category,
            token.lexeme,
            width = CATEGORY_WIDTH
        );
    }
    push_footer(&mut out);
    Ok(out)
}

fn syntactic_report(result: &SyntacticResult, date: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SYNTACTIC ANALYSIS - LOGS");
    let _ = writeln!(out, "{}\n", heavy_rule());
    let _ = writeln!(out, "Date: {}", date);
    let _ = writeln!(
        out,
        "Status: {}",
        if result.valid { "VALID" } else { "INVALID" }
    );
    let _ = writeln!(out, "Total log lines: {}\n", result.logs.len());
    let _ = writeln!(out, "LOGS:");
    for line in &result.logs {
        let _ = writeln!(out, "{}", line);
    }
    push_footer(&mut out);
    out
}

fn push_footer(out: &mut String) {
    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(out, "{}", FOOTER);
}

/// `lexical_analysis_2026-10-18.txt` and friends.
pub fn export_filename(kind: PipelineKind, date: NaiveDate) -> String {
    format!("{}_analysis_{}.txt", kind, date.format("%Y-%m-%d"))
}

/// Write a report into `dir`, returning the full path.
pub fn write_report(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, RenderingError> {
    let path = dir.join(filename);
    std::fs::write(&path, contents)
        .map_err(|e| RenderingError::Write(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), bytes = contents.len(), "Report written");
    Ok(path)
}
