//! File ingestion policy.
//!
//! Candidate files are checked here before any upload is attempted. The
//! validator only looks at the descriptor (name, size, MIME type) and never
//! reads file contents.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 16 MiB. Files strictly larger than this are rejected.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ACCEPTED_MIME_TYPES: &[&str] = &[MIME_PLAIN_TEXT, MIME_DOCX];
const ACCEPTED_EXTENSIONS: &[&str] = &[".txt", ".docx"];

/// What is known about a candidate file before it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: Option<String>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// Build a descriptor from file system metadata.
    ///
    /// The MIME type is guessed from the extension, which is all a terminal
    /// client has to go on.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = guess_mime_type(&name);
        Ok(Self::new(name, metadata.len(), mime_type))
    }

    /// Human readable size, e.g. `1.5 KB`.
    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

fn guess_mime_type(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower.ends_with(".txt") {
        Some(MIME_PLAIN_TEXT)
    } else if lower.ends_with(".docx") {
        Some(MIME_DOCX)
    } else {
        None
    }
}

/// Type and size rules for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestPolicy {
    pub max_size_bytes: u64,
}

impl IngestPolicy {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    /// Accept or reject a file. The type rule is checked before the size rule.
    pub fn validate(&self, file: &FileDescriptor) -> Result<(), ValidationError> {
        if !is_accepted_type(file) {
            return Err(ValidationError::UnsupportedFileType {
                name: file.name.clone(),
            });
        }
        if file.size > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size: file.size,
                limit: self.max_size_bytes,
            });
        }
        Ok(())
    }
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// MIME type match, falling back to the extension when the type is absent
/// or unrecognized.
fn is_accepted_type(file: &FileDescriptor) -> bool {
    let mime_ok = file
        .mime_type
        .as_deref()
        .is_some_and(|mime| ACCEPTED_MIME_TYPES.contains(&mime));
    let name = file.name.to_lowercase();
    mime_ok || ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Format a byte count with 1024-based units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
