//! Factory functions for test data.

use crate::core::Token;
use crate::ingest::FileDescriptor;
use crate::transport::UploadFile;
use chrono::{DateTime, Local, TimeZone};

/// Tokens of `program teste;` as the lexical server reports them.
pub fn sample_tokens() -> Vec<Token> {
    vec![
        Token::new("RESERVED_TOKEN", "program"),
        Token::new("ID", "teste"),
        Token::new("DELIMITER", ";"),
    ]
}

/// An in-memory upload of `name` with `content`.
///
/// The MIME type is left unset so the extension rule decides acceptance.
pub fn upload_file(name: &str, content: &str) -> UploadFile {
    UploadFile::new(
        FileDescriptor::new(name, content.len() as u64, None),
        content.as_bytes().to_vec(),
    )
}

/// 18/10/2026 14:03:09 local time, for deterministic reports.
pub fn fixed_timestamp() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 10, 18, 14, 3, 9)
        .single()
        .unwrap_or_else(Local::now)
}
