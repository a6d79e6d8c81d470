//! JSON payloads exchanged with the analysis server.
//!
//! Decoding is kept separate from the HTTP client so that response
//! classification (success, server error, malformed payload) is a pure
//! function of status code and body.

use super::UploadOutcome;
use crate::core::{LexicalMetadata, LexicalResult, SyntacticResult, Token};
use crate::errors::TransportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GENERIC_LEXICAL_ERROR: &str = "Error analyzing the code";
pub const GENERIC_SYNTACTIC_ERROR: &str = "Error in syntactic analysis";
pub const GENERIC_UPLOAD_ERROR: &str = "Error processing file";

/// Body of `/analyze` and `/parse` requests.
#[derive(Debug, Serialize)]
pub struct CodeRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeResponse {
    tokens: Option<Vec<Token>>,
    total_tokens: Option<usize>,
    token_types: Option<BTreeMap<String, usize>>,
    code_length: Option<usize>,
    code_lines: Option<usize>,
    error: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ParseResponse {
    valid: Option<bool>,
    logs: Option<Vec<String>>,
    error: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    success: Option<bool>,
    filename: Option<String>,
    content: Option<String>,
    tokens: Option<Vec<Token>>,
    total_tokens: Option<usize>,
    token_types: Option<BTreeMap<String, usize>>,
    valid: Option<bool>,
    logs: Option<Vec<String>>,
    error: Option<String>,
    details: Option<String>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Parse a body, classifying unreadable bodies by status.
///
/// An error status with an unreadable body is still a server error (with the
/// generic message); a success status with an unreadable body is malformed.
fn parse_body<T>(status: u16, body: &str, generic: &str) -> Result<T, TransportError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(body).map_err(|e| {
        if is_success(status) {
            TransportError::Malformed(e.to_string())
        } else {
            TransportError::server(status, generic)
        }
    })
}

fn server_error(
    status: u16,
    error: Option<String>,
    details: Option<String>,
    generic: &str,
) -> TransportError {
    TransportError::Server {
        status,
        message: error
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| generic.to_string()),
        details,
    }
}

pub fn decode_lexical(status: u16, body: &str) -> Result<LexicalResult, TransportError> {
    let response: AnalyzeResponse = parse_body(status, body, GENERIC_LEXICAL_ERROR)?;
    if !is_success(status) {
        return Err(server_error(
            status,
            response.error,
            response.details,
            GENERIC_LEXICAL_ERROR,
        ));
    }
    let tokens = response
        .tokens
        .ok_or_else(|| TransportError::Malformed("response has no `tokens` field".into()))?;
    Ok(LexicalResult::new(tokens).with_metadata(LexicalMetadata {
        total_tokens: response.total_tokens,
        token_types: response.token_types,
        code_length: response.code_length,
        code_lines: response.code_lines,
    }))
}

pub fn decode_syntactic(status: u16, body: &str) -> Result<SyntacticResult, TransportError> {
    let response: ParseResponse = parse_body(status, body, GENERIC_SYNTACTIC_ERROR)?;
    if !is_success(status) {
        return Err(server_error(
            status,
            response.error,
            response.details,
            GENERIC_SYNTACTIC_ERROR,
        ));
    }
    let valid = response
        .valid
        .ok_or_else(|| TransportError::Malformed("response has no `valid` field".into()))?;
    Ok(SyntacticResult::new(valid, response.logs.unwrap_or_default()))
}

/// Common checks for upload responses: status, `success` flag and content.
fn accepted_upload(
    status: u16,
    body: &str,
    fallback_filename: &str,
) -> Result<(UploadResponse, String, String), TransportError> {
    let mut response: UploadResponse = parse_body(status, body, GENERIC_UPLOAD_ERROR)?;
    if !is_success(status) || response.success != Some(true) {
        return Err(server_error(
            status,
            response.error.take(),
            response.details.take(),
            GENERIC_UPLOAD_ERROR,
        ));
    }
    let content = response
        .content
        .take()
        .ok_or_else(|| TransportError::Malformed("response has no `content` field".into()))?;
    let filename = response
        .filename
        .take()
        .unwrap_or_else(|| fallback_filename.to_string());
    Ok((response, content, filename))
}

pub fn decode_lexical_upload(
    status: u16,
    body: &str,
    fallback_filename: &str,
) -> Result<UploadOutcome<LexicalResult>, TransportError> {
    let (response, content, filename) = accepted_upload(status, body, fallback_filename)?;
    let analysis = response.tokens.map(|tokens| {
        LexicalResult::new(tokens).with_metadata(LexicalMetadata {
            total_tokens: response.total_tokens,
            token_types: response.token_types,
            code_length: None,
            code_lines: None,
        })
    });
    Ok(UploadOutcome {
        content,
        filename,
        analysis,
    })
}

pub fn decode_syntactic_upload(
    status: u16,
    body: &str,
    fallback_filename: &str,
) -> Result<UploadOutcome<SyntacticResult>, TransportError> {
    let (response, content, filename) = accepted_upload(status, body, fallback_filename)?;
    let analysis = response
        .valid
        .map(|valid| SyntacticResult::new(valid, response.logs.unwrap_or_default()));
    Ok(UploadOutcome {
        content,
        filename,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_tokens_in_order_with_metadata() {
        let body = indoc! {r#"
            {
              "success": true,
              "tokens": [["RESERVED_TOKEN", "program"], ["ID", "teste"], ["DELIMITER", ";"]],
              "total_tokens": 3,
              "token_types": {"RESERVED_TOKEN": 1, "ID": 1, "DELIMITER": 1},
              "code_length": 14,
              "code_lines": 1
            }
        "#};
        let result = decode_lexical(200, body).unwrap();
        assert_eq!(
            result.tokens,
            vec![
                Token::new("RESERVED_TOKEN", "program"),
                Token::new("ID", "teste"),
                Token::new("DELIMITER", ";"),
            ]
        );
        assert_eq!(result.metadata.code_lines, Some(1));
        assert_eq!(result.metadata.total_tokens, Some(3));
    }

    #[test]
    fn server_error_message_and_details_are_kept() {
        let body = r#"{"error": "Syntax error", "details": "Invalid character at position 4: '@'"}"#;
        assert_eq!(
            decode_lexical(400, body),
            Err(TransportError::Server {
                status: 400,
                message: "Syntax error".into(),
                details: Some("Invalid character at position 4: '@'".into()),
            })
        );
    }

    #[test]
    fn error_status_without_readable_body_uses_generic_message() {
        assert_eq!(
            decode_syntactic(502, "<html>Bad Gateway</html>"),
            Err(TransportError::server(502, GENERIC_SYNTACTIC_ERROR))
        );
    }

    #[test]
    fn success_status_with_garbage_is_malformed() {
        assert!(matches!(
            decode_lexical(200, "not json"),
            Err(TransportError::Malformed(_))
        ));
    }

    #[test]
    fn missing_tokens_is_malformed() {
        assert!(matches!(
            decode_lexical(200, r#"{"success": true}"#),
            Err(TransportError::Malformed(_))
        ));
    }

    #[test]
    fn decodes_syntactic_verdict_and_logs() {
        let body = r#"{"valid": false, "logs": ["Reading program", "Error: expected ';' at line 1"]}"#;
        let result = decode_syntactic(200, body).unwrap();
        assert!(!result.valid);
        assert_eq!(result.logs.len(), 2);
        assert_eq!(result.logs[1], "Error: expected ';' at line 1");
    }

    #[test]
    fn lexical_upload_with_tokens() {
        let body = r#"{"success": true, "filename": "a.txt", "content": "x := 1", "tokens": [["ID", "x"]], "total_tokens": 1}"#;
        let outcome = decode_lexical_upload(200, body, "fallback.txt").unwrap();
        assert_eq!(outcome.filename, "a.txt");
        assert_eq!(outcome.content, "x := 1");
        assert_eq!(outcome.analysis.unwrap().tokens, vec![Token::new("ID", "x")]);
    }

    #[test]
    fn syntactic_upload_without_filename_uses_fallback() {
        let body = r#"{"success": true, "content": "program p;", "valid": true, "logs": []}"#;
        let outcome = decode_syntactic_upload(200, body, "p.txt").unwrap();
        assert_eq!(outcome.filename, "p.txt");
        assert_eq!(outcome.analysis, Some(SyntacticResult::new(true, vec![])));
    }

    #[test]
    fn upload_failure_flag_is_an_error_even_with_ok_status() {
        let body = r#"{"success": false, "error": "Error extracting text from file"}"#;
        assert_eq!(
            decode_syntactic_upload(200, body, "p.docx"),
            Err(TransportError::server(200, "Error extracting text from file"))
        );
    }

    #[test]
    fn upload_error_without_message_uses_generic() {
        assert_eq!(
            decode_lexical_upload(500, r#"{}"#, "p.txt"),
            Err(TransportError::server(500, GENERIC_UPLOAD_ERROR))
        );
    }

    #[test]
    fn code_request_shape() {
        let body = serde_json::to_string(&CodeRequest { code: "begin end" }).unwrap();
        assert_eq!(body, r#"{"code":"begin end"}"#);
    }
}
