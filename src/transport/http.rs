//! HTTP implementation of [`AnalysisBackend`] on top of `ureq`.

use super::wire::{self, CodeRequest};
use super::{AnalysisBackend, HealthStatus, UploadFile, UploadOutcome};
use crate::core::{LexicalResult, SyntacticResult};
use crate::errors::TransportError;
use crate::ingest::{DEFAULT_MAX_UPLOAD_BYTES, MIME_PLAIN_TEXT};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

const ANALYZE_PATH: &str = "/analyze";
const PARSE_PATH: &str = "/parse";
const UPLOAD_PATH: &str = "/upload";
const UPLOAD_PARSE_PATH: &str = "/upload_parse";
const HEALTH_PATH: &str = "/health";

/// Upload responses echo the extracted text plus its analysis, so the cap
/// sits well above the largest accepted file.
const MAX_RESPONSE_BYTES: u64 = DEFAULT_MAX_UPLOAD_BYTES * 4;

/// Blocking client for the analysis server.
///
/// The agent is thread-safe and reuses connections, so one backend can be
/// shared by both pipelines behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_code(&self, path: &str, code: &str) -> Result<(u16, String), TransportError> {
        debug!(path, bytes = code.len(), "Posting code");
        let result = self
            .agent
            .post(&self.url(path))
            .send_json(CodeRequest { code });
        read_response(result)
    }

    fn post_file(&self, path: &str, file: &UploadFile) -> Result<(u16, String), TransportError> {
        let boundary = multipart_boundary();
        let body = multipart_body(&boundary, file);
        debug!(
            path,
            file = %file.descriptor.name,
            bytes = file.bytes.len(),
            "Uploading file"
        );
        let result = self
            .agent
            .post(&self.url(path))
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send_bytes(&body);
        read_response(result)
    }
}

impl AnalysisBackend for HttpBackend {
    fn analyze_lexical(&self, code: &str) -> Result<LexicalResult, TransportError> {
        let (status, body) = self.post_code(ANALYZE_PATH, code)?;
        wire::decode_lexical(status, &body)
    }

    fn analyze_syntactic(&self, code: &str) -> Result<SyntacticResult, TransportError> {
        let (status, body) = self.post_code(PARSE_PATH, code)?;
        wire::decode_syntactic(status, &body)
    }

    fn upload_lexical(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<LexicalResult>, TransportError> {
        let (status, body) = self.post_file(UPLOAD_PATH, file)?;
        wire::decode_lexical_upload(status, &body, &file.descriptor.name)
    }

    fn upload_syntactic(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<SyntacticResult>, TransportError> {
        let (status, body) = self.post_file(UPLOAD_PARSE_PATH, file)?;
        wire::decode_syntactic_upload(status, &body, &file.descriptor.name)
    }

    fn health(&self) -> Result<HealthStatus, TransportError> {
        let (status, body) = read_response(self.agent.get(&self.url(HEALTH_PATH)).call())?;
        if !(200..300).contains(&status) {
            return Err(TransportError::server(status, "Health check failed"));
        }
        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

/// Turn a ureq result into `(status, body)`.
///
/// Non-success statuses are not errors at this level: their bodies carry the
/// server's message and are classified by the decoders in [`wire`].
fn read_response(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<(u16, String), TransportError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            return Err(TransportError::Network(transport.to_string()))
        }
    };
    let status = response.status();
    let mut body = String::new();
    response
        .into_reader()
        .take(MAX_RESPONSE_BYTES + 1)
        .read_to_string(&mut body)
        .map_err(|e| TransportError::Network(e.to_string()))?;
    if body.len() as u64 > MAX_RESPONSE_BYTES {
        return Err(TransportError::Malformed(format!(
            "response exceeds {} bytes",
            MAX_RESPONSE_BYTES
        )));
    }
    debug!(status, bytes = body.len(), "Received response");
    Ok((status, body))
}

fn multipart_boundary() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("----sourcelab{:016x}", nanos)
}

/// Encode a single `file` form field.
fn multipart_body(boundary: &str, file: &UploadFile) -> Vec<u8> {
    let filename = file.descriptor.name.replace('"', "%22");
    let content_type = file
        .descriptor
        .mime_type
        .as_deref()
        .unwrap_or(MIME_PLAIN_TEXT);

    let mut body = Vec::with_capacity(file.bytes.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(&file.bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
