//! Access to the remote analysis service.
//!
//! [`AnalysisBackend`] is the seam between the workflow controller and the
//! network. The production implementation is [`http::HttpBackend`]; tests use
//! [`crate::testkit::MockBackend`].
//!
//! Backend calls are blocking. The dispatcher moves them onto tokio's
//! blocking pool and bounds them with a timeout, so implementations do not
//! need to be async.

pub mod http;
pub mod wire;

pub use http::HttpBackend;

use crate::core::{LexicalResult, SyntacticResult};
use crate::errors::TransportError;
use crate::ingest::FileDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An accepted file ready to be uploaded.
///
/// Descriptor and bytes are forwarded to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub descriptor: FileDescriptor,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(descriptor: FileDescriptor, bytes: Vec<u8>) -> Self {
        Self { descriptor, bytes }
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        let descriptor = FileDescriptor::from_path(path)?;
        let bytes = std::fs::read(path)?;
        Ok(Self { descriptor, bytes })
    }
}

/// Successful upload: the extracted text plus, optionally, a first-stage
/// analysis of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome<R> {
    pub content: String,
    pub filename: String,
    pub analysis: Option<R>,
}

/// Service status reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

/// Request/response contract of the analysis service.
///
/// Every method issues exactly one request.
pub trait AnalysisBackend: Send + Sync {
    fn analyze_lexical(&self, code: &str) -> Result<LexicalResult, TransportError>;

    fn analyze_syntactic(&self, code: &str) -> Result<SyntacticResult, TransportError>;

    fn upload_lexical(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<LexicalResult>, TransportError>;

    fn upload_syntactic(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<SyntacticResult>, TransportError>;

    fn health(&self) -> Result<HealthStatus, TransportError>;
}

/// Per-result-type access to a backend, so pipeline code can stay generic
/// over lexical and syntactic results.
pub trait Analysis: Clone + Send + Sync + 'static {
    fn analyze(backend: &dyn AnalysisBackend, code: &str) -> Result<Self, TransportError>;

    fn upload(
        backend: &dyn AnalysisBackend,
        file: &UploadFile,
    ) -> Result<UploadOutcome<Self>, TransportError>;
}

impl Analysis for LexicalResult {
    fn analyze(backend: &dyn AnalysisBackend, code: &str) -> Result<Self, TransportError> {
        backend.analyze_lexical(code)
    }

    fn upload(
        backend: &dyn AnalysisBackend,
        file: &UploadFile,
    ) -> Result<UploadOutcome<Self>, TransportError> {
        backend.upload_lexical(file)
    }
}

impl Analysis for SyntacticResult {
    fn analyze(backend: &dyn AnalysisBackend, code: &str) -> Result<Self, TransportError> {
        backend.analyze_syntactic(code)
    }

    fn upload(
        backend: &dyn AnalysisBackend,
        file: &UploadFile,
    ) -> Result<UploadOutcome<Self>, TransportError> {
        backend.upload_syntactic(file)
    }
}
