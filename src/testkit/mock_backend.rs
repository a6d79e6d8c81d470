//! In-memory analysis backend for tests.
//!
//! [`MockBackend`] implements [`AnalysisBackend`] with canned responses and
//! records every request it receives. It can also be *gated*: calls then block
//! until [`MockBackend::release`] is called, which lets tests observe a
//! pipeline while its request is still in flight.
//!
//! # Thread Safety
//!
//! `MockBackend` is `Send + Sync + Clone`; clones share state. Hand one clone
//! to the code under test and keep another to inspect requests.

use crate::core::{LexicalResult, PipelineKind, SyntacticResult, Token};
use crate::errors::TransportError;
use crate::transport::{AnalysisBackend, HealthStatus, UploadFile, UploadOutcome};
use std::sync::{Arc, Condvar, Mutex, RwLock};

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Analyze { kind: PipelineKind, code: String },
    Upload { kind: PipelineKind, filename: String },
    Health,
}

struct MockState {
    lexical: Result<LexicalResult, TransportError>,
    syntactic: Result<SyntacticResult, TransportError>,
    lexical_upload: Result<UploadOutcome<LexicalResult>, TransportError>,
    syntactic_upload: Result<UploadOutcome<SyntacticResult>, TransportError>,
    requests: Vec<MockRequest>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            lexical: Ok(LexicalResult::default()),
            syntactic: Ok(SyntacticResult::new(true, Vec::new())),
            lexical_upload: Err(TransportError::server(500, "no upload response configured")),
            syntactic_upload: Err(TransportError::server(500, "no upload response configured")),
            requests: Vec::new(),
        }
    }
}

/// Closed gates block calls until opened.
struct Gate {
    open: Mutex<bool>,
    changed: Condvar,
}

impl Gate {
    fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        while !*open {
            open = self
                .changed
                .wait(open)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    fn set(&self, value: bool) {
        *self.open.lock().unwrap_or_else(|e| e.into_inner()) = value;
        self.changed.notify_all();
    }
}

/// Canned, recording implementation of [`AnalysisBackend`].
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<RwLock<MockState>>,
    gate: Arc<Gate>,
}

impl MockBackend {
    /// Backend answering every analysis with an empty success.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            gate: Arc::new(Gate {
                open: Mutex::new(true),
                changed: Condvar::new(),
            }),
        }
    }

    fn update(self, apply: impl FnOnce(&mut MockState)) -> Self {
        apply(&mut self.state.write().unwrap_or_else(|e| e.into_inner()));
        self
    }

    pub fn with_tokens(self, tokens: Vec<Token>) -> Self {
        self.with_lexical_result(LexicalResult::new(tokens))
    }

    pub fn with_lexical_result(self, result: LexicalResult) -> Self {
        self.update(|s| s.lexical = Ok(result))
    }

    pub fn with_lexical_error(self, error: TransportError) -> Self {
        self.update(|s| s.lexical = Err(error))
    }

    pub fn with_syntactic(self, valid: bool, logs: &[&str]) -> Self {
        let result = SyntacticResult::new(valid, logs.iter().map(|l| l.to_string()).collect());
        self.update(|s| s.syntactic = Ok(result))
    }

    pub fn with_syntactic_error(self, error: TransportError) -> Self {
        self.update(|s| s.syntactic = Err(error))
    }

    pub fn with_lexical_upload(self, outcome: UploadOutcome<LexicalResult>) -> Self {
        self.update(|s| s.lexical_upload = Ok(outcome))
    }

    pub fn with_syntactic_upload(self, outcome: UploadOutcome<SyntacticResult>) -> Self {
        self.update(|s| s.syntactic_upload = Ok(outcome))
    }

    pub fn with_upload_error(self, error: TransportError) -> Self {
        self.update(|s| {
            s.lexical_upload = Err(error.clone());
            s.syntactic_upload = Err(error);
        })
    }

    /// Make calls block until [`release`](Self::release).
    pub fn gated(self) -> Self {
        self.gate.set(false);
        self
    }

    /// Unblock pending and future calls.
    pub fn release(&self) {
        self.gate.set(true);
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.read(|s| s.requests.clone())
    }

    pub fn request_count(&self) -> usize {
        self.read(|s| s.requests.len())
    }

    /// Code bodies of all analysis requests, in order.
    pub fn submitted_code(&self) -> Vec<String> {
        self.read(|s| {
            s.requests
                .iter()
                .filter_map(|r| match r {
                    MockRequest::Analyze { code, .. } => Some(code.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Record the request, wait for the gate, then answer.
    fn answer<T>(&self, request: MockRequest, pick: impl FnOnce(&MockState) -> T) -> T {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .requests
            .push(request);
        self.gate.wait();
        self.read(pick)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisBackend for MockBackend {
    fn analyze_lexical(&self, code: &str) -> Result<LexicalResult, TransportError> {
        let request = MockRequest::Analyze {
            kind: PipelineKind::Lexical,
            code: code.to_string(),
        };
        self.answer(request, |s| s.lexical.clone())
    }

    fn analyze_syntactic(&self, code: &str) -> Result<SyntacticResult, TransportError> {
        let request = MockRequest::Analyze {
            kind: PipelineKind::Syntactic,
            code: code.to_string(),
        };
        self.answer(request, |s| s.syntactic.clone())
    }

    fn upload_lexical(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<LexicalResult>, TransportError> {
        let request = MockRequest::Upload {
            kind: PipelineKind::Lexical,
            filename: file.descriptor.name.clone(),
        };
        self.answer(request, |s| s.lexical_upload.clone())
    }

    fn upload_syntactic(
        &self,
        file: &UploadFile,
    ) -> Result<UploadOutcome<SyntacticResult>, TransportError> {
        let request = MockRequest::Upload {
            kind: PipelineKind::Syntactic,
            filename: file.descriptor.name.clone(),
        };
        self.answer(request, |s| s.syntactic_upload.clone())
    }

    fn health(&self) -> Result<HealthStatus, TransportError> {
        self.answer(MockRequest::Health, |_| {
            Ok(HealthStatus {
                status: "healthy".into(),
                service: "mock".into(),
                version: "0.0.0".into(),
            })
        })
    }
}
