//! Async request dispatch for one pipeline.

use super::{Pipeline, WorkflowState};
use crate::core::PipelineKind;
use crate::errors::{TransportError, ValidationError, WorkbenchError};
use crate::transport::{Analysis, AnalysisBackend, UploadFile, UploadOutcome};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A request that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished<T> {
    pub outcome: Result<T, WorkbenchError>,
    /// `false` when the pipeline was reset while the request was in flight
    /// and the outcome was dropped.
    pub applied: bool,
}

/// Submits text or files to one analysis endpoint.
///
/// Cloning is cheap and clones share the same pipeline, so a clone can be
/// moved into a spawned task while the UI keeps reading state from another.
/// The pipeline lock is never held across an await point.
pub struct Dispatcher<R> {
    kind: PipelineKind,
    backend: Arc<dyn AnalysisBackend>,
    pipeline: Arc<Mutex<Pipeline<R>>>,
    timeout: Duration,
}

impl<R> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            backend: Arc::clone(&self.backend),
            pipeline: Arc::clone(&self.pipeline),
            timeout: self.timeout,
        }
    }
}

impl<R: Analysis> Dispatcher<R> {
    pub fn new(kind: PipelineKind, backend: Arc<dyn AnalysisBackend>, timeout: Duration) -> Self {
        Self {
            kind,
            backend,
            pipeline: Arc::new(Mutex::new(Pipeline::new())),
            timeout,
        }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Copy of the current workflow state.
    pub fn state(&self) -> WorkflowState<R> {
        self.pipeline.lock().state().clone()
    }

    pub fn last_result(&self) -> Option<R> {
        self.pipeline.lock().last_result().cloned()
    }

    pub fn is_busy(&self) -> bool {
        self.pipeline.lock().is_busy()
    }

    pub fn reset(&self) {
        self.pipeline.lock().reset();
    }

    /// Analyze `text`.
    ///
    /// Blank text fails with [`ValidationError::EmptyInput`] without touching
    /// the network or the pipeline state. While another request is in flight
    /// the call is refused with [`TransportError::InFlight`] and nothing is
    /// sent.
    pub async fn submit(&self, text: &str) -> Result<R, WorkbenchError> {
        self.start(text)?.await.outcome
    }

    /// Admit a submission now and return the request as a future.
    ///
    /// Validation and the single-flight check happen before this returns, so
    /// the pipeline is already `Submitting` when the caller gets the future.
    pub fn start(
        &self,
        text: &str,
    ) -> Result<impl Future<Output = Finished<R>> + Send + 'static, WorkbenchError> {
        let code = text.trim();
        if code.is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }

        let ticket = self.pipeline.lock().begin()?;
        info!(pipeline = %self.kind, seq = ticket.seq(), chars = code.len(), "Submitting analysis");

        let this = self.clone();
        let code = code.to_string();
        Ok(async move {
            let backend = Arc::clone(&this.backend);
            let outcome = this
                .run(move || R::analyze(backend.as_ref(), &code))
                .await;

            this.log_outcome(&outcome);
            let applied = this
                .pipeline
                .lock()
                .complete(ticket, outcome.clone().map(Some));
            Finished { outcome, applied }
        })
    }

    /// Upload an already accepted file through this pipeline's endpoint.
    ///
    /// Shares the single-flight slot with [`submit`](Self::submit), so an
    /// upload and an analysis of the same pipeline never overlap.
    pub async fn upload(&self, file: UploadFile) -> Result<UploadOutcome<R>, WorkbenchError> {
        self.start_upload(file)?.await.outcome
    }

    pub fn start_upload(
        &self,
        file: UploadFile,
    ) -> Result<impl Future<Output = Finished<UploadOutcome<R>>> + Send + 'static, WorkbenchError>
    {
        let ticket = self.pipeline.lock().begin()?;
        info!(
            pipeline = %self.kind,
            seq = ticket.seq(),
            file = %file.descriptor.name,
            bytes = file.bytes.len(),
            "Uploading file"
        );

        let this = self.clone();
        Ok(async move {
            let backend = Arc::clone(&this.backend);
            let outcome = this
                .run(move || R::upload(backend.as_ref(), &file))
                .await;

            this.log_outcome(&outcome);
            let completion = outcome
                .as_ref()
                .map(|upload| upload.analysis.clone())
                .map_err(Clone::clone);
            let applied = this.pipeline.lock().complete(ticket, completion);
            Finished { outcome, applied }
        })
    }

    /// Run a blocking backend call off the async thread, bounded by the
    /// configured timeout.
    async fn run<T, F>(&self, call: F) -> Result<T, WorkbenchError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TransportError> + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(call);
        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => result.map_err(WorkbenchError::from),
            Ok(Err(join_error)) => Err(TransportError::Network(format!(
                "request task failed: {}",
                join_error
            ))
            .into()),
            Err(_) => Err(TransportError::Timeout {
                secs: self.timeout.as_secs(),
            }
            .into()),
        }
    }

    fn log_outcome<T>(&self, outcome: &Result<T, WorkbenchError>) {
        match outcome {
            Ok(_) => debug!(pipeline = %self.kind, "Request succeeded"),
            Err(error) => warn!(pipeline = %self.kind, %error, "Request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LexicalResult, SyntacticResult, Token};
    use crate::testkit::MockBackend;

    fn dispatcher<R: Analysis>(kind: PipelineKind, backend: &MockBackend) -> Dispatcher<R> {
        Dispatcher::new(kind, Arc::new(backend.clone()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn blank_text_never_reaches_backend() {
        let backend = MockBackend::new();
        let lexical = dispatcher::<LexicalResult>(PipelineKind::Lexical, &backend);

        let result = lexical.submit(" \n\t  ").await;

        assert_eq!(result, Err(ValidationError::EmptyInput.into()));
        assert_eq!(backend.request_count(), 0);
        assert_eq!(lexical.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn sends_trimmed_text_once() {
        let backend = MockBackend::new().with_tokens(vec![Token::new("ID", "x")]);
        let lexical = dispatcher::<LexicalResult>(PipelineKind::Lexical, &backend);

        let result = lexical.submit("  x  ").await.unwrap();

        assert_eq!(result.tokens, vec![Token::new("ID", "x")]);
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.submitted_code(), vec!["x".to_string()]);
        assert_eq!(lexical.state(), WorkflowState::Displaying(result));
    }

    #[tokio::test]
    async fn server_failure_moves_to_failed() {
        let backend =
            MockBackend::new().with_syntactic_error(TransportError::server(500, "boom"));
        let syntactic = dispatcher::<SyntacticResult>(PipelineKind::Syntactic, &backend);

        let result = syntactic.submit("program p;").await;

        let expected: WorkbenchError = TransportError::server(500, "boom").into();
        assert_eq!(result, Err(expected.clone()));
        assert_eq!(syntactic.state(), WorkflowState::Failed(expected));
        assert!(!syntactic.is_busy());
    }

    #[tokio::test]
    async fn start_marks_submitting_before_the_request_runs() {
        let backend = MockBackend::new();
        let lexical = dispatcher::<LexicalResult>(PipelineKind::Lexical, &backend);

        let pending = lexical.start("x").unwrap();
        assert!(lexical.state().is_submitting());
        assert_eq!(
            lexical.start("y").err(),
            Some(TransportError::InFlight.into())
        );

        let finished = pending.await;
        assert!(finished.applied);
        assert_eq!(backend.submitted_code(), vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn reset_while_in_flight_drops_the_outcome() {
        let backend = MockBackend::new().with_tokens(vec![Token::new("ID", "x")]);
        let lexical = dispatcher::<LexicalResult>(PipelineKind::Lexical, &backend);

        let pending = lexical.start("x").unwrap();
        lexical.reset();
        let finished = pending.await;

        assert!(!finished.applied);
        assert!(finished.outcome.is_ok());
        assert_eq!(lexical.state(), WorkflowState::Idle);
        assert_eq!(lexical.last_result(), None);
    }

    #[tokio::test]
    async fn upload_without_analysis_keeps_previous_result() {
        let backend = MockBackend::new()
            .with_tokens(vec![Token::new("ID", "a")])
            .with_lexical_upload(UploadOutcome {
                content: "b".into(),
                filename: "b.txt".into(),
                analysis: None,
            });
        let lexical = dispatcher::<LexicalResult>(PipelineKind::Lexical, &backend);
        let first = lexical.submit("a").await.unwrap();

        let file = crate::testkit::upload_file("b.txt", "b");
        let outcome = lexical.upload(file).await.unwrap();

        assert_eq!(outcome.content, "b");
        assert_eq!(lexical.state(), WorkflowState::Displaying(first));
    }

    #[tokio::test]
    async fn timeout_fails_and_reenables() {
        let backend = MockBackend::new().gated();
        let lexical: Dispatcher<LexicalResult> = Dispatcher::new(
            PipelineKind::Lexical,
            Arc::new(backend.clone()),
            Duration::from_millis(50),
        );

        let result = lexical.submit("x").await;
        backend.release();

        assert_eq!(result, Err(TransportError::Timeout { secs: 0 }.into()));
        assert!(!lexical.is_busy());
    }
}
