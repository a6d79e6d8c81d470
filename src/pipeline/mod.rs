//! Per-pipeline workflow state and single-flight control.
//!
//! A [`Pipeline`] is the owned state of one analysis workflow (lexical or
//! syntactic). Submissions go through [`Pipeline::begin`], which hands out a
//! [`Ticket`] only when nothing is in flight; the response is applied with
//! [`Pipeline::complete`] and only if its ticket is still the outstanding one.
//! That guarantees responses are applied in request order.
//!
//! [`Dispatcher`] wraps a pipeline with the async request machinery.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, Finished};

use crate::errors::{TransportError, WorkbenchError};
use tracing::{debug, warn};

/// Lifecycle stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState<R> {
    #[default]
    Idle,
    Submitting,
    Displaying(R),
    Failed(WorkbenchError),
}

impl<R> WorkflowState<R> {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn result(&self) -> Option<&R> {
        match self {
            Self::Displaying(result) => Some(result),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Displaying(_) => "displaying",
            Self::Failed(_) => "failed",
        }
    }
}

/// Proof that a request was admitted by the single-flight guard.
#[must_use = "a ticket must be completed, or the pipeline stays busy"]
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a finished request delivers to its pipeline.
///
/// `Ok(None)` is a success that carried no analysis (an upload whose response
/// only had the extracted text).
pub type Completion<R> = Result<Option<R>, WorkbenchError>;

/// Owned state of one analysis workflow.
#[derive(Debug, Clone)]
pub struct Pipeline<R> {
    state: WorkflowState<R>,
    last_result: Option<R>,
    in_flight: Option<u64>,
    next_seq: u64,
}

impl<R: Clone> Pipeline<R> {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
            last_result: None,
            in_flight: None,
            next_seq: 1,
        }
    }

    pub fn state(&self) -> &WorkflowState<R> {
        &self.state
    }

    /// Last successful result, kept even while a later failure is shown.
    pub fn last_result(&self) -> Option<&R> {
        self.last_result.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Admit a request, or refuse if one is already outstanding.
    pub fn begin(&mut self) -> Result<Ticket, TransportError> {
        if let Some(seq) = self.in_flight {
            debug!(outstanding = seq, "Rejecting submission while request in flight");
            return Err(TransportError::InFlight);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.state = WorkflowState::Submitting;
        Ok(Ticket { seq })
    }

    /// Apply a response. Returns `false` when the ticket is stale (the
    /// pipeline was reset after the request was issued) and nothing changed.
    pub fn complete(&mut self, ticket: Ticket, completion: Completion<R>) -> bool {
        if self.in_flight != Some(ticket.seq) {
            warn!(
                seq = ticket.seq,
                outstanding = ?self.in_flight,
                "Dropping stale response"
            );
            return false;
        }
        self.in_flight = None;
        self.state = match completion {
            Ok(Some(result)) => {
                self.last_result = Some(result.clone());
                WorkflowState::Displaying(result)
            }
            Ok(None) => match &self.last_result {
                Some(previous) => WorkflowState::Displaying(previous.clone()),
                None => WorkflowState::Idle,
            },
            Err(error) => WorkflowState::Failed(error),
        };
        true
    }

    /// Forget results and abandon any outstanding request.
    pub fn reset(&mut self) {
        self.state = WorkflowState::Idle;
        self.last_result = None;
        self.in_flight = None;
    }
}

impl<R: Clone> Default for Pipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}
