//! Testing infrastructure for the workbench.
//!
//! - **[`MockBackend`]**: in-memory [`AnalysisBackend`](crate::transport::AnalysisBackend)
//!   with canned responses, request recording and gating
//! - **Assertion macros**: exported at the crate root
//! - **Helpers**: factory functions for common test data
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sourcelab::testkit::{sample_tokens, MockBackend};
//!
//! let backend = MockBackend::new().with_tokens(sample_tokens());
//! let workbench = Workbench::new(Arc::new(backend.clone()), &WorkbenchConfig::default());
//! // ... drive the workbench ...
//! assert_eq!(backend.request_count(), 1);
//! ```

pub mod assertions;
pub mod helpers;
pub mod mock_backend;

pub use helpers::{fixed_timestamp, sample_tokens, upload_file};
pub use mock_backend::{MockBackend, MockRequest};
