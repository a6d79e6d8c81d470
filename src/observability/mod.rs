//! Logging and crash reporting.
//!
//! ## Usage
//!
//! ```ignore
//! use sourcelab::observability::{init_tracing, install_panic_hook};
//!
//! fn main() {
//!     install_panic_hook();
//!     init_tracing(0);
//!     // ... rest of application
//! }
//! ```

pub mod panic_hook;
pub mod tracing;

pub use self::tracing::{init_tracing, is_tui_active, set_tui_active, LOG_ENV_VAR};
pub use panic_hook::install_panic_hook;
