//! CLI command implementations.
//!
//! Available commands:
//! - **tui** (default): the interactive workbench
//! - **lex** / **parse**: one-shot lexical or syntactic analysis
//! - **upload**: send a .txt or .docx file for extraction and analysis
//! - **health**: check the analysis server
//! - **init**: write a default `.sourcelab.toml`

pub mod analyze;
pub mod init;
pub mod workbench;

pub use analyze::{handle_analyze, handle_health, handle_upload, read_source, AnalyzeContext, Verdict};
pub use init::init_config;
pub use workbench::run_workbench;
