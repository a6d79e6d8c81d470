use crate::core::PipelineKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sourcelab")]
#[command(about = "Terminal workbench for a remote lexical and syntactic analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analysis server base URL (overrides config and SOURCELAB_SERVER)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Configuration file (defaults to the nearest .sourcelab.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    ///
    /// Logs go to stderr and are muted while the workbench owns the
    /// terminal. SOURCELAB_LOG takes precedence when set.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Defaults to the interactive workbench
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Open the interactive workbench
    Tui {
        /// Pipeline selected at startup
        #[arg(long, value_enum, default_value = "lexical")]
        pipeline: PipelineKind,

        /// Preload the editor with this file's contents
        file: Option<PathBuf>,
    },

    /// Run lexical analysis on code and print the tokens
    Lex(SourceArgs),

    /// Run syntactic analysis on code and print the verdict and logs
    ///
    /// Exits with status 1 when the code is invalid.
    Parse(SourceArgs),

    /// Upload a .txt or .docx file for server-side extraction and analysis
    Upload {
        /// File to upload
        file: PathBuf,

        /// Pipeline that analyzes the extracted text
        #[arg(short, long, value_enum, default_value = "lexical")]
        pipeline: PipelineKind,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check that the analysis server is reachable
    Health,

    /// Initialize a .sourcelab.toml configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Where the code to analyze comes from.
#[derive(Args, Debug, PartialEq)]
pub struct SourceArgs {
    /// File to read code from (use - for stdin)
    #[arg(conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Analyze this text instead of a file
    #[arg(short, long)]
    pub text: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, PartialEq)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the plain-text report into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// Rendered view as JSON
    Json,
    /// HTML fragment, escaped for embedding
    Html,
}
