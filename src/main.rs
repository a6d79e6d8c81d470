use anyhow::Result;
use clap::Parser;
use sourcelab::cli::{Cli, Commands};
use sourcelab::commands::{self, AnalyzeContext, Verdict};
use sourcelab::config::{load_config, WorkbenchConfig};
use sourcelab::core::PipelineKind;
use sourcelab::observability::{init_tracing, install_panic_hook};
use sourcelab::transport::{AnalysisBackend, HttpBackend};
use std::io;
use std::sync::Arc;

// Main orchestrator function
fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let config = resolve_config(&cli);
    let backend: Arc<dyn AnalysisBackend> = Arc::new(HttpBackend::new(
        config.server.base_url.clone(),
        config.request_timeout(),
    ));

    let command = cli.command.unwrap_or(Commands::Tui {
        pipeline: PipelineKind::Lexical,
        file: None,
    });

    let verdict = match command {
        Commands::Tui { pipeline, file } => {
            commands::run_workbench(backend, &config, pipeline, file.as_deref())?;
            Verdict::Success
        }
        Commands::Lex(args) => run_analysis(backend, config, PipelineKind::Lexical, args)?,
        Commands::Parse(args) => run_analysis(backend, config, PipelineKind::Syntactic, args)?,
        Commands::Upload {
            file,
            pipeline,
            output,
        } => {
            let ctx = AnalyzeContext { backend, config };
            commands::handle_upload(&ctx, pipeline, &file, &output, &mut io::stdout().lock())?
        }
        Commands::Health => {
            commands::handle_health(backend.as_ref(), &config.server.base_url, &mut io::stdout())?;
            Verdict::Success
        }
        Commands::Init { force } => {
            commands::init_config(force)?;
            Verdict::Success
        }
    };

    if verdict == Verdict::InvalidCode {
        std::process::exit(1);
    }
    Ok(())
}

// Pure function resolving configuration from file, environment and flags
fn resolve_config(cli: &Cli) -> WorkbenchConfig {
    let mut config = load_config(cli.config.as_deref());
    if let Some(server) = &cli.server {
        config.server.base_url = server.trim_end_matches('/').to_string();
    }
    config
}

fn run_analysis(
    backend: Arc<dyn AnalysisBackend>,
    config: WorkbenchConfig,
    kind: PipelineKind,
    args: sourcelab::cli::SourceArgs,
) -> Result<Verdict> {
    let code = commands::read_source(&args)?;
    let ctx = AnalyzeContext { backend, config };
    commands::handle_analyze(&ctx, kind, &code, &args.output, &mut io::stdout().lock())
}
