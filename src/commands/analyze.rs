//! One-shot analysis from the command line.
//!
//! `lex`, `parse` and `upload` run a single request through the same
//! [`Dispatcher`] the workbench uses, render the resulting state, and print
//! it in the requested format. With `--export` the plain-text report is also
//! written to disk.

use crate::cli::{OutputArgs, OutputFormat, SourceArgs};
use crate::config::WorkbenchConfig;
use crate::core::{LexicalResult, PipelineKind, SyntacticResult, TokenCategoryMap};
use crate::errors::WorkbenchError;
use crate::export::{export_filename, write_report, ExportSource, Exporter};
use crate::ingest::{FileDescriptor, IngestPolicy};
use crate::pipeline::Dispatcher;
use crate::render::{self, html::to_html, text::to_text, PipelineView, RenderedView};
use crate::transport::{AnalysisBackend, UploadFile};
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::future::Future;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Everything a one-shot command needs besides its input.
pub struct AnalyzeContext {
    pub backend: Arc<dyn AnalysisBackend>,
    pub config: WorkbenchConfig,
}

/// What a finished command reports to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// Syntactic analysis ran and rejected the code.
    InvalidCode,
}

/// Read code from `--text`, a file, or stdin.
pub fn read_source(args: &SourceArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    match &args.file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            Ok(code)
        }
    }
}

/// Analyze `code` with the `kind` pipeline and print the result.
pub fn handle_analyze(
    ctx: &AnalyzeContext,
    kind: PipelineKind,
    code: &str,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<Verdict> {
    let timeout = ctx.config.request_timeout();
    match kind {
        PipelineKind::Lexical => {
            let dispatcher = Dispatcher::<LexicalResult>::new(kind, Arc::clone(&ctx.backend), timeout);
            block_on(dispatcher.submit(code))?;
            emit_lexical(ctx, &dispatcher, output, out)
        }
        PipelineKind::Syntactic => {
            let dispatcher =
                Dispatcher::<SyntacticResult>::new(kind, Arc::clone(&ctx.backend), timeout);
            block_on(dispatcher.submit(code))?;
            emit_syntactic(ctx, &dispatcher, output, out)
        }
    }
}

/// Validate and upload `path`, then print the analysis the server ran on the
/// extracted text. When the server only extracted text, the text is printed.
pub fn handle_upload(
    ctx: &AnalyzeContext,
    kind: PipelineKind,
    path: &Path,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<Verdict> {
    let descriptor = FileDescriptor::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    IngestPolicy::new(ctx.config.upload.max_size_bytes).validate(&descriptor)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file = UploadFile::new(descriptor, bytes);

    let timeout = ctx.config.request_timeout();
    match kind {
        PipelineKind::Lexical => {
            let dispatcher = Dispatcher::<LexicalResult>::new(kind, Arc::clone(&ctx.backend), timeout);
            let upload = block_on(dispatcher.upload(file))?;
            info!(file = %upload.filename, "File loaded");
            if upload.analysis.is_none() {
                return print_extracted(&upload.content, out);
            }
            emit_lexical(ctx, &dispatcher, output, out)
        }
        PipelineKind::Syntactic => {
            let dispatcher =
                Dispatcher::<SyntacticResult>::new(kind, Arc::clone(&ctx.backend), timeout);
            let upload = block_on(dispatcher.upload(file))?;
            info!(file = %upload.filename, "File loaded");
            if upload.analysis.is_none() {
                return print_extracted(&upload.content, out);
            }
            emit_syntactic(ctx, &dispatcher, output, out)
        }
    }
}

/// Query the health endpoint of the server at `base_url`.
pub fn handle_health(
    backend: &dyn AnalysisBackend,
    base_url: &str,
    out: &mut impl Write,
) -> Result<()> {
    let status = backend
        .health()
        .map_err(|e| anyhow!(WorkbenchError::from(e).user_message()))?;
    writeln!(
        out,
        "{} {} {} ({})",
        status.service, status.version, status.status, base_url
    )?;
    Ok(())
}

fn emit_lexical(
    ctx: &AnalyzeContext,
    dispatcher: &Dispatcher<LexicalResult>,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<Verdict> {
    let state = dispatcher.state();
    let view = render::render(PipelineView::Lexical(&state), &TokenCategoryMap::builtin(), None);
    print_view(&view, output.format, out)?;
    if let Some(dir) = &output.export {
        let last = dispatcher.last_result();
        export(ctx, last.as_ref().map(ExportSource::Lexical), dir)?;
    }
    Ok(Verdict::Success)
}

fn emit_syntactic(
    ctx: &AnalyzeContext,
    dispatcher: &Dispatcher<SyntacticResult>,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<Verdict> {
    let state = dispatcher.state();
    let view = render::render(PipelineView::Syntactic(&state), &TokenCategoryMap::builtin(), None);
    print_view(&view, output.format, out)?;
    if let Some(dir) = &output.export {
        let last = dispatcher.last_result();
        export(ctx, last.as_ref().map(ExportSource::Syntactic), dir)?;
    }
    let valid = state.result().is_some_and(|result| result.valid);
    Ok(if valid {
        Verdict::Success
    } else {
        Verdict::InvalidCode
    })
}

fn print_view(view: &RenderedView, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => to_text(view),
        OutputFormat::Json => serde_json::to_string_pretty(view)? + "\n",
        OutputFormat::Html => to_html(view),
    };
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

fn print_extracted(content: &str, out: &mut impl Write) -> Result<Verdict> {
    writeln!(out, "{}", content)?;
    Ok(Verdict::Success)
}

fn export(ctx: &AnalyzeContext, source: Option<ExportSource>, dir: &Path) -> Result<()> {
    let Some(kind) = source.as_ref().map(ExportSource::kind) else {
        return Err(anyhow!(crate::errors::RenderingError::NoResult));
    };
    let now = Local::now();
    let contents = Exporter::new(&ctx.config.export.timestamp_format).serialize(source, now)?;
    let path = write_report(dir, &export_filename(kind, now.date_naive()), &contents)?;
    eprintln!("Report written to {}", path.display());
    Ok(())
}

/// Drive one request on a private runtime and surface its error the way the
/// workbench modal would phrase it.
fn block_on<T>(request: impl Future<Output = Result<T, WorkbenchError>>) -> Result<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    runtime
        .block_on(request)
        .map_err(|e| anyhow!(e.user_message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Token;
    use crate::testkit::MockBackend;
    use crate::transport::UploadOutcome;
    use pretty_assertions::assert_eq;

    fn context(backend: &MockBackend) -> AnalyzeContext {
        AnalyzeContext {
            backend: Arc::new(backend.clone()),
            config: WorkbenchConfig::default(),
        }
    }

    fn text_output() -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Text,
            export: None,
        }
    }

    #[test]
    fn lex_prints_numbered_tokens() {
        let backend = MockBackend::new().with_tokens(vec![
            Token::new("RESERVED_TOKEN", "program"),
            Token::new("ID", "teste"),
        ]);
        let mut out = Vec::new();

        let verdict = handle_analyze(
            &context(&backend),
            PipelineKind::Lexical,
            "program teste",
            &text_output(),
            &mut out,
        )
        .unwrap();

        assert_eq!(verdict, Verdict::Success);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("   1  RESERVED_TOKEN  program"));
        assert!(printed.contains("   2  ID              teste"));
        assert_eq!(backend.submitted_code(), vec!["program teste".to_string()]);
    }

    #[test]
    fn parse_reports_invalid_code() {
        let backend = MockBackend::new().with_syntactic(false, &["Syntax error at line 1"]);
        let mut out = Vec::new();

        let verdict = crate::assert_result_ok!(handle_analyze(
            &context(&backend),
            PipelineKind::Syntactic,
            "program",
            &text_output(),
            &mut out,
        ));

        assert_eq!(verdict, Verdict::InvalidCode);
        assert!(String::from_utf8(out).unwrap().starts_with("Invalid code"));
    }

    #[test]
    fn blank_code_never_reaches_the_server() {
        let backend = MockBackend::new();
        crate::assert_contains_error!(
            handle_analyze(
                &context(&backend),
                PipelineKind::Lexical,
                "  \n",
                &text_output(),
                &mut Vec::new(),
            ),
            "Please enter some code"
        );
        assert_eq!(backend.request_count(), 0);
    }

    #[test]
    fn json_output_is_tagged() {
        let backend = MockBackend::new().with_tokens(vec![Token::new("ID", "x")]);
        let mut out = Vec::new();
        let output = OutputArgs {
            format: OutputFormat::Json,
            export: None,
        };

        handle_analyze(&context(&backend), PipelineKind::Lexical, "x", &output, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["view"], "tokens");
        assert_eq!(value["items"][0]["lexeme"], "x");
    }

    #[test]
    fn export_writes_dated_report() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new().with_syntactic(true, &["Parsing completed"]);
        let output = OutputArgs {
            format: OutputFormat::Text,
            export: Some(dir.path().to_path_buf()),
        };

        handle_analyze(
            &context(&backend),
            PipelineKind::Syntactic,
            "program p; begin end.",
            &output,
            &mut Vec::new(),
        )
        .unwrap();

        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        let name = written[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("syntactic_analysis_"));
    }

    #[test]
    fn upload_rejects_unsupported_type_locally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let backend = MockBackend::new();

        let err = handle_upload(
            &context(&backend),
            PipelineKind::Lexical,
            &path,
            &text_output(),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("Unsupported file type"));
        assert_eq!(backend.request_count(), 0);
    }

    #[test]
    fn upload_prints_server_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.txt");
        std::fs::write(&path, "x").unwrap();
        let backend = MockBackend::new().with_lexical_upload(UploadOutcome {
            content: "x".into(),
            filename: "code.txt".into(),
            analysis: Some(LexicalResult::new(vec![Token::new("ID", "x")])),
        });
        let mut out = Vec::new();

        handle_upload(
            &context(&backend),
            PipelineKind::Lexical,
            &path,
            &text_output(),
            &mut out,
        )
        .unwrap();

        assert!(String::from_utf8(out).unwrap().contains("ID"));
    }

    #[test]
    fn health_prints_service_line() {
        let backend = MockBackend::new();
        let mut out = Vec::new();
        handle_health(&backend, "http://localhost:5000", &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("http://localhost:5000"));
    }
}
