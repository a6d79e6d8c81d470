//! End-to-end workbench flows: commands in, effects out, completions back.

use indoc::indoc;
use pretty_assertions::assert_eq;
use sourcelab::assert_modal;
use sourcelab::config::WorkbenchConfig;
use sourcelab::core::{LexicalResult, PipelineKind, Token};
use sourcelab::errors::TransportError;
use sourcelab::render::RenderedView;
use sourcelab::testkit::{fixed_timestamp, upload_file, MockBackend};
use sourcelab::transport::UploadOutcome;
use sourcelab::workbench::{Command, Effect, Workbench};
use std::path::PathBuf;
use std::sync::Arc;

fn workbench(backend: &MockBackend) -> Workbench {
    Workbench::new(Arc::new(backend.clone()), &WorkbenchConfig::default())
        .with_clock(fixed_timestamp)
}

/// Await spawned tasks and feed their completions back, returning the
/// effects that still need the outside world.
async fn settle(workbench: &mut Workbench, effects: Vec<Effect>) -> Vec<Effect> {
    let mut pending = effects;
    let mut rest = Vec::new();
    while let Some(effect) = pending.pop() {
        match effect {
            Effect::Spawn(task) => {
                let done = task.await;
                pending.extend(workbench.handle(done));
            }
            other => rest.push(other),
        }
    }
    rest
}

#[tokio::test]
async fn test_analyze_then_export_lexical_report() {
    let backend = MockBackend::new().with_tokens(vec![
        Token::new("RESERVED_TOKEN", "program"),
        Token::new("ID", "teste"),
    ]);
    let mut wb = workbench(&backend);
    wb.handle(Command::SetText("program teste".into()));

    let effects = wb.handle(Command::Submit);
    assert!(matches!(wb.active_view(), RenderedView::Loading { .. }));
    settle(&mut wb, effects).await;
    assert_eq!(wb.active_view().tokens().len(), 2);

    let effects = wb.handle(Command::Export);
    let [Effect::SaveReport {
        filename, contents, ..
    }] = effects.as_slice()
    else {
        panic!("expected a single report, got {:?}", effects);
    };
    assert_eq!(filename, "lexical_analysis_2026-10-18.txt");
    assert_eq!(
        contents,
        indoc! {"
            LEXICAL ANALYSIS - RESULTS
            ==================================================

            Date: 18/10/2026 14:03:09
            Total tokens: 2

            IDENTIFIED TOKENS:
            ------------------------------
            001. RESERVED_TOKEN  | program
            002. ID              | teste

            ==================================================
            Generated by sourcelab
        "}
    );
}

#[tokio::test]
async fn test_invalid_code_shows_logs_with_label() {
    let backend = MockBackend::new().with_syntactic(false, &["Syntax error at line 1"]);
    let mut wb = workbench(&backend).with_active(PipelineKind::Syntactic);
    wb.handle(Command::SetText("program".into()));

    let effects = wb.handle(Command::Submit);
    settle(&mut wb, effects).await;

    match wb.active_view() {
        RenderedView::Logs { status, text } => {
            assert_eq!(status.to_string(), "Invalid code");
            assert!(text.contains("Syntax error"));
        }
        other => panic!("expected logs, got {:?}", other),
    }
    assert!(wb.notifications().modal().is_none());
}

#[tokio::test]
async fn test_server_error_opens_modal_and_keeps_buffer() {
    let backend = MockBackend::new().with_lexical_error(TransportError::Server {
        status: 400,
        message: "Lexical error".into(),
        details: Some("Invalid character '@'".into()),
    });
    let mut wb = workbench(&backend);
    wb.handle(Command::SetText("x @ y".into()));

    let effects = wb.handle(Command::Submit);
    settle(&mut wb, effects).await;

    assert_modal!(wb, "Lexical error (Invalid character '@')");
    assert_eq!(wb.text(), "x @ y");
    assert!(!wb.is_busy(PipelineKind::Lexical));
}

#[tokio::test]
async fn test_upload_replaces_buffer_and_shows_analysis() {
    let backend = MockBackend::new().with_lexical_upload(UploadOutcome {
        content: "program teste;".into(),
        filename: "teste.txt".into(),
        analysis: Some(LexicalResult::new(vec![Token::new("RESERVED_TOKEN", "program")])),
    });
    let mut wb = workbench(&backend);
    wb.handle(Command::SetText("old".into()));

    let effects = wb.handle(Command::FileDropped(upload_file("teste.txt", "program teste;")));
    assert_eq!(wb.loaded_file().map(|f| f.name.as_str()), Some("teste.txt"));
    settle(&mut wb, effects).await;

    assert_eq!(wb.text(), "program teste;");
    assert_eq!(wb.active_view().tokens().len(), 1);
    assert_eq!(
        wb.notifications().toasts()[0].message,
        "File loaded: teste.txt"
    );
}

#[tokio::test]
async fn test_rejected_file_never_reaches_server() {
    let backend = MockBackend::new();
    let mut wb = workbench(&backend);

    let effects = wb.handle(Command::FileDropped(upload_file("slides.pdf", "%PDF")));

    assert!(effects.is_empty());
    assert_modal!(wb, "Unsupported file type");
    assert_eq!(backend.request_count(), 0);
    assert!(wb.loaded_file().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clear_while_in_flight_discards_late_result() {
    let backend = MockBackend::new()
        .with_tokens(vec![Token::new("ID", "x")])
        .gated();
    let mut wb = workbench(&backend);
    wb.handle(Command::SetText("x".into()));

    let effects = wb.handle(Command::Submit);
    assert!(wb.is_busy(PipelineKind::Lexical));

    wb.handle(Command::Clear { confirmed: true });
    assert_eq!(wb.text(), "");
    assert!(!wb.is_busy(PipelineKind::Lexical));

    backend.release();
    settle(&mut wb, effects).await;

    assert!(matches!(wb.active_view(), RenderedView::Placeholder { .. }));
    assert!(wb.notifications().modal().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_repeated_submit_while_busy_is_ignored() {
    let backend = MockBackend::new()
        .with_tokens(vec![Token::new("ID", "x")])
        .gated();
    let mut wb = workbench(&backend);
    wb.handle(Command::SetText("x".into()));

    let first = wb.handle(Command::Submit);
    let second = wb.handle(Command::Submit);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());

    backend.release();
    settle(&mut wb, first).await;
    assert_eq!(backend.request_count(), 1);
}

#[test]
fn test_confirmation_guards_clear_of_nonblank_buffer() {
    let mut wb = workbench(&MockBackend::new());
    wb.handle(Command::SetText("program p;".into()));

    wb.handle(Command::Clear { confirmed: false });
    assert!(wb.pending_confirmation().is_some());
    assert_eq!(wb.text(), "program p;");

    wb.handle(Command::Confirm(false));
    assert_eq!(wb.text(), "program p;");

    wb.handle(Command::Clear { confirmed: false });
    wb.handle(Command::Confirm(true));
    assert_eq!(wb.text(), "");
}

#[test]
fn test_saved_report_feedback() {
    let mut wb = workbench(&MockBackend::new());
    wb.handle(Command::Saved(Ok(PathBuf::from("lexical_analysis_2026-10-18.txt"))));
    assert!(wb.notifications().toasts()[0]
        .message
        .starts_with("Downloaded!"));
}
