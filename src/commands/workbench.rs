use crate::config::WorkbenchConfig;
use crate::core::PipelineKind;
use crate::transport::AnalysisBackend;
use crate::tui::WorkbenchTui;
use crate::workbench::{Command, Workbench};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Open the interactive workbench, optionally preloaded with a file.
pub fn run_workbench(
    backend: Arc<dyn AnalysisBackend>,
    config: &WorkbenchConfig,
    pipeline: PipelineKind,
    preload: Option<&Path>,
) -> Result<()> {
    let mut workbench = Workbench::new(backend, config).with_active(pipeline);
    if let Some(path) = preload {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        workbench.handle(Command::SetText(text));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let mut tui = WorkbenchTui::new(workbench, runtime.handle().clone())?;
    tui.run()
}
