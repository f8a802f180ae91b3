//! Child-process executor: builds Go to wasm and runs JavaScript with Node.

use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use codepair_core::config::ExecutionConfig;

use crate::error::ExecutionError;
use crate::executor::{ExecutionOutput, ExecutionRequest, Executor};
use crate::language::Language;

const WASM_ARTIFACT: &str = "main.wasm";

/// Runs each request in a fresh temporary directory with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: ExecutionConfig,
    /// Limits concurrent toolchain processes.
    slots: Arc<Semaphore>,
}

impl ProcessExecutor {
    /// Create an executor from configuration.
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
        }
    }

    /// Resolve the request language, falling back to the configured default.
    pub fn resolve_language(&self, requested: Option<&str>) -> Result<Language, ExecutionError> {
        match requested {
            Some(name) if !name.trim().is_empty() => name.parse(),
            _ => self.config.default_language.parse(),
        }
    }

    async fn build_go(&self, workdir: &Path) -> Result<ExecutionOutput, ExecutionError> {
        let mut cmd = Command::new(&self.config.go_binary);
        cmd.args(["build", "-o", WASM_ARTIFACT, Language::Go.source_file()])
            .env("GOOS", "js")
            .env("GOARCH", "wasm");

        let output = self.run(cmd, &self.config.go_binary, workdir).await?;
        if !output.status.success() {
            let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
            diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ExecutionError::CompileError { diagnostics });
        }

        let wasm = tokio::fs::read(workdir.join(WASM_ARTIFACT)).await?;
        Ok(ExecutionOutput {
            payload: Bytes::from(wasm),
            content_type: Language::Go.content_type(),
        })
    }

    async fn run_node(&self, workdir: &Path) -> Result<ExecutionOutput, ExecutionError> {
        let mut cmd = Command::new(&self.config.node_binary);
        cmd.arg(Language::JavaScript.source_file());

        let output = self.run(cmd, &self.config.node_binary, workdir).await?;
        if !output.status.success() {
            return Err(ExecutionError::CompileError {
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(ExecutionOutput {
            payload: Bytes::from(output.stdout),
            content_type: Language::JavaScript.content_type(),
        })
    }

    /// Spawn `cmd` inside `workdir` and collect its output, killing it on timeout.
    async fn run(
        &self,
        mut cmd: Command,
        program: &str,
        workdir: &Path,
    ) -> Result<Output, ExecutionError> {
        cmd.current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let result = tokio::time::timeout(self.config.timeout(), cmd.output()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                debug!(
                    program,
                    code = output.status.code().unwrap_or(-1),
                    elapsed_ms,
                    "Toolchain process exited"
                );
                Ok(output)
            }
            Ok(Err(source)) => {
                error!(program, error = %source, "Failed to start toolchain process");
                Err(ExecutionError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
            Err(_) => {
                // Dropping the output future kills the child.
                warn!(
                    program,
                    timeout_s = self.config.timeout_seconds,
                    "Toolchain process timed out, killed"
                );
                Err(ExecutionError::Timeout {
                    timeout_seconds: self.config.timeout_seconds,
                })
            }
        }
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    #[instrument(skip_all, fields(language))]
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutput, ExecutionError> {
        if !self.config.enabled {
            return Err(ExecutionError::Disabled);
        }
        if request.code.len() > self.config.max_source_bytes {
            return Err(ExecutionError::SourceTooLarge {
                size: request.code.len(),
                limit: self.config.max_source_bytes,
            });
        }

        let language = self.resolve_language(request.language.as_deref())?;
        tracing::Span::current().record("language", tracing::field::display(language));

        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| ExecutionError::SlotsClosed)?;

        let workdir = tempfile::Builder::new()
            .prefix("codepair-build-")
            .tempdir()?;
        tokio::fs::write(workdir.path().join(language.source_file()), &request.code).await?;

        let start = Instant::now();
        let result = match language {
            Language::Go => self.build_go(workdir.path()).await,
            Language::JavaScript => self.run_node(workdir.path()).await,
        };

        match &result {
            Ok(output) => info!(
                bytes = output.payload.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Execution succeeded"
            ),
            Err(ExecutionError::CompileError { .. }) => {
                info!("Execution rejected with diagnostics")
            }
            Err(e) => warn!(error = %e, "Execution failed"),
        }

        if let Err(e) = workdir.close() {
            warn!(error = %e, "Failed to remove build directory");
        }

        result
    }
}
