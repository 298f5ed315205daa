use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ProducerConfig;
use crate::producer::error::ProducerError;
use crate::producer::runner::{ProducerOutput, TraceProducer};

/// Runs the Prolog agent (`swipl -s wumpus_agent.pl -g start. -t halt.` by
/// default) and expects it to write the trace artifact into its working
/// directory.
pub struct ProcessProducer {
    config: ProducerConfig,
    binary_path: Option<PathBuf>,
}

impl ProcessProducer {
    pub fn new(config: ProducerConfig) -> Self {
        let binary_path = Self::find_binary(&config.executable);
        Self {
            config,
            binary_path,
        }
    }

    fn find_binary(executable: &str) -> Option<PathBuf> {
        which::which(executable).ok()
    }

    fn script_path(&self) -> PathBuf {
        self.config.working_dir.join(&self.config.script)
    }

    fn build_command(&self, binary: &Path) -> Command {
        let mut cmd = Command::new(binary);
        cmd.args(self.config.command_args());
        cmd.current_dir(&self.config.working_dir);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // The caller drops us on timeout; make sure the agent dies with us.
        cmd.kill_on_drop(true);
        cmd
    }

    fn remove_partial_trace(&self) {
        let path = self.config.trace_path();
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "Removed potentially incomplete trace"),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "Could not remove potentially incomplete trace"
            ),
        }
    }
}

#[async_trait]
impl TraceProducer for ProcessProducer {
    async fn produce(&self) -> Result<ProducerOutput, ProducerError> {
        let binary = self.binary_path.clone().ok_or_else(|| {
            ProducerError::Unavailable(format!(
                "'{}' not found in PATH. Please install SWI-Prolog.",
                self.config.executable
            ))
        })?;

        let script = self.script_path();
        if !script.exists() {
            return Err(ProducerError::Unavailable(format!(
                "agent script '{}' not found",
                script.display()
            )));
        }

        tracing::info!(command = %self.describe(), "Running trace producer");
        let output = self.build_command(&binary).output().await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ProducerError::Unavailable(format!("'{}': {}", binary.display(), err))
            } else {
                ProducerError::Io(err)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::warn!(code = ?output.status.code(), "Trace producer failed");
            self.remove_partial_trace();
            return Err(ProducerError::NonZeroExit {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(ProducerOutput {
            trace_path: self.config.trace_path(),
            stdout,
            stderr,
        })
    }

    fn is_available(&self) -> bool {
        self.binary_path.is_some() && self.script_path().exists()
    }

    fn describe(&self) -> String {
        let binary = self
            .binary_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.config.executable.clone());
        let mut parts = vec![binary];
        parts.extend(self.config.command_args());
        parts.join(" ")
    }
}
