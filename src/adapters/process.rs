use crate::domain::ports::{CommandRunner, CommandSpec};
use crate::utils::error::{LayerError, Result};
use async_trait::async_trait;
use std::process::{ExitStatus, Output, Stdio};
use tokio::process::Command;

/// Runs commands on the host through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> LayerError {
        LayerError::CommandSpawn {
            program: spec.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn status(&self, spec: &CommandSpec) -> Result<ExitStatus> {
        tracing::debug!("Running: {}", spec);
        let status = Self::command(spec)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| Self::spawn_error(spec, e))?;
        tracing::debug!("{} exited with {}", spec.program, status);
        Ok(status)
    }

    async fn output(&self, spec: &CommandSpec) -> Result<Output> {
        tracing::debug!("Running (captured): {}", spec);
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Self::spawn_error(spec, e))?;
        tracing::debug!("{} exited with {}", spec.program, output.status);
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_output_captures_stdout_in_working_directory() {
        let dir = TempDir::new().unwrap();
        let expected = dir.path().canonicalize().unwrap();
        let spec = CommandSpec::new("sh")
            .args(["-c", "pwd -P"])
            .current_dir(dir.path());

        let output = ProcessRunner::new().output(&spec).await.unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.trim_end(), expected.to_string_lossy());
    }

    #[tokio::test]
    async fn test_status_reports_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 7"]);
        let status = ProcessRunner::new().status(&spec).await.unwrap();
        assert_eq!(status.code(), Some(7));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4f1c");
        let err = ProcessRunner::new().status(&spec).await.unwrap_err();
        assert!(matches!(err, LayerError::CommandSpawn { ref program, .. } if program == "definitely-not-a-real-program-4f1c"));
    }
}
