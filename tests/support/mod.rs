#![allow(dead_code)]

use async_trait::async_trait;
use layer_builder::{CommandRunner, CommandSpec, Result};
use std::collections::VecDeque;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

pub fn killed_by_signal(signal: i32) -> ExitStatus {
    ExitStatus::from_raw(signal)
}

/// One scripted response, consumed in order by [`ScriptedRunner`].
pub struct Scripted {
    status: ExitStatus,
    stdout: String,
    stderr: String,
    effect: Option<Box<dyn FnOnce() + Send>>,
}

impl Scripted {
    pub fn exit(code: i32) -> Self {
        Self::with_status(exit_status(code))
    }

    pub fn with_status(status: ExitStatus) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            effect: None,
        }
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Side effect performed when the command "runs", e.g. Maven filling the repository.
    pub fn effect(mut self, effect: impl FnOnce() + Send + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }
}

/// Returns scripted results and records every command it is asked to run.
///
/// Clones share the script and the call log, so a test can keep a handle
/// after moving the runner into a builder.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn assert_finished(&self) {
        assert!(
            self.script.lock().unwrap().is_empty(),
            "expected no further scripted commands"
        );
    }

    fn next(&self, spec: &CommandSpec) -> Output {
        self.calls.lock().unwrap().push(spec.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {}", spec));

        if let Some(effect) = step.effect {
            effect();
        }

        Output {
            status: step.status,
            stdout: step.stdout.into_bytes(),
            stderr: step.stderr.into_bytes(),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn status(&self, spec: &CommandSpec) -> Result<ExitStatus> {
        Ok(self.next(spec).status)
    }

    async fn output(&self, spec: &CommandSpec) -> Result<Output> {
        Ok(self.next(spec))
    }
}

/// Lays out `<artifact>-<version>.pom` and `.jar` in `library_dir` the way Maven would.
pub fn populate_artifact(library_dir: &Path, file_stem: &str) {
    std::fs::create_dir_all(library_dir).unwrap();
    std::fs::write(
        library_dir.join(format!("{}.pom", file_stem)),
        "<project><modelVersion>4.0.0</modelVersion></project>",
    )
    .unwrap();
    std::fs::write(library_dir.join(format!("{}.jar", file_stem)), b"PK").unwrap();
}
