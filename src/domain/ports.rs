use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

/// A subprocess invocation: program, argument list and working directory.
///
/// The working directory belongs to the invocation; the caller's own
/// working directory is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "(in {}) ", dir.display())?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion with inherited stdio.
    async fn status(&self, spec: &CommandSpec) -> Result<ExitStatus>;

    /// Runs to completion capturing stdout and stderr.
    async fn output(&self, spec: &CommandSpec) -> Result<Output>;
}

pub trait ConfigProvider: Send + Sync {
    fn maven_executable(&self) -> &str;
    /// Local repository root; `None` means `<home>/.m2/repository`.
    fn repository_root(&self) -> Option<&Path>;
    fn remote_repositories(&self) -> &[String];
    fn native_image_path(&self) -> Option<&str>;
    fn native_image_extra_args(&self) -> &[String];
}
