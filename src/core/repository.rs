use crate::core::Coordinate;
use crate::utils::error::{LayerError, Result};
use std::path::{Path, PathBuf};

/// Layout of a Maven local repository (`~/.m2/repository` by default).
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<home>/.m2/repository`.
    pub fn user_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| LayerError::ConfigError {
            message: "Cannot determine the home directory; set [maven].repository".to_string(),
        })?;
        Ok(Self::new(home.join(".m2").join("repository")))
    }

    pub fn from_config(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::new(root).absolute(),
            None => Self::user_default(),
        }
    }

    /// Anchors a relative root at the current directory.
    ///
    /// native-image runs inside the output directory, so jar paths handed to
    /// it must not depend on the caller's working directory.
    pub fn absolute(&self) -> Result<Self> {
        Ok(Self::new(std::path::absolute(&self.root)?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_dir(&self, coordinate: &Coordinate) -> PathBuf {
        self.root
            .join(coordinate.group_path())
            .join(&coordinate.artifact_id)
            .join(&coordinate.version)
    }

    pub fn jar_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.artifact_dir(coordinate).join(coordinate.jar_name())
    }

    pub fn pom_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.artifact_dir(coordinate).join(coordinate.pom_name())
    }
}
