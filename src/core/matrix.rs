use crate::config::toml_config::MatrixConfig;
use crate::core::{Exclusion, LibraryDescriptor, Matrix};
use crate::utils::error::{LayerError, Result};
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Where the generated matrix goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum MatrixOutput {
    /// `::set-output name=matrix::<json>` on stdout
    #[default]
    SetOutput,
    /// `matrix=<json>` appended to the file named by `$GITHUB_OUTPUT`
    GithubOutput,
    /// The bare JSON document on stdout
    Json,
}

pub struct MatrixGenerator {
    catalog_path: PathBuf,
    exclude_path: PathBuf,
}

impl MatrixGenerator {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::with_files(dir, &MatrixConfig::default())
    }

    pub fn with_files(dir: impl AsRef<Path>, files: &MatrixConfig) -> Self {
        let dir = dir.as_ref();
        Self {
            catalog_path: dir.join(&files.catalog_file),
            exclude_path: dir.join(&files.exclude_file),
        }
    }

    pub fn run(&self) -> Result<Matrix> {
        tracing::debug!("Loading catalog from {}", self.catalog_path.display());
        let catalog = load_catalog(&self.catalog_path)?;
        tracing::debug!("Loading exclusions from {}", self.exclude_path.display());
        let exclusions = load_exclusions(&self.exclude_path)?;

        let matrix = generate(&catalog, &exclusions);
        tracing::info!(
            "📋 Catalog: {} libraries, {} excluded, {} coordinates emitted",
            catalog.len(),
            catalog.len() - matrix.len(),
            matrix.len()
        );

        Ok(matrix)
    }
}

fn load_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| LayerError::ConfigError {
        message: format!("Cannot read {}: {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|source| LayerError::JsonError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_catalog(path: &Path) -> Result<Vec<LibraryDescriptor>> {
    load_json_array(path)
}

pub fn load_exclusions(path: &Path) -> Result<Vec<Exclusion>> {
    load_json_array(path)
}

pub fn is_excluded(lib: &LibraryDescriptor, exclusions: &[Exclusion]) -> bool {
    exclusions.iter().any(|excluded| excluded.matches(lib))
}

/// Catalog order is preserved; excluded libraries are dropped.
pub fn generate(catalog: &[LibraryDescriptor], exclusions: &[Exclusion]) -> Matrix {
    let coordinates = catalog
        .iter()
        .filter(|lib| {
            let skip = is_excluded(lib, exclusions);
            if skip {
                tracing::debug!("Excluding {}:{}", lib.group_id, lib.artifact_id);
            }
            !skip
        })
        .map(|lib| lib.coordinate().to_string())
        .collect();

    Matrix { coordinates }
}

/// Writes the stdout forms of the matrix to `writer`.
pub fn write_matrix<W: Write>(matrix: &Matrix, output: MatrixOutput, writer: &mut W) -> Result<()> {
    let json = serde_json::to_string(matrix)?;
    match output {
        MatrixOutput::SetOutput => writeln!(writer, "::set-output name=matrix::{}", json)?,
        MatrixOutput::Json => writeln!(writer, "{}", json)?,
        MatrixOutput::GithubOutput => {
            return Err(LayerError::ConfigError {
                message: "github-output is written to a file, not a stream".to_string(),
            })
        }
    }
    Ok(())
}

pub fn append_github_output(path: &Path, matrix: &Matrix) -> Result<()> {
    let json = serde_json::to_string(matrix)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "matrix={}", json)?;
    Ok(())
}

pub fn emit(matrix: &Matrix, output: MatrixOutput) -> Result<()> {
    match output {
        MatrixOutput::GithubOutput => {
            let path = std::env::var_os(GITHUB_OUTPUT_ENV).ok_or_else(|| LayerError::ConfigError {
                message: format!("{} is not set; use --output set-output outside GitHub Actions", GITHUB_OUTPUT_ENV),
            })?;
            append_github_output(Path::new(&path), matrix)
        }
        other => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_matrix(matrix, other, &mut handle)
        }
    }
}
