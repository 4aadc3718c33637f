use crate::core::ConfigProvider;
use crate::utils::error::{LayerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "layer-builder.toml";
pub const DEFAULT_CATALOG_FILE: &str = "popular-maven-libraries.json";
pub const DEFAULT_EXCLUDE_FILE: &str = "exclude-file.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub maven: MavenConfig,
    pub native_image: NativeImageConfig,
    pub matrix: MatrixConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenConfig {
    pub executable: String,
    pub repository: Option<PathBuf>,
    pub remote_repositories: Vec<String>,
}

impl Default for MavenConfig {
    fn default() -> Self {
        Self {
            executable: "mvn".to_string(),
            repository: None,
            remote_repositories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeImageConfig {
    pub path: Option<String>,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub catalog_file: String,
    pub exclude_file: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            exclude_file: DEFAULT_EXCLUDE_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl LayerConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| LayerError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given; otherwise `layer-builder.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parses TOML after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LayerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LayerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("maven.executable", &self.maven.executable)?;
        validation::validate_path("maven.executable", &self.maven.executable)?;

        if let Some(repository) = &self.maven.repository {
            validation::validate_path("maven.repository", &repository.to_string_lossy())?;
        }

        for url in &self.maven.remote_repositories {
            validation::validate_url("maven.remote_repositories", url)?;
        }

        if let Some(path) = &self.native_image.path {
            validation::validate_path("native_image.path", path)?;
        }

        validation::validate_json_file_name("matrix.catalog_file", &self.matrix.catalog_file)?;
        validation::validate_json_file_name("matrix.exclude_file", &self.matrix.exclude_file)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for LayerConfig {
    fn maven_executable(&self) -> &str {
        &self.maven.executable
    }

    fn repository_root(&self) -> Option<&Path> {
        self.maven.repository.as_deref()
    }

    fn remote_repositories(&self) -> &[String] {
        &self.maven.remote_repositories
    }

    fn native_image_path(&self) -> Option<&str> {
        self.native_image.path.as_deref()
    }

    fn native_image_extra_args(&self) -> &[String] {
        &self.native_image.extra_args
    }
}

impl Validate for LayerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
