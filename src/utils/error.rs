use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON from {path}: {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid coordinate '{value}': {reason}")]
    InvalidCoordinate { value: String, reason: String },

    #[error("Failed to start '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency resolution failed for {coordinate} (exit code {code:?})")]
    ResolutionFailed {
        coordinate: String,
        code: Option<i32>,
    },

    #[error("Artifact directory for {coordinate} not found at {path}")]
    ArtifactNotFound { coordinate: String, path: PathBuf },

    #[error("Classpath computation failed for {coordinate}: {message}")]
    ClasspathFailed { coordinate: String, message: String },

    #[error("native-image for {coordinate} was terminated without an exit code")]
    CompilerTerminated { coordinate: String },

    #[error("No native-image path given on the command line or in the config file")]
    MissingNativeImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Subprocess,
    Filesystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LayerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LayerError::ConfigError { .. }
            | LayerError::InvalidConfigValueError { .. }
            | LayerError::MissingNativeImage => ErrorCategory::Configuration,
            LayerError::JsonError { .. }
            | LayerError::SerializationError(_)
            | LayerError::InvalidCoordinate { .. } => ErrorCategory::Input,
            LayerError::CommandSpawn { .. }
            | LayerError::ResolutionFailed { .. }
            | LayerError::ClasspathFailed { .. }
            | LayerError::CompilerTerminated { .. } => ErrorCategory::Subprocess,
            LayerError::IoError(_) | LayerError::ArtifactNotFound { .. } => {
                ErrorCategory::Filesystem
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Maven talks to the network; a rerun may well succeed.
            LayerError::ResolutionFailed { .. } | LayerError::ClasspathFailed { .. } => {
                ErrorSeverity::Medium
            }
            LayerError::CompilerTerminated { .. } | LayerError::IoError(_) => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code used by the binary when a command fails with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LayerError::IoError(_) => "Check file permissions and available disk space",
            LayerError::JsonError { .. } | LayerError::SerializationError(_) => {
                "Make sure the catalog and exclusion files are JSON arrays of objects"
            }
            LayerError::ConfigError { .. } | LayerError::InvalidConfigValueError { .. } => {
                "Review layer-builder.toml and the command line arguments"
            }
            LayerError::InvalidCoordinate { .. } => {
                "Use the form group:artifact:version, e.g. com.google.guava:guava:33.0.0-jre"
            }
            LayerError::CommandSpawn { .. } => {
                "Make sure the program is installed and on PATH, or configure its full path"
            }
            LayerError::ResolutionFailed { .. } => {
                "Verify the coordinate exists in the configured repositories and retry"
            }
            LayerError::ArtifactNotFound { .. } => {
                "Check that Maven resolved into the configured local repository"
            }
            LayerError::ClasspathFailed { .. } => {
                "Run the exec:exec goal manually in the artifact directory to see the Maven error"
            }
            LayerError::CompilerTerminated { .. } => {
                "native-image was killed; check memory limits on the build machine"
            }
            LayerError::MissingNativeImage => {
                "Pass the native-image path as the second argument or set [native_image].path"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LayerError::ArtifactNotFound { coordinate, path } => {
                format!("{} was not found at {}", coordinate, path.display())
            }
            LayerError::ResolutionFailed { coordinate, .. } => {
                format!("Maven could not resolve {}", coordinate)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_severity() {
        let resolution = LayerError::ResolutionFailed {
            coordinate: "a:b:1".to_string(),
            code: Some(1),
        };
        assert_eq!(resolution.category(), ErrorCategory::Subprocess);
        assert_eq!(resolution.exit_code(), 2);

        let missing = LayerError::ArtifactNotFound {
            coordinate: "a:b:1".to_string(),
            path: PathBuf::from("/tmp/repo/a/b/1"),
        };
        assert_eq!(missing.category(), ErrorCategory::Filesystem);
        assert_eq!(missing.exit_code(), 1);
        assert!(missing.user_friendly_message().contains("/tmp/repo/a/b/1"));

        assert_eq!(LayerError::MissingNativeImage.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = vec![
            LayerError::IoError(std::io::Error::other("disk full")),
            LayerError::ConfigError {
                message: "bad".to_string(),
            },
            LayerError::InvalidCoordinate {
                value: "x".to_string(),
                reason: "bad".to_string(),
            },
            LayerError::ClasspathFailed {
                coordinate: "a:b:1".to_string(),
                message: "bad".to_string(),
            },
            LayerError::CompilerTerminated {
                coordinate: "a:b:1".to_string(),
            },
            LayerError::MissingNativeImage,
        ];

        for error in errors {
            assert_ne!(error.exit_code(), 0, "{} must not exit successfully", error);
        }
    }
}
