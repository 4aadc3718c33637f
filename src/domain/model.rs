use crate::utils::error::{LayerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the popular-libraries catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl LibraryDescriptor {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
        }
    }
}

/// Suppresses every version of `group_id:artifact_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn matches(&self, lib: &LibraryDescriptor) -> bool {
        self.group_id == lib.group_id && self.artifact_id == lib.artifact_id
    }
}

/// A `group:artifact:version` Maven coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(':').map(str::trim).collect();

        if parts.len() != 3 {
            return Err(LayerError::InvalidCoordinate {
                value: value.to_string(),
                reason: format!("expected 3 ':'-separated segments, found {}", parts.len()),
            });
        }

        const SEGMENTS: [&str; 3] = ["group id", "artifact id", "version"];
        let invalid = |reason: String| LayerError::InvalidCoordinate {
            value: value.to_string(),
            reason,
        };

        // Segments become path components under the repository and work dirs.
        for (name, part) in SEGMENTS.iter().zip(&parts) {
            if part.is_empty() {
                return Err(invalid(format!("{} is empty", name)));
            }
            if part.contains('/') || part.contains('\\') {
                return Err(invalid(format!("{} contains a path separator", name)));
            }
            if part.contains("..") || *part == "." {
                return Err(invalid(format!("{} contains a relative path component", name)));
            }
        }

        if parts[0].starts_with('.') || parts[0].ends_with('.') {
            return Err(invalid("group id starts or ends with '.'".to_string()));
        }

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
        })
    }

    /// Group id as a repository path, `org.apache.commons` → `org/apache/commons`.
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.artifact_id, self.version)
    }

    pub fn jar_name(&self) -> String {
        format!("{}.jar", self.file_stem())
    }

    pub fn pom_name(&self) -> String {
        format!("{}.pom", self.file_stem())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl FromStr for Coordinate {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// CI build matrix, serialized as `{"coordinates": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub coordinates: Vec<String>,
}

impl Matrix {
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}
