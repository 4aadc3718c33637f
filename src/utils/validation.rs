use crate::utils::error::{LayerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LayerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A bare file name inside the data directory, with a `.json` extension.
pub fn validate_json_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    if name.contains('/') || name.contains('\\') {
        return Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Expected a file name, not a path".to_string(),
        });
    }

    match std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some("json") => Ok(()),
        Some(extension) => Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: format!("Unsupported file extension: {}. Allowed extensions: json", extension),
        }),
        None => Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
