//! Host map loading from disk.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use thiserror::Error;

use crate::config::validation::{validate_host_map, ValidationError};
use crate::routing::HostMap;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid host map: {0}")]
    Shape(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the host map from a YAML file.
pub fn load_host_map(path: &Path) -> Result<HostMap, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_host_map(&content)
}

/// Parse a YAML document of `host: address` pairs.
///
/// Scalar keys and values are stringified, so `example.com: 8080` or numeric
/// hosts are accepted. An empty document is an empty map.
pub fn parse_host_map(content: &str) -> Result<HostMap, ConfigError> {
    let document: Value = serde_yaml::from_str(content)?;

    let mapping = match document {
        Value::Null => {
            tracing::warn!("Host map is empty; every request will be rejected");
            return Ok(HostMap::default());
        }
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ConfigError::Shape(format!(
                "top level must be a mapping, found {}",
                kind(&other)
            )))
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let host = scalar_to_string(&key)
            .ok_or_else(|| ConfigError::Shape(format!("host key must be a scalar, found {}", kind(&key))))?;
        let address = scalar_to_string(&value).ok_or_else(|| {
            ConfigError::Shape(format!("address for {:?} must be a scalar, found {}", host, kind(&value)))
        })?;
        entries.push((host, address));
    }

    let map = HostMap::from_entries(entries);
    validate_host_map(&map).map_err(ConfigError::Validation)?;

    Ok(map)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
