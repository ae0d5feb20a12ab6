//! Error types.
//!
//! Only [`ResolveError`] ever reaches the caller of a lookup. Problems with an
//! individual candidate file (absent, insecure, unparsable, incompatible
//! version) are absorbed by the loader and recorded as candidate outcomes.

use crate::version::{InvalidVersion, VersionSpec};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn file content into a config value.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid meta.version: {0}")]
    InvalidVersion(#[from] InvalidVersion),

    #[error("{0}")]
    Structure(String),

    #[error("unable to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Hard failures of a lookup.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid search path entry {entry:?}: {reason}")]
    InvalidSearchPath { entry: String, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("No config file named {filename} found! Search path was {search_path:?}")]
    NoConfigLoaded {
        filename: String,
        search_path: Vec<PathBuf>,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ParseError),

    #[error("incompatible config version: expected {expected}, got {found}")]
    IncompatibleVersion {
        expected: VersionSpec,
        found: VersionSpec,
    },
}

impl ResolveError {
    /// Whether the error was raised before any filesystem access.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidSearchPath { .. } | ResolveError::InvalidArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_config_message_names_filename() {
        let err = ResolveError::NoConfigLoaded {
            filename: "app.ini".to_string(),
            search_path: vec![PathBuf::from("/etc/acme/app")],
        };
        let message = err.to_string();
        assert!(message.contains("app.ini"));
        assert!(message.contains("/etc/acme/app"));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_invalid_input_classification() {
        let err = ResolveError::InvalidArgument {
            field: "app".to_string(),
            reason: "must not be empty".to_string(),
        };
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid app: must not be empty");
    }
}
