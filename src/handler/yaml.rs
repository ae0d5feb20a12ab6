//! YAML file handler.
//!
//! YAML documents are converted to `serde_json::Value` so they share the
//! tree merge with the JSON handler.

use super::{Handler, tree_version};
use crate::config::deep_merge;
use crate::error::ParseError;
use crate::version::VersionSpec;
use serde_json::{Map, Value};

/// Handler for YAML documents. An empty document is an empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlHandler;

impl YamlHandler {
    pub const DEFAULT_FILENAME: &'static str = "app.yaml";
}

impl Handler for YamlHandler {
    type Config = Value;

    fn default_filename(&self) -> &str {
        Self::DEFAULT_FILENAME
    }

    fn empty(&self) -> Value {
        Value::Object(Map::new())
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        if text.trim().is_empty() {
            return Ok(self.empty());
        }
        let value: Value = serde_yaml::from_str(text)?;
        match value {
            Value::Object(_) => Ok(value),
            Value::Null => Ok(self.empty()),
            _ => Err(ParseError::Structure(
                "top level of a YAML config must be a mapping".to_string(),
            )),
        }
    }

    fn version(&self, config: &Value) -> Result<Option<VersionSpec>, ParseError> {
        tree_version(config)
    }

    fn merge(&self, base: &mut Value, overlay: Value) {
        deep_merge(base, overlay);
    }

    fn render(&self, config: &Value) -> String {
        serde_yaml::to_string(config).unwrap_or_else(|_| config.to_string())
    }
}
