//! JSON file handler.

use super::{Handler, tree_version};
use crate::config::deep_merge;
use crate::error::ParseError;
use crate::version::VersionSpec;
use serde_json::{Map, Value};

/// Handler for JSON documents. The top level must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub const DEFAULT_FILENAME: &'static str = "app.json";
}

impl Handler for JsonHandler {
    type Config = Value;

    fn default_filename(&self) -> &str {
        Self::DEFAULT_FILENAME
    }

    fn empty(&self) -> Value {
        Value::Object(Map::new())
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ParseError::Structure(
                "top level of a JSON config must be an object".to_string(),
            ));
        }
        Ok(value)
    }

    fn version(&self, config: &Value) -> Result<Option<VersionSpec>, ParseError> {
        tree_version(config)
    }

    fn merge(&self, base: &mut Value, overlay: Value) {
        deep_merge(base, overlay);
    }

    fn render(&self, config: &Value) -> String {
        serde_json::to_string_pretty(config).unwrap_or_else(|_| config.to_string())
    }
}
