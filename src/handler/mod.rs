//! Config file handlers.
//!
//! A handler turns file text into a config value, reports the version the
//! file declares, and folds one config value onto another. The resolver only
//! talks to this trait; the on-disk format is entirely the handler's business.
//!
//! Built-in handlers:
//! - [`IniHandler`] - `[section]` / `key = value` files (`app.ini`)
//! - [`JsonHandler`] - JSON documents (`app.json`)
//! - [`YamlHandler`] - YAML documents (`app.yaml`)
//!
//! All of them read the version from `meta.version`.

mod ini;
mod json;
mod yaml;

pub use ini::{IniConfig, IniHandler};
pub use json::JsonHandler;
pub use yaml::YamlHandler;

use crate::error::ParseError;
use crate::version::VersionSpec;

/// Parser and merger for one config file format.
pub trait Handler {
    /// The config value produced by this handler.
    type Config;

    /// Basename used when the caller does not pick one.
    fn default_filename(&self) -> &str;

    /// A config with no values, returned when nothing was loaded.
    fn empty(&self) -> Self::Config;

    /// Parse file content.
    fn parse(&self, text: &str) -> Result<Self::Config, ParseError>;

    /// Version declared by a parsed config, if any.
    fn version(&self, _config: &Self::Config) -> Result<Option<VersionSpec>, ParseError> {
        Ok(None)
    }

    /// Fold `overlay` onto `base`. Values in `overlay` win; values only in
    /// `base` are kept.
    fn merge(&self, base: &mut Self::Config, overlay: Self::Config);

    /// Render a config as text, for debugging.
    fn render(&self, config: &Self::Config) -> String;
}

/// Read `meta.version` from a tree-shaped config.
///
/// Accepts a string (`"2.1"`) or a whole number (`3`, read as `3.0`).
/// Fractional numbers are rejected: `2.10` has already become `2.1` by the
/// time it is a float.
pub(crate) fn tree_version(config: &serde_json::Value) -> Result<Option<VersionSpec>, ParseError> {
    let Some(raw) = config.get("meta").and_then(|meta| meta.get("version")) else {
        return Ok(None);
    };
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(major) => return Ok(Some(VersionSpec::new(major, 0))),
            None => {
                return Err(ParseError::Structure(format!(
                    "meta.version {n} must be quoted, e.g. \"{n}\""
                )));
            }
        },
        serde_json::Value::Null => return Ok(None),
        other => {
            return Err(ParseError::Structure(format!(
                "meta.version must be a string or number, got {other}"
            )));
        }
    };
    Ok(Some(text.parse()?))
}
