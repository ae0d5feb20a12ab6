//! INI file handler.
//!
//! Supported syntax:
//! - `[section]` headers; every option must belong to a section
//! - `key = value` or `key: value`; keys are case-insensitive (lower-cased)
//! - full-line comments starting with `#` or `;`
//! - indented lines continue the previous value (joined with `\n`)
//!
//! A section or key may appear only once per file. Merging across files
//! overwrites section by section, key by key.

use super::Handler;
use crate::error::ParseError;
use crate::version::VersionSpec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Parsed INI content: section → key → value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IniConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Section names in sorted order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Options of one section in sorted order.
    pub fn options(&self, section: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(section)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_lowercase(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Overwrite values from `overlay`, keeping everything it does not define.
    pub fn update(&mut self, overlay: IniConfig) {
        for (section, options) in overlay.sections {
            self.sections.entry(section).or_default().extend(options);
        }
    }
}

/// Handler for `.ini` files. Version comes from `[meta] version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniHandler;

impl IniHandler {
    pub const DEFAULT_FILENAME: &'static str = "app.ini";
}

impl Handler for IniHandler {
    type Config = IniConfig;

    fn default_filename(&self) -> &str {
        Self::DEFAULT_FILENAME
    }

    fn empty(&self) -> IniConfig {
        IniConfig::new()
    }

    fn parse(&self, text: &str) -> Result<IniConfig, ParseError> {
        parse_ini(text)
    }

    fn version(&self, config: &IniConfig) -> Result<Option<VersionSpec>, ParseError> {
        match config.get("meta", "version") {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }

    fn merge(&self, base: &mut IniConfig, overlay: IniConfig) {
        base.update(overlay);
    }

    fn render(&self, config: &IniConfig) -> String {
        let mut out = String::new();
        for (section, options) in &config.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{section}]\n"));
            for (key, value) in options {
                out.push_str(&format!("{key} = {}\n", value.replace('\n', "\n    ")));
            }
        }
        out
    }
}

fn parse_ini(text: &str) -> Result<IniConfig, ParseError> {
    let mut config = IniConfig::new();
    let mut current_section: Option<String> = None;
    // (section, key) of the last option, for continuation lines
    let mut last_option: Option<(String, String)> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.is_empty() {
            last_option = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented && let Some((section, key)) = last_option.as_ref() {
            if let Some(value) = config
                .sections
                .get_mut(section)
                .and_then(|options| options.get_mut(key))
            {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let Some((name, rest)) = header.split_once(']') else {
                return Err(ParseError::syntax(line_no, format!("unterminated section header {trimmed:?}")));
            };
            let rest = rest.trim_start();
            if !(rest.is_empty() || rest.starts_with(['#', ';'])) {
                return Err(ParseError::syntax(
                    line_no,
                    format!("unexpected text after section header {trimmed:?}"),
                ));
            }
            let name = name.trim();
            if name.is_empty() {
                return Err(ParseError::syntax(line_no, "empty section name"));
            }
            if config.sections.contains_key(name) {
                return Err(ParseError::syntax(line_no, format!("section {name:?} already exists")));
            }
            config.sections.insert(name.to_string(), BTreeMap::new());
            current_section = Some(name.to_string());
            last_option = None;
            continue;
        }

        let Some(section) = current_section.as_ref() else {
            return Err(ParseError::syntax(line_no, "missing section header before option"));
        };
        let Some(split_at) = trimmed.find(['=', ':']) else {
            return Err(ParseError::syntax(line_no, format!("expected `key = value`, got {trimmed:?}")));
        };
        let key = trimmed[..split_at].trim().to_lowercase();
        let value = trimmed[split_at + 1..].trim().to_string();
        if key.is_empty() {
            return Err(ParseError::syntax(line_no, "empty option name"));
        }

        let options = config.sections.entry(section.clone()).or_default();
        match options.entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(ParseError::syntax(
                    line_no,
                    format!("option {key:?} in section {section:?} already exists"),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
        last_option = Some((section.clone(), key));
    }

    Ok(config)
}
