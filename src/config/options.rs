//! Caller-supplied lookup options.

use crate::error::ResolveError;
use crate::version::VersionSpec;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::str::FromStr;

/// Options controlling a single lookup. Every field is optional.
///
/// Deserializes from YAML/JSON so embedding applications can keep resolver
/// options alongside their own settings:
///
/// ```
/// use config_resolver::config::LookupOptions;
///
/// let options: LookupOptions = serde_json::from_str(
///     r#"{"search_path": "+/opt/acme", "version": "2.1", "secure": true}"#,
/// ).unwrap();
/// assert!(options.secure);
/// assert!(options.search_path.unwrap().append);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupOptions {
    /// Explicit search path. Replaces the default path unless it appends.
    pub search_path: Option<SearchPathOverride>,
    /// Config basename. Defaults to the handler's filename.
    pub filename: Option<String>,
    /// Fail when no file was loaded.
    pub require_load: bool,
    /// Expected version. Auto-detected from the first versioned file if unset.
    pub version: Option<VersionSpec>,
    /// Skip files readable or writable by anyone but the owner.
    pub secure: bool,
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default search path with `dirs`.
    pub fn search_path<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_path = Some(SearchPathOverride::replace(dirs));
        self
    }

    /// Append `dirs` after the default search path.
    pub fn append_search_path<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_path = Some(SearchPathOverride::append(dirs));
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn require_load(mut self, require_load: bool) -> Self {
        self.require_load = require_load;
        self
    }

    pub fn version(mut self, version: VersionSpec) -> Self {
        self.version = Some(version);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Reject structurally invalid options before touching the filesystem.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if let Some(search_path) = self.search_path.as_ref() {
            search_path.validate()?;
        }
        if let Some(filename) = self.filename.as_ref() {
            validate_filename(filename)?;
        }
        Ok(())
    }
}

/// Reject filenames that are empty or would escape the candidate directory.
pub(crate) fn validate_filename(filename: &str) -> Result<(), ResolveError> {
    let reason = if filename.trim().is_empty() {
        Some("must not be empty")
    } else if filename.contains('\0') {
        Some("must not contain NUL bytes")
    } else if filename.contains('/') || filename.contains(std::path::MAIN_SEPARATOR) {
        Some("must be a bare file name, not a path")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ResolveError::InvalidArgument {
            field: "filename".to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// An explicit search path and whether it extends the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathOverride {
    pub entries: Vec<PathBuf>,
    pub append: bool,
}

impl SearchPathOverride {
    pub fn replace<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: dirs.into_iter().map(Into::into).collect(),
            append: false,
        }
    }

    pub fn append<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: dirs.into_iter().map(Into::into).collect(),
            append: true,
        }
    }

    /// Parse without validation, dropping empty entries. Used for values
    /// coming from the environment, which are never fatal.
    pub(crate) fn parse_lenient(raw: &str) -> Self {
        let (append, rest) = split_append(raw);
        Self {
            entries: std::env::split_paths(rest)
                .filter(|entry| !entry.as_os_str().is_empty())
                .collect(),
            append,
        }
    }

    /// Check that the override names at least one usable directory.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.entries.is_empty() {
            return Err(ResolveError::InvalidSearchPath {
                entry: String::new(),
                reason: "search path contains no directories".to_string(),
            });
        }
        for entry in &self.entries {
            let display = entry.to_string_lossy();
            if display.is_empty() {
                return Err(ResolveError::InvalidSearchPath {
                    entry: display.into_owned(),
                    reason: "empty directory entry".to_string(),
                });
            }
            if display.contains('\0') {
                return Err(ResolveError::InvalidSearchPath {
                    entry: display.replace('\0', "\\0"),
                    reason: "directory contains a NUL byte".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn split_append(raw: &str) -> (bool, &str) {
    match raw.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, raw),
    }
}

impl FromStr for SearchPathOverride {
    type Err = ResolveError;

    /// Parse `[+]dir1<sep>dir2...` where `<sep>` is the platform path-list
    /// separator. Empty entries are an error.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (append, rest) = split_append(raw);
        let parsed = Self {
            entries: std::env::split_paths(rest).collect(),
            append,
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

impl<'de> Deserialize<'de> for SearchPathOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            List(Vec<PathBuf>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::List(entries) => Ok(Self::replace(entries)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replace() {
        let parsed: SearchPathOverride = "/a:/b".parse().unwrap();
        assert!(!parsed.append);
        assert_eq!(parsed.entries, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_parse_append() {
        let parsed: SearchPathOverride = "+/c".parse().unwrap();
        assert!(parsed.append);
        assert_eq!(parsed.entries, vec![PathBuf::from("/c")]);
    }

    #[test]
    fn test_parse_rejects_empty_entries() {
        assert!("".parse::<SearchPathOverride>().is_err());
        assert!("+".parse::<SearchPathOverride>().is_err());
        assert!("/a::/b".parse::<SearchPathOverride>().is_err());
    }

    #[test]
    fn test_lenient_drops_empty_entries() {
        let parsed = SearchPathOverride::parse_lenient("/a::/b:");
        assert_eq!(parsed.entries, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_validate_options() {
        assert!(LookupOptions::default().validate().is_ok());
        assert!(
            LookupOptions::default()
                .search_path(Vec::<PathBuf>::new())
                .validate()
                .is_err()
        );
        assert!(LookupOptions::default().filename("").validate().is_err());
        assert!(LookupOptions::default().filename("sub/app.ini").validate().is_err());
        assert!(LookupOptions::default().filename("app.ini").validate().is_ok());
    }

    #[test]
    fn test_deserialize_options() {
        let options: LookupOptions = serde_yaml::from_str(
            "search_path: [/etc/acme, /opt/acme]\nfilename: acme.ini\nrequire_load: true\nversion: '1.2'\n",
        )
        .unwrap();
        assert_eq!(
            options.search_path,
            Some(SearchPathOverride::replace(["/etc/acme", "/opt/acme"]))
        );
        assert_eq!(options.filename.as_deref(), Some("acme.ini"));
        assert!(options.require_load);
        assert!(!options.secure);
        assert_eq!(options.version, Some(VersionSpec::new(1, 2)));
    }
}
