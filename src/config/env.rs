//! Environment adapter.
//!
//! Every environment read the resolver depends on happens here, once per
//! lookup, producing a plain [`EnvSnapshot`]. Path building and loading are
//! pure functions of that snapshot.
//!
//! Variables read:
//! - `<GROUP>_<APP>_PATH` - search path override (`+` prefix appends)
//! - `<GROUP>_<APP>_FILENAME` - config basename override
//! - `XDG_CONFIG_HOME` - user config root (default `~/.config`)
//! - `XDG_CONFIG_DIRS` - system config roots (default `/etc/xdg`)
//!
//! Empty or whitespace-only values are treated as unset.

use crate::paths::ConfigId;
use std::path::{Path, PathBuf};

/// Environment values relevant to one config identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    path_override: Option<String>,
    filename_override: Option<String>,
    xdg_config_home: Option<String>,
    xdg_config_dirs: Option<String>,
    home: Option<PathBuf>,
    cwd: PathBuf,
}

impl EnvSnapshot {
    /// Read the process environment for `config_id`.
    pub fn capture(config_id: &ConfigId) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(config_id, |key| std::env::var(key).ok())
            .with_optional_home(dirs::home_dir())
            .with_cwd(cwd)
    }

    /// Build a snapshot from an arbitrary variable lookup.
    ///
    /// Home defaults to unknown and the working directory to `.`.
    pub fn from_lookup<F>(config_id: &ConfigId, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| non_empty(lookup(key));
        Self {
            path_override: read(&config_id.path_var()),
            filename_override: read(&config_id.filename_var()),
            xdg_config_home: read("XDG_CONFIG_HOME"),
            xdg_config_dirs: read("XDG_CONFIG_DIRS"),
            home: None,
            cwd: PathBuf::from("."),
        }
    }

    pub fn with_home(self, home: impl Into<PathBuf>) -> Self {
        self.with_optional_home(Some(home.into()))
    }

    fn with_optional_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn path_override(&self) -> Option<&str> {
        self.path_override.as_deref()
    }

    pub fn filename_override(&self) -> Option<&str> {
        self.filename_override.as_deref()
    }

    pub fn xdg_config_home(&self) -> Option<&str> {
        self.xdg_config_home.as_deref()
    }

    pub fn xdg_config_dirs(&self) -> Option<&str> {
        self.xdg_config_dirs.as_deref()
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
