//! Candidate search path construction.
//!
//! Builds the ordered list of directories that may contain a config file for
//! a `(group, app)` pair. Ordering is lowest to highest precedence:
//! 1. `/etc/<group>/<app>`
//! 2. `$XDG_CONFIG_DIRS/<group>/<app>` (default `/etc/xdg/<group>/<app>`)
//! 3. `$XDG_CONFIG_HOME/<group>/<app>` (default `~/.config/<group>/<app>`)
//! 4. `<cwd>/.<group>/<app>`
//!
//! An explicit search path (API argument, else `<GROUP>_<APP>_PATH`) replaces
//! this list, or extends it when it is marked as an append.
//!
//! This module is pure: the environment comes in as an [`EnvSnapshot`] and
//! no filesystem access happens here.

use crate::config::{EnvSnapshot, LookupOptions, SearchPathOverride};
use crate::logging::{Event, Level};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a configuration: application group and application name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigId {
    pub group: String,
    pub app: String,
}

impl ConfigId {
    pub fn new(group: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            app: app.into(),
        }
    }

    /// Placeholder identity for configs that did not come from a lookup.
    pub fn unknown() -> Self {
        Self::new("<unknown>", "<unknown>")
    }

    /// Name of the environment variable holding a search path override.
    pub fn path_var(&self) -> String {
        self.env_var("PATH")
    }

    /// Name of the environment variable holding a filename override.
    pub fn filename_var(&self) -> String {
        self.env_var("FILENAME")
    }

    /// `<GROUP>_<APP>_<suffix>` with every non-alphanumeric character mapped to `_`.
    pub fn env_var(&self, suffix: &str) -> String {
        format!(
            "{}_{}_{}",
            env_segment(&self.group),
            env_segment(&self.app),
            suffix
        )
    }

    /// Logger name used to tag diagnostics events.
    pub fn logger_name(&self) -> String {
        format!("config_resolver.{}.{}", self.group, self.app)
    }

    /// Relative `<group>/<app>` directory appended to every search root.
    pub fn relative_dir(&self) -> PathBuf {
        if self.group.is_empty() {
            PathBuf::from(&self.app)
        } else {
            Path::new(&self.group).join(&self.app)
        }
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group={}:app={}", self.group, self.app)
    }
}

fn env_segment(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Where the effective search path override came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    Argument,
    Environment,
}

/// Computes candidate directories for one config identity.
#[derive(Debug, Clone)]
pub struct PathBuilder<'a> {
    config_id: &'a ConfigId,
    env: &'a EnvSnapshot,
}

impl<'a> PathBuilder<'a> {
    pub fn new(config_id: &'a ConfigId, env: &'a EnvSnapshot) -> Self {
        Self { config_id, env }
    }

    /// Default search path, ignoring any override.
    pub fn defaults(&self) -> Vec<PathBuf> {
        let relative = self.config_id.relative_dir();
        let mut path = vec![Path::new("/etc").join(&relative)];
        path.extend(self.xdg_dirs());
        path.push(self.xdg_home());
        path.push(self.env.cwd().join(self.dot_group_dir()));
        path
    }

    /// Roots from `XDG_CONFIG_DIRS`, lowest precedence first.
    ///
    /// The variable lists directories in descending precedence, so the
    /// listed order is reversed.
    pub fn xdg_dirs(&self) -> Vec<PathBuf> {
        let relative = self.config_id.relative_dir();
        match self.env.xdg_config_dirs() {
            Some(dirs) => dirs
                .split(':')
                .filter(|dir| !dir.is_empty())
                .rev()
                .map(|dir| Path::new(dir).join(&relative))
                .collect(),
            None => vec![Path::new("/etc/xdg").join(relative)],
        }
    }

    /// User config directory from `XDG_CONFIG_HOME` or `~/.config`.
    pub fn xdg_home(&self) -> PathBuf {
        let relative = self.config_id.relative_dir();
        match self.env.xdg_config_home() {
            Some(home) => self.expand_home(home).join(relative),
            None => self.expand_home("~/.config").join(relative),
        }
    }

    fn dot_group_dir(&self) -> PathBuf {
        Path::new(&format!(".{}", self.config_id.group)).join(&self.config_id.app)
    }

    fn expand_home(&self, raw: &str) -> PathBuf {
        let home = self.env.home();
        match (raw.strip_prefix('~'), home) {
            (Some(""), Some(home)) => home.to_path_buf(),
            (Some(rest), Some(home)) if rest.starts_with('/') => {
                home.join(rest.trim_start_matches('/'))
            }
            _ => PathBuf::from(raw),
        }
    }

    /// The override in effect, if any. The API argument wins over the
    /// environment variable.
    pub fn effective_override(
        &self,
        options: &LookupOptions,
    ) -> Option<(SearchPathOverride, OverrideSource)> {
        if let Some(search_path) = options.search_path.as_ref() {
            return Some((search_path.clone(), OverrideSource::Argument));
        }
        self.env
            .path_override()
            .map(|raw| (SearchPathOverride::parse_lenient(raw), OverrideSource::Environment))
    }

    /// Build the candidate directory list for `options`.
    pub fn build(&self, options: &LookupOptions) -> Vec<PathBuf> {
        self.build_reporting(options, &mut |_| {})
    }

    /// Like [`build`](Self::build), reporting override decisions to `report`.
    pub fn build_reporting(
        &self,
        options: &LookupOptions,
        report: &mut dyn FnMut(Event),
    ) -> Vec<PathBuf> {
        let mut path = self.defaults();
        let Some((search_path, source)) = self.effective_override(options) else {
            return path;
        };

        if source == OverrideSource::Environment {
            let var = self.config_id.path_var();
            let raw = self.env.path_override().unwrap_or_default();
            if search_path.entries.is_empty() {
                report(Event::new(
                    Level::Warning,
                    self.config_id,
                    format!(
                        "Ignoring the environment variable {}: {:?} names no directories.",
                        var, raw
                    ),
                ));
                return path;
            }
            let message = if search_path.append {
                format!(
                    "Search path extended with {:?} by the environment variable {}.",
                    raw, var
                )
            } else {
                format!(
                    "Configuration search path was overridden with {:?} by the environment variable {:?}.",
                    raw, var
                )
            };
            report(Event::new(Level::Info, self.config_id, message));
        }

        if search_path.append {
            path.extend(search_path.entries);
        } else {
            path = search_path.entries;
        }
        path
    }

    /// Effective config basename: API argument, then `<GROUP>_<APP>_FILENAME`,
    /// then `default`.
    pub fn filename(
        &self,
        options: &LookupOptions,
        default: &str,
        report: &mut dyn FnMut(Event),
    ) -> String {
        if let Some(filename) = options.filename.as_ref() {
            return filename.clone();
        }
        if let Some(filename) = self.env.filename_override() {
            report(Event::new(
                Level::Info,
                self.config_id,
                format!(
                    "Configuration filename was overridden with {:?} by the environment variable {}.",
                    filename,
                    self.config_id.filename_var()
                ),
            ));
            return filename.to_string();
        }
        default.to_string()
    }
}
