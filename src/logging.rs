//! Diagnostics sink for resolution events.
//!
//! The resolver never writes to a global logger directly. Every event it
//! produces goes through a [`Diagnostics`] implementation handed to it:
//! - [`TracingDiagnostics`] forwards to `tracing` (the default)
//! - [`CollectingDiagnostics`] keeps events in memory for inspection
//!
//! Levels follow the syslog-style ladder used by the loader: absent files are
//! debug, insecure files warnings, version mismatches errors, and unreadable
//! files critical.

use crate::paths::ConfigId;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

/// Severity of a diagnostics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// Convert a diagnostics level to a tracing level.
pub fn level_to_tracing(level: Level) -> tracing::Level {
    match level {
        Level::Debug => tracing::Level::DEBUG,
        Level::Info => tracing::Level::INFO,
        Level::Warning => tracing::Level::WARN,
        Level::Error | Level::Critical => tracing::Level::ERROR,
    }
}

/// Minimum-level filter.
#[derive(Debug, Clone, Copy)]
pub struct LevelFilter(Level);

impl LevelFilter {
    pub fn new(level: Level) -> Self {
        Self(level)
    }

    pub fn should_log(&self, level: Level) -> bool {
        level >= self.0
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

/// A single event emitted while resolving a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub level: Level,
    pub config_id: ConfigId,
    /// Candidate file the event is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Event {
    pub fn new(level: Level, config_id: &ConfigId, message: impl Into<String>) -> Self {
        Self {
            level,
            config_id: config_id.clone(),
            path: None,
            message: message.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Receiver for resolution events.
pub trait Diagnostics: Send + Sync {
    fn report(&self, event: &Event);
}

/// Forwards events to `tracing`, tagged with the config identity.
#[derive(Default)]
pub struct TracingDiagnostics {
    level_filter: LevelFilter,
}

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_level(level: Level) -> Self {
        Self {
            level_filter: LevelFilter::new(level),
        }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, event: &Event) {
        if !self.level_filter.should_log(event.level) {
            return;
        }

        let logger = event.config_id.logger_name();
        let group = event.config_id.group.as_str();
        let app = event.config_id.app.as_str();
        let message = event.message.as_str();
        let critical = event.level == Level::Critical;
        match level_to_tracing(event.level) {
            tracing::Level::ERROR => {
                tracing::error!(logger = %logger, group, app, critical, "{}", message)
            }
            tracing::Level::WARN => tracing::warn!(logger = %logger, group, app, "{}", message),
            tracing::Level::INFO => tracing::info!(logger = %logger, group, app, "{}", message),
            tracing::Level::DEBUG => tracing::debug!(logger = %logger, group, app, "{}", message),
            tracing::Level::TRACE => tracing::trace!(logger = %logger, group, app, "{}", message),
        }
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Event>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events collected so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }

    /// Whether an event at `level` contains `needle` in its message.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at_level(level)
            .iter()
            .any(|event| event.message.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let filter = LevelFilter::new(Level::Warning);

        assert!(!filter.should_log(Level::Debug));
        assert!(!filter.should_log(Level::Info));

        assert!(filter.should_log(Level::Warning));
        assert!(filter.should_log(Level::Error));
        assert!(filter.should_log(Level::Critical));
    }

    #[test]
    fn test_tracing_diagnostics_min_level() {
        let diagnostics = TracingDiagnostics::with_min_level(Level::Info);
        assert!(!diagnostics.level_filter.should_log(Level::Debug));
        assert!(diagnostics.level_filter.should_log(Level::Info));
        assert!(TracingDiagnostics::new().level_filter.should_log(Level::Debug));
    }

    #[test]
    fn test_level_to_tracing() {
        assert_eq!(level_to_tracing(Level::Debug), tracing::Level::DEBUG);
        assert_eq!(level_to_tracing(Level::Info), tracing::Level::INFO);
        assert_eq!(level_to_tracing(Level::Error), tracing::Level::ERROR);
        assert_eq!(level_to_tracing(Level::Warning), tracing::Level::WARN);
        assert_eq!(level_to_tracing(Level::Critical), tracing::Level::ERROR);
    }

    #[test]
    fn test_collecting_diagnostics() {
        let sink = CollectingDiagnostics::new();
        let id = ConfigId::new("acme", "bird_feeder");
        sink.report(&Event::new(Level::Info, &id, "Loading initial config"));
        sink.report(&Event::new(Level::Error, &id, "Invalid major version number").with_path("/etc/x"));

        assert_eq!(sink.events().len(), 2);
        assert!(sink.contains(Level::Error, "major version"));
        assert!(!sink.contains(Level::Warning, "major version"));
        assert_eq!(sink.at_level(Level::Error)[0].path, Some(PathBuf::from("/etc/x")));

        sink.clear();
        assert!(sink.events().is_empty());
    }
}
