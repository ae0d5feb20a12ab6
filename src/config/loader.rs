//! Configuration resolver.
//!
//! Walks the candidate path from lowest to highest precedence. Every
//! candidate ends in exactly one [`CandidateOutcome`]:
//! - `SkippedAbsent` - no regular file at that location
//! - `SkippedInsecure` - secure mode and the file is group/world accessible
//! - `SkippedParseError` - the file could not be read or parsed
//! - `SkippedVersion` - the declared version is incompatible
//! - `Loaded` - merged onto the accumulated config
//!
//! Per-candidate problems never abort the pass. The only hard failures are
//! invalid caller input (before any filesystem access) and an empty result
//! when `require_load` is set.

use super::env::EnvSnapshot;
use super::options::{LookupOptions, validate_filename};
use super::security::is_secure;
use crate::error::{ParseError, ResolveError};
use crate::handler::{Handler, IniConfig, IniHandler};
use crate::logging::{Diagnostics, Event, Level, TracingDiagnostics};
use crate::paths::{ConfigId, PathBuilder};
use crate::version::{Compatibility, VersionSpec};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Loaded {
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<VersionSpec>,
    },
    SkippedAbsent,
    SkippedInsecure,
    SkippedParseError {
        message: String,
    },
    SkippedVersion {
        expected: VersionSpec,
        found: VersionSpec,
        reason: Compatibility,
    },
}

impl CandidateOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CandidateOutcome::Loaded { .. })
    }
}

/// A candidate file and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: CandidateOutcome,
}

/// How a configuration was assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupMetadata {
    pub config_id: ConfigId,
    /// Directories searched, lowest precedence first.
    pub search_path: Vec<PathBuf>,
    /// Every candidate file inspected (directory joined with the filename).
    pub active_path: Vec<PathBuf>,
    /// Files merged into the config, in merge order.
    pub loaded_files: Vec<PathBuf>,
    /// Effective config basename.
    pub filename: String,
    /// Version gate at the end of the pass, requested or auto-detected.
    pub version: Option<VersionSpec>,
    pub candidates: Vec<Candidate>,
}

/// The merged config plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult<C> {
    pub config: C,
    pub meta: LookupMetadata,
}

/// Resolves and merges config files with a given handler.
#[derive(Clone)]
pub struct ConfigResolver<H> {
    handler: H,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<H: Handler> ConfigResolver<H> {
    /// Create a resolver reporting to `tracing`.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            diagnostics: Arc::new(TracingDiagnostics::new()),
        }
    }

    /// Send events to `diagnostics` instead of `tracing`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Resolve a config using the process environment.
    pub fn resolve(
        &self,
        config_id: &ConfigId,
        options: &LookupOptions,
    ) -> Result<LookupResult<H::Config>, ResolveError> {
        let env = EnvSnapshot::capture(config_id);
        self.resolve_with_env(config_id, options, &env)
    }

    /// Resolve a config against an explicit environment snapshot.
    pub fn resolve_with_env(
        &self,
        config_id: &ConfigId,
        options: &LookupOptions,
        env: &EnvSnapshot,
    ) -> Result<LookupResult<H::Config>, ResolveError> {
        validate_input(config_id, options)?;

        let mut report = |event: Event| self.diagnostics.report(&event);
        let builder = PathBuilder::new(config_id, env);
        let search_path = builder.build_reporting(options, &mut report);
        let default_filename = self.handler.default_filename();
        let mut filename = builder.filename(options, default_filename, &mut report);
        // Only the environment can supply an unchecked name here.
        if let Err(err) = validate_filename(&filename) {
            report(Event::new(
                Level::Warning,
                config_id,
                format!("Ignoring config filename {:?}: {}", filename, err),
            ));
            filename = default_filename.to_string();
        }
        let active_path: Vec<PathBuf> = search_path.iter().map(|dir| dir.join(&filename)).collect();

        let mut pass = Pass {
            handler: &self.handler,
            diagnostics: self.diagnostics.as_ref(),
            config_id,
            secure: options.secure,
            expected: options.version,
            config: self.handler.empty(),
            loaded_files: Vec::new(),
        };
        let candidates: Vec<Candidate> = active_path
            .iter()
            .map(|path| Candidate {
                path: path.clone(),
                outcome: pass.visit(path),
            })
            .collect();
        let Pass {
            config,
            loaded_files,
            expected,
            ..
        } = pass;

        if loaded_files.is_empty() {
            if options.require_load {
                return Err(ResolveError::NoConfigLoaded {
                    filename,
                    search_path,
                });
            }
            self.report(Event::new(
                Level::Debug,
                config_id,
                format!(
                    "No config file named {} found! Search path was {:?}",
                    filename, search_path
                ),
            ));
        }

        Ok(LookupResult {
            config,
            meta: LookupMetadata {
                config_id: config_id.clone(),
                search_path,
                active_path,
                loaded_files,
                filename,
                version: expected,
                candidates,
            },
        })
    }

    /// Load a config from an in-memory document.
    ///
    /// There is no pass to continue here, so a parse failure or an
    /// incompatible version is an error.
    pub fn from_str(
        &self,
        data: &str,
        options: &LookupOptions,
    ) -> Result<LookupResult<H::Config>, ResolveError> {
        let config = self.handler.parse(data)?;
        let found = self.handler.version(&config)?;
        if let (Some(expected), Some(found)) = (options.version, found)
            && !expected.check(&found).is_ok()
        {
            return Err(ResolveError::IncompatibleVersion { expected, found });
        }

        Ok(LookupResult {
            config,
            meta: LookupMetadata {
                config_id: ConfigId::unknown(),
                search_path: Vec::new(),
                active_path: Vec::new(),
                loaded_files: Vec::new(),
                filename: String::new(),
                version: options.version.or(found),
                candidates: Vec::new(),
            },
        })
    }

    fn report(&self, event: Event) {
        self.diagnostics.report(&event);
    }
}

/// Resolve an INI config for `(group, app)` using the process environment.
pub fn get_config(
    group: &str,
    app: &str,
    options: &LookupOptions,
) -> Result<LookupResult<IniConfig>, ResolveError> {
    ConfigResolver::new(IniHandler).resolve(&ConfigId::new(group, app), options)
}

fn validate_input(config_id: &ConfigId, options: &LookupOptions) -> Result<(), ResolveError> {
    if config_id.app.trim().is_empty() {
        return Err(ResolveError::InvalidArgument {
            field: "app".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    options.validate()
}

/// State carried across the candidates of one lookup.
struct Pass<'a, H: Handler> {
    handler: &'a H,
    diagnostics: &'a dyn Diagnostics,
    config_id: &'a ConfigId,
    secure: bool,
    expected: Option<VersionSpec>,
    config: H::Config,
    loaded_files: Vec<PathBuf>,
}

impl<H: Handler> Pass<'_, H> {
    fn visit(&mut self, path: &Path) -> CandidateOutcome {
        if !path.is_file() {
            self.report(Level::Debug, path, format!("Skipping {}: file not found", path.display()));
            return CandidateOutcome::SkippedAbsent;
        }

        if self.secure {
            match is_secure(path) {
                Ok(true) => {}
                Ok(false) => {
                    self.report(
                        Level::Warning,
                        path,
                        format!(
                            "File {} is not secure enough. Change its mode to 600",
                            path.display()
                        ),
                    );
                    return CandidateOutcome::SkippedInsecure;
                }
                Err(err) => {
                    self.report(
                        Level::Debug,
                        path,
                        format!("Skipping {}: {}", path.display(), err),
                    );
                    return CandidateOutcome::SkippedAbsent;
                }
            }
        }

        self.report(Level::Debug, path, format!("Checking if {} is readable.", path.display()));
        let (parsed, found) = match self.read(path) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.report(
                    Level::Critical,
                    path,
                    format!("Unable to read {}: {}", path.display(), err),
                );
                return CandidateOutcome::SkippedParseError {
                    message: err.to_string(),
                };
            }
        };

        if let Some(found) = found {
            match self.expected {
                Some(expected) => {
                    let compatibility = expected.check(&found);
                    match compatibility {
                        Compatibility::MajorMismatch => {
                            self.report(
                                Level::Error,
                                path,
                                format!(
                                    "Invalid major version number in {}. Expected {}, got {}!",
                                    path.display(),
                                    expected,
                                    found
                                ),
                            );
                        }
                        Compatibility::MinorTooLow => {
                            self.report(
                                Level::Error,
                                path,
                                format!(
                                    "Mismatching minor version number in {}. Expected {}, got {}!",
                                    path.display(),
                                    expected,
                                    found
                                ),
                            );
                        }
                        Compatibility::Ok if found.minor != expected.minor => {
                            self.report(
                                Level::Info,
                                path,
                                format!(
                                    "{} declares version {}, newer than the expected {}",
                                    path.display(),
                                    found,
                                    expected
                                ),
                            );
                        }
                        Compatibility::Ok => {}
                    }
                    if !compatibility.is_ok() {
                        return CandidateOutcome::SkippedVersion {
                            expected,
                            found,
                            reason: compatibility,
                        };
                    }
                }
                None => {
                    self.report(
                        Level::Info,
                        path,
                        format!(
                            "{} contains a version number, but the config instance was not \
                             created with a version restriction. Will set version number to \
                             \"{}\" to prevent accidents!",
                            path.display(),
                            found
                        ),
                    );
                    self.expected = Some(found);
                }
            }
        }

        let action = if self.loaded_files.is_empty() {
            "Loading initial"
        } else {
            "Updating"
        };
        self.report(Level::Info, path, format!("{} config from {}", action, path.display()));
        self.handler.merge(&mut self.config, parsed);
        self.loaded_files.push(path.to_path_buf());
        CandidateOutcome::Loaded { version: found }
    }

    fn read(&self, path: &Path) -> Result<(H::Config, Option<VersionSpec>), ParseError> {
        let text = std::fs::read_to_string(path)?;
        let parsed = self.handler.parse(&text)?;
        let version = self.handler.version(&parsed)?;
        Ok((parsed, version))
    }

    fn report(&self, level: Level, path: &Path, message: String) {
        self.diagnostics
            .report(&Event::new(level, self.config_id, message).with_path(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CollectingDiagnostics;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn resolver() -> (ConfigResolver<IniHandler>, Arc<CollectingDiagnostics>) {
        let sink = Arc::new(CollectingDiagnostics::new());
        let resolver = ConfigResolver::new(IniHandler).with_diagnostics(sink.clone());
        (resolver, sink)
    }

    fn no_env(id: &ConfigId) -> EnvSnapshot {
        EnvSnapshot::from_lookup(id, |_| None)
    }

    #[test]
    fn test_rejects_empty_app_before_io() {
        let (resolver, sink) = resolver();
        let id = ConfigId::new("acme", "");
        let err = resolver
            .resolve_with_env(&id, &LookupOptions::default(), &no_env(&id))
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_candidates_follow_active_path() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        write(&b, "app.ini", "[s]\nk = v\n");

        let (resolver, _) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default().search_path([&a, &b]);
        let result = resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();

        assert_eq!(result.meta.active_path, vec![a.join("app.ini"), b.join("app.ini")]);
        assert_eq!(result.meta.candidates[0].outcome, CandidateOutcome::SkippedAbsent);
        assert!(result.meta.candidates[1].outcome.is_loaded());
        assert_eq!(result.meta.loaded_files, vec![b.join("app.ini")]);
        assert_eq!(result.meta.filename, "app.ini");
    }

    #[test]
    fn test_directory_named_like_config_is_absent() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("app.ini")).unwrap();

        let (resolver, _) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default().search_path([temp.path()]);
        let result = resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();
        assert_eq!(result.meta.candidates[0].outcome, CandidateOutcome::SkippedAbsent);
    }

    #[test]
    fn test_load_messages() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("one"), "app.ini", "[s]\na = 1\n");
        write(&temp.path().join("two"), "app.ini", "[s]\na = 2\n");

        let (resolver, sink) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default()
            .search_path([temp.path().join("one"), temp.path().join("two")]);
        resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();

        assert!(sink.contains(Level::Info, "Loading initial config from"));
        assert!(sink.contains(Level::Info, "Updating config from"));
    }

    #[test]
    fn test_unversioned_file_passes_explicit_gate() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.ini", "[s]\na = 1\n");

        let (resolver, _) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default()
            .search_path([temp.path()])
            .version(VersionSpec::new(1, 1));
        let result = resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();
        assert_eq!(result.meta.loaded_files.len(), 1);
        assert_eq!(result.meta.version, Some(VersionSpec::new(1, 1)));
    }

    #[test]
    fn test_invalid_version_string_is_parse_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.ini", "[meta]\nversion = one\n");

        let (resolver, sink) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default().search_path([temp.path()]);
        let result = resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();
        assert!(matches!(
            result.meta.candidates[0].outcome,
            CandidateOutcome::SkippedParseError { .. }
        ));
        assert!(sink.contains(Level::Critical, "Unable to read"));
    }

    #[test]
    fn test_bad_env_filename_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.ini", "[s]\na = 1\n");

        let (resolver, sink) = resolver();
        let id = ConfigId::new("acme", "app");
        let env = EnvSnapshot::from_lookup(&id, |key| {
            (key == "ACME_APP_FILENAME").then(|| "../escape.ini".to_string())
        });
        let options = LookupOptions::default().search_path([temp.path()]);
        let result = resolver.resolve_with_env(&id, &options, &env).unwrap();

        assert_eq!(result.meta.filename, "app.ini");
        assert_eq!(result.meta.loaded_files.len(), 1);
        assert!(sink.contains(Level::Warning, "Ignoring config filename"));
    }

    #[test]
    fn test_from_str() {
        let (resolver, _) = resolver();
        let result = resolver
            .from_str("[section_mem]\nval = 1\n", &LookupOptions::default())
            .unwrap();
        assert_eq!(result.config.get("section_mem", "val"), Some("1"));
        assert_eq!(result.meta.config_id, ConfigId::unknown());
        assert!(result.meta.loaded_files.is_empty());
    }

    #[test]
    fn test_from_str_checks_version() {
        let (resolver, _) = resolver();
        let options = LookupOptions::default().version(VersionSpec::new(2, 1));
        let err = resolver
            .from_str("[meta]\nversion = 2.0\n", &options)
            .unwrap_err();
        assert!(matches!(err, ResolveError::IncompatibleVersion { .. }));

        let ok = resolver.from_str("[meta]\nversion = 2.3\n", &options).unwrap();
        assert_eq!(ok.meta.version, Some(VersionSpec::new(2, 1)));

        assert!(matches!(
            resolver.from_str("not ini", &options),
            Err(ResolveError::Parse(_))
        ));
    }

    #[test]
    fn test_metadata_serializes() {
        let temp = TempDir::new().unwrap();
        let (resolver, _) = resolver();
        let id = ConfigId::new("acme", "app");
        let options = LookupOptions::default().search_path([temp.path()]);
        let result = resolver.resolve_with_env(&id, &options, &no_env(&id)).unwrap();

        let json = serde_json::to_value(&result.meta).unwrap();
        assert_eq!(json["config_id"]["app"], "app");
        assert_eq!(json["candidates"][0]["status"], "skipped_absent");
        assert_eq!(json["loaded_files"], serde_json::json!([]));
    }
}
