//! CLI definitions for the `config-resolver` binary.
//!
//! The binary resolves a config exactly the way a library caller would and
//! prints where it looked, what happened to each candidate, and the merged
//! result.

use crate::config::{
    CandidateOutcome, ConfigResolver, LookupOptions, LookupResult, SearchPathOverride,
};
use crate::handler::Handler;
use crate::paths::ConfigId;
use crate::version::VersionSpec;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::fmt::Write as _;

/// Config file format, selecting the built-in handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// `[section]` / `key = value` files (app.ini)
    #[default]
    Ini,
    /// JSON documents (app.json)
    Json,
    /// YAML documents (app.yaml)
    Yaml,
}

/// Report style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Human-readable summary followed by the merged config
    #[default]
    Text,
    /// Lookup metadata and rendered config as JSON
    Json,
}

/// Show how a config resolves: search path, candidate outcomes, merged result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Application name
    pub app: String,

    /// Application group (first path segment)
    #[arg(short, long, default_value = "")]
    pub group: String,

    /// Config file format
    #[arg(short, long, value_enum, default_value_t = Format::Ini)]
    pub format: Format,

    /// Search path; prefix with `+` to append to the default path
    #[arg(short, long, allow_hyphen_values = true)]
    pub search_path: Option<SearchPathOverride>,

    /// Config basename (default depends on the format)
    #[arg(long)]
    pub filename: Option<String>,

    /// Expected config version, as <major>.<minor>
    #[arg(long)]
    pub expect_version: Option<VersionSpec>,

    /// Skip files readable or writable by group or others
    #[arg(long)]
    pub secure: bool,

    /// Fail if no config file was loaded
    #[arg(long)]
    pub require_load: bool,

    /// Output style
    #[arg(short, long, value_enum, default_value_t = OutputMode::Text)]
    pub output: OutputMode,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

impl Cli {
    pub fn config_id(&self) -> ConfigId {
        ConfigId::new(&self.group, &self.app)
    }

    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            search_path: self.search_path.clone(),
            filename: self.filename.clone(),
            require_load: self.require_load,
            version: self.expect_version,
            secure: self.secure,
        }
    }

    /// Resolve with `handler` and render the report.
    pub fn run<H: Handler>(&self, resolver: &ConfigResolver<H>) -> Result<String> {
        let result = resolver.resolve(&self.config_id(), &self.lookup_options())?;
        render_report(resolver.handler(), &result, self.output)
    }
}

/// Render a lookup result in the requested style.
pub fn render_report<H: Handler>(
    handler: &H,
    result: &LookupResult<H::Config>,
    output: OutputMode,
) -> Result<String> {
    let rendered = handler.render(&result.config);
    match output {
        OutputMode::Json => {
            let report = json!({
                "meta": result.meta,
                "config": rendered,
            });
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputMode::Text => {
            let meta = &result.meta;
            let mut out = String::new();
            writeln!(out, "# {}", meta.config_id)?;
            writeln!(out, "# filename: {}", meta.filename)?;
            match meta.version {
                Some(version) => writeln!(out, "# version: {}", version)?,
                None => writeln!(out, "# version: <none>")?,
            }
            writeln!(out, "# candidates:")?;
            for candidate in &meta.candidates {
                writeln!(
                    out,
                    "#   {:<9} {}",
                    outcome_label(&candidate.outcome),
                    candidate.path.display()
                )?;
            }
            writeln!(out)?;
            out.push_str(&rendered);
            if !rendered.ends_with('\n') {
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn outcome_label(outcome: &CandidateOutcome) -> &'static str {
    match outcome {
        CandidateOutcome::Loaded { .. } => "loaded",
        CandidateOutcome::SkippedAbsent => "absent",
        CandidateOutcome::SkippedInsecure => "insecure",
        CandidateOutcome::SkippedParseError { .. } => "invalid",
        CandidateOutcome::SkippedVersion { .. } => "version",
    }
}
