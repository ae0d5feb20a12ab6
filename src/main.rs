//! Config Resolver CLI
//!
//! Resolves a config for an application and prints how it was assembled.

use anyhow::Result;
use clap::Parser;
use config_resolver::cli::{Cli, Format};
use config_resolver::config::ConfigResolver;
use config_resolver::handler::{Handler, IniHandler, JsonHandler, YamlHandler};
use config_resolver::logging::{Diagnostics, Level, TracingDiagnostics};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option; RUST_LOG wins when set
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let min_level = if cli.verbose { Level::Debug } else { Level::Info };
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics::with_min_level(min_level));
    let report = match cli.format {
        Format::Ini => cli.run(&resolver(IniHandler, &diagnostics))?,
        Format::Json => cli.run(&resolver(JsonHandler, &diagnostics))?,
        Format::Yaml => cli.run(&resolver(YamlHandler, &diagnostics))?,
    };
    print!("{report}");

    Ok(())
}

fn resolver<H: Handler>(handler: H, diagnostics: &Arc<dyn Diagnostics>) -> ConfigResolver<H> {
    ConfigResolver::new(handler).with_diagnostics(Arc::clone(diagnostics))
}
