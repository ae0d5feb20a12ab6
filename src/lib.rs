//! Config Resolver Library
//!
//! Locates config files in system, XDG, user and per-instance directories,
//! loads them with a pluggable [`Handler`](handler::Handler) and merges them
//! in precedence order.
//!
//! ```no_run
//! use config_resolver::config::{LookupOptions, get_config};
//!
//! let result = get_config("acmecorp", "bird_feeder", &LookupOptions::default())?;
//! println!("{:?}", result.config.get("section", "var"));
//! println!("loaded: {:?}", result.meta.loaded_files);
//! # Ok::<(), config_resolver::error::ResolveError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod paths;
pub mod version;
