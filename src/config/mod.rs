//! Config discovery, loading and merging.
//!
//! Resolution happens in three steps:
//! 1. **Environment** - [`EnvSnapshot`] captures the variables that influence
//!    the lookup (`<GROUP>_<APP>_PATH`, `<GROUP>_<APP>_FILENAME`,
//!    `XDG_CONFIG_HOME`, `XDG_CONFIG_DIRS`)
//! 2. **Search path** - [`PathBuilder`](crate::paths::PathBuilder) orders the
//!    candidate directories
//! 3. **Load** - [`ConfigResolver`] visits every candidate, gates it on
//!    permissions and version, and merges what it loads in order
//!
//! ## Merge Strategy
//! - INI: section by section, key by key
//! - JSON/YAML: deep merge field by field, arrays replaced

mod env;
mod loader;
mod merge;
mod options;
mod security;

pub use env::EnvSnapshot;
pub use loader::{
    Candidate, CandidateOutcome, ConfigResolver, LookupMetadata, LookupResult, get_config,
};
pub use merge::deep_merge;
pub use options::{LookupOptions, SearchPathOverride};
pub use security::is_secure;
