//! Configuration loading and CLI definitions.
//!
//! Files may be TOML, YAML or JSON (comments allowed); every field has a
//! default, so an empty file is a valid configuration.

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config, load_config_or_default};
pub use types::*;
pub use validate::validate_config;
