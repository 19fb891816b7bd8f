//! Project manifest (`tscfg.toml`)
//!
//! Precedence, highest first:
//! 1. CLI flags
//! 2. Environment variables (TSCFG_*)
//! 3. The manifest file
//! 4. Built-in defaults

mod loader;
mod types;

pub use loader::{
    apply_env_overrides, load_for_project, load_with_warnings, parse_with_warnings,
    with_env_overrides, ConfigWarning, ENV_PREFIX, MANIFEST_FILE,
};
pub use types::{Manifest, OptionsConfig, UnitConfig, DEFAULT_UNIT_NAME};
