//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/docuweave/config.toml)
//! 3. Project config (.docuweave/config.toml)
//! 4. Environment variables (DOCUWEAVE_*)
//!
//! Plus the runtime application path for configuration discovered after
//! startup ([`apply_external_config`]).

mod loader;
mod reload;
mod types;

pub use loader::ConfigLoader;
pub use reload::apply_external_config;
pub use types::*;
