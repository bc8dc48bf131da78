//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docuweave/config.toml)
//! 3. Project config (.docuweave/config.toml)
//! 4. Environment variables (DOCUWEAVE_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::PipelineConfig;
use crate::types::{DocuWeaveError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<PipelineConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(PipelineConfig::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // Merge environment variables (e.g., DOCUWEAVE_OUTPUT_FORMAT -> output.format)
        figment = figment.merge(Env::prefixed("DOCUWEAVE_").split('_').lowercase(true));

        let config: PipelineConfig = figment
            .extract()
            .map_err(|e| DocuWeaveError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<PipelineConfig> {
        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocuWeaveError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docuweave/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docuweave"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".docuweave/config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_from_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[output]
output_directory = "generated-docs"
generate_mermaid = true
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.output.output_directory, "generated-docs");
        assert!(config.output.generate_mermaid);
        // Untouched sections keep their defaults
        assert_eq!(config.model_count(), 1);
        assert_eq!(config.llm_models[0].provider, "ollama");
    }

    #[test]
    fn test_load_from_file_overrides_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[llm_models]]
name = "qwen"
provider = "ollama"
base_url = "http://localhost:11434"

[[llm_models]]
name = "gpt-4o"
provider = "openai"
base_url = "https://api.openai.com/v1"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.model_count(), 2);
        assert_eq!(config.llm_models[1].name, "gpt-4o");
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[analysis]
max_depth = 0
"#,
        )
        .unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        // Figment treats a missing TOML file as an empty source
        let config = ConfigLoader::load_from_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.output.format, "markdown");
    }
}
