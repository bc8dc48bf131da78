//! Configuration Types
//!
//! The pipeline configuration aggregate and its nested settings.
//! Immutable once constructed: runtime reconfiguration replaces the whole
//! aggregate (see [`crate::registry::hotswap`]), it never mutates in place.

use serde::{Deserialize, Serialize};

use crate::constants::config as config_constants;
use crate::types::{DocuWeaveError, Result};

/// Root pipeline configuration aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Configured LLM models, tried in order
    pub llm_models: Vec<LlmModelConfig>,

    /// Documentation output settings
    pub output: OutputSettings,

    /// Code analysis settings
    pub analysis: AnalysisSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm_models: vec![LlmModelConfig::default()],
            output: OutputSettings::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocuWeaveError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm_models.is_empty() {
            return Err(DocuWeaveError::Config(
                "At least one LLM model must be configured".to_string(),
            ));
        }

        for model in &self.llm_models {
            model.validate()?;
        }

        if self.output.output_directory.is_empty() {
            return Err(DocuWeaveError::Config(
                "Output directory is required".to_string(),
            ));
        }

        if self.analysis.max_depth == 0 {
            return Err(DocuWeaveError::Config(
                "Analysis max_depth must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of configured models, used in diagnostic logging
    pub fn model_count(&self) -> usize {
        self.llm_models.len()
    }
}

// =============================================================================
// LLM Model Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmModelConfig {
    /// Model name
    pub name: String,

    /// Provider name
    pub provider: String,

    /// Base URL of the model server
    pub base_url: String,

    /// API key, if the provider requires one
    pub api_key: Option<String>,

    /// Maximum tokens per response
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmModelConfig {
    fn default() -> Self {
        Self {
            name: config_constants::DEFAULT_MODEL_NAME.to_string(),
            provider: config_constants::DEFAULT_PROVIDER.to_string(),
            base_url: config_constants::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            max_tokens: config_constants::DEFAULT_MAX_TOKENS,
            timeout_secs: config_constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DocuWeaveError::Config(
                "LLM model name cannot be empty".to_string(),
            ));
        }
        if self.provider.trim().is_empty() {
            return Err(DocuWeaveError::Config(
                "LLM provider cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Output Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory documentation is written into
    pub output_directory: String,

    /// Output format
    pub format: String,

    /// Whether to emit Mermaid diagrams
    pub generate_mermaid: bool,

    /// Whether to emit PlantUML diagrams
    pub generate_plantuml: bool,

    /// Verbose generation output
    pub verbose_output: bool,

    /// Error log file name
    pub error_log: String,

    /// Output log file name
    pub output_log: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_directory: config_constants::DEFAULT_OUTPUT_DIR.to_string(),
            format: config_constants::DEFAULT_OUTPUT_FORMAT.to_string(),
            generate_mermaid: false,
            generate_plantuml: false,
            verbose_output: false,
            error_log: "errors.log".to_string(),
            output_log: "out.log".to_string(),
        }
    }
}

// =============================================================================
// Analysis Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Whether private members are included in generated documentation
    pub include_private_members: bool,

    /// Maximum traversal depth
    pub max_depth: u32,

    /// Glob patterns for files to include
    pub included_patterns: Vec<String>,

    /// Glob patterns for files to exclude
    pub excluded_patterns: Vec<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            include_private_members: false,
            max_depth: config_constants::DEFAULT_MAX_DEPTH,
            included_patterns: vec!["**/*.rs".to_string(), "**/*.py".to_string()],
            excluded_patterns: vec!["**/tests/**".to_string(), "**/target/**".to_string()],
        }
    }
}
