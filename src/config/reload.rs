//! Runtime Configuration Application
//!
//! Bootstrap path for configuration discovered after startup: a config
//! file parsed once consumers already exist must retroactively apply to
//! them. Loads and validates the file, installs the new aggregate into the
//! calling thread's scoped context, and hot-swaps the shared binding so
//! already-constructed services converge on the same value.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ConfigLoader, PipelineConfig};
use crate::constants::registry as registry_constants;
use crate::context;
use crate::registry::{SingletonRegistry, SwapOutcome, override_singleton};
use crate::types::{DocuWeaveError, Result};

/// Load a configuration file and apply it to a running pipeline.
///
/// On success the new aggregate is the calling thread's explicit context,
/// the `pipeline_config` binding points at it, and every repaired
/// dependent's cached reference does too. Load and validation failures are
/// returned; swap-side problems are best effort, observable only in the
/// logs.
pub fn apply_external_config(
    registry: &dyn SingletonRegistry,
    path: &Path,
) -> Result<Arc<PipelineConfig>> {
    if !path.exists() {
        return Err(DocuWeaveError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    info!("Loading external configuration from: {}", path.display());
    let config = Arc::new(ConfigLoader::load_from_file(path)?);
    info!(
        "External configuration loaded successfully with {} LLM models",
        config.model_count()
    );

    context::set(config.clone());

    match override_singleton(registry, registry_constants::PIPELINE_CONFIG, config.clone())? {
        SwapOutcome::Replaced {
            atomic,
            dependents_updated,
        } => info!(
            "Applied external config (atomic: {}, dependents updated: {})",
            atomic, dependents_updated
        ),
        SwapOutcome::Skipped(reason) => warn!(
            "External config loaded but binding not replaced ({:?})",
            reason
        ),
    }

    Ok(config)
}
