//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Executor and worker pool constants
pub mod executor {
    /// Default number of worker threads when none is configured
    pub const DEFAULT_THREAD_COUNT: usize = 5;

    /// Maximum number of queued jobs before the saturation policy kicks in
    pub const MAX_QUEUE_SIZE: usize = 100;

    /// Placeholder name for executors constructed without one
    pub const UNNAMED_EXECUTOR: &str = "unnamed";

    /// Thread name prefix for the process-wide shared pool
    pub const SHARED_POOL_PREFIX: &str = "docuweave-shared";
}

/// Service registry constants
pub mod registry {
    /// Binding name of the pipeline configuration aggregate
    pub const PIPELINE_CONFIG: &str = "pipeline_config";

    /// Binding name of the LLM service
    pub const LLM_SERVICE: &str = "llm_service";

    /// Binding name of the documentation service
    pub const DOCUMENTATION_SERVICE: &str = "documentation_service";

    /// Bindings known to cache a reference to the pipeline configuration.
    /// Checked directly after a config swap in case the generic walk
    /// missed them.
    pub const CONFIG_DEPENDENTS: [&str; 2] = [LLM_SERVICE, DOCUMENTATION_SERVICE];
}

/// Configuration defaults
pub mod config {
    /// Default LLM model name
    pub const DEFAULT_MODEL_NAME: &str = "default";

    /// Default LLM provider
    pub const DEFAULT_PROVIDER: &str = "ollama";

    /// Default base URL for a local model server
    pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

    /// Default maximum tokens per LLM response
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;

    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Default documentation output directory
    pub const DEFAULT_OUTPUT_DIR: &str = "docs";

    /// Default documentation output format
    pub const DEFAULT_OUTPUT_FORMAT: &str = "markdown";

    /// Default maximum analysis depth
    pub const DEFAULT_MAX_DEPTH: u32 = 10;
}
