//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//!
//! ## Design Principles
//!
//! - Single unified error type (DocuWeaveError) for the whole crate
//! - Propagation and swap machinery is best-effort: failures there are
//!   logged at the boundary and absorbed, never surfaced to callers
//! - The only fail-fast surface is argument misuse on the swap path,
//!   which is a programmer error rather than a runtime condition

use thiserror::Error;

/// Unified error type for docuweave operations
#[derive(Debug, Error)]
pub enum DocuWeaveError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required argument was missing or malformed (programmer error)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, DocuWeaveError>;
