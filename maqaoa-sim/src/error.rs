//! Error types for evaluators and the optimization driver

use maqaoa_core::QaoaError;
use maqaoa_state::StateError;
use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors that can occur while building evaluators or optimizing angles
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulatorError {
    /// Problem description or evaluation contract violated
    #[error(transparent)]
    Problem(#[from] QaoaError),

    /// State vector operation failed
    #[error(transparent)]
    State(#[from] StateError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No restart produced a usable result
    #[error("Optimization failed: {0}")]
    OptimizationFailed(String),
}

impl SimulatorError {
    /// Whether the error is an evaluation contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Problem(_) | Self::State(_))
    }
}
