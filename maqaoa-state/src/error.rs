//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Register size that cannot be represented
    #[error("Invalid number of qubits {num_qubits}, expected 1..={max_qubits}")]
    InvalidQubitCount { num_qubits: usize, max_qubits: usize },

    /// State not normalized
    #[error("State vector not normalized, norm = {norm}")]
    NotNormalized { norm: f64 },

    /// Dimension mismatch between a state and a table or diagonal
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Number of layer angles does not match the number of terms or qubits
    #[error("Expected {expected} layer angles, got {actual}")]
    AngleCountMismatch { expected: usize, actual: usize },
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
