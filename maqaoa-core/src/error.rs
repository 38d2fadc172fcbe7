//! Error types for MA-QAOA problem descriptions

use thiserror::Error;

/// Contract violations raised while building or evaluating a QAOA problem
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QaoaError {
    /// Node index outside of the graph
    #[error("Invalid node {node}: graph has only {num_nodes} nodes")]
    InvalidNode { node: usize, num_nodes: usize },

    /// Edge connecting a node to itself
    #[error("Self loop on node {0} is not allowed")]
    SelfLoop(usize),

    /// The same undirected edge was given twice
    #[error("Duplicate edge ({0}, {1})")]
    DuplicateEdge(usize, usize),

    /// Edge requested by the caller is not part of the graph
    #[error("Edge ({0}, {1}) is not in the graph")]
    UnknownEdge(usize, usize),

    /// Problem without qubits
    #[error("Problem must have at least one qubit")]
    EmptyProblem,

    /// Basis tables would not fit in memory
    #[error("Too many qubits: {num_qubits} requested, at most {max_qubits} supported")]
    TooManyQubits { num_qubits: usize, max_qubits: usize },

    /// Diagonal term acting on no qubits
    #[error("Diagonal term {0} has empty support")]
    EmptyTerm(usize),

    /// Diagonal term referencing a qubit outside of the register
    #[error("Term {term} references qubit {qubit}, register has {num_qubits} qubits")]
    TermQubitOutOfRange { term: usize, qubit: usize, num_qubits: usize },

    /// Term index outside of a term table
    #[error("Term index {index} out of range for table with {num_terms} terms")]
    TermIndexOutOfRange { index: usize, num_terms: usize },

    /// Angle vector length does not match the declared arity
    #[error("Expected {expected} angles, got {actual}")]
    AngleCountMismatch { expected: usize, actual: usize },

    /// Angle vector length is not a whole number of layers
    #[error("Angle vector of length {len} does not split into layers of {per_layer} angles")]
    IncompleteLayer { len: usize, per_layer: usize },

    /// Number of layers must be positive
    #[error("QAOA depth must be at least 1")]
    InvalidDepth,

    /// Closed-form evaluation requested for a depth other than 1
    #[error("Analytical evaluation is only available for p = 1, got p = {0}")]
    AnalyticalDepth(usize),

    /// Table dimensions disagree with each other
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Angle duplication scheme does not map onto the full layout
    #[error("Invalid angle scheme: {0}")]
    InvalidScheme(String),

    /// Target coefficients do not match the target terms
    #[error("Expected {expected} target coefficients (one per term plus a shift), got {actual}")]
    CoefficientCountMismatch { expected: usize, actual: usize },
}

impl QaoaError {
    /// Create an angle count mismatch error
    pub fn angle_count(expected: usize, actual: usize) -> Self {
        Self::AngleCountMismatch { expected, actual }
    }

    /// Create an invalid node error
    pub fn invalid_node(node: usize, num_nodes: usize) -> Self {
        Self::InvalidNode { node, num_nodes }
    }
}
