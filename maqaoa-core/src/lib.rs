//! Core types for MA-QAOA MaxCut problems
//!
//! This crate provides the problem description consumed by the simulation
//! and optimization layers:
//! - [`Graph`]: weighted MaxCut graph with edge index lookup
//! - [`BasisTables`]: neighbor and bit-value tables over all basis labels
//! - [`DiagonalTerm`] / [`TermTable`]: diagonal driver and target terms
//!   evaluated at every basis label
//!
//! # Example
//! ```
//! use maqaoa_core::{BasisTables, Graph, TermTable};
//!
//! let graph = Graph::cycle(4);
//! let basis = BasisTables::new(graph.num_nodes()).unwrap();
//! let table = TermTable::edge_cuts(&graph).unwrap();
//! assert_eq!(table.num_terms(), 4);
//! assert_eq!(table.dimension(), basis.dimension());
//! ```

pub mod basis;
pub mod error;
pub mod graph;
pub mod term;

pub use basis::{check_edge_cut, BasisTables, MAX_QUBITS};
pub use error::QaoaError;
pub use graph::{Edge, Graph};
pub use term::{edge_cut_terms, evaluate_graph_cut, DiagonalTerm, TermTable};

/// Result type for problem construction and evaluation contracts
pub type Result<T> = std::result::Result<T, QaoaError>;
