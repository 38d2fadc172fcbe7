//! Quantum state vectors and basis-indexed kernels for QAOA simulation
//!
//! This crate provides the dense [`StateVector`] and the kernels that evolve
//! it without building any `2^n x 2^n` matrix:
//!
//! - **Phase layer**: element-wise phases from a diagonal term table
//! - **Mixer layer**: closed-form `exp(-iβX)` per qubit via the neighbor table
//! - **Diagonal expectation**: `⟨ψ|D|ψ⟩` for diagonal observables
//!
//! # Example
//!
//! ```
//! use maqaoa_core::{BasisTables, Graph, TermTable};
//! use maqaoa_state::{kernels, observable, StateVector};
//!
//! let graph = Graph::path(2);
//! let basis = BasisTables::new(2).unwrap();
//! let table = TermTable::edge_cuts(&graph).unwrap();
//!
//! let mut state = StateVector::uniform(2).unwrap();
//! kernels::apply_phase_layer(&mut state, &table, &[0.5]).unwrap();
//! kernels::apply_mixer_layer(&mut state, &[0.3, 0.3], &basis).unwrap();
//!
//! let cut = observable::expectation_diagonal(&state, &table.sum_all()).unwrap();
//! assert!(cut > 0.0 && cut < 1.0);
//! ```

pub mod error;
pub mod kernels;
pub mod observable;
pub mod state_vector;

pub use error::{Result, StateError};
pub use observable::expectation_diagonal;
pub use state_vector::StateVector;
