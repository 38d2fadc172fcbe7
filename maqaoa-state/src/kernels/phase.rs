//! Diagonal phase layer
//!
//! Applies `exp(-i * Σ_t γ_t C_t)` where every `C_t` is diagonal in the
//! computational basis. Each amplitude only picks up a phase, so the layer is
//! an element-wise product:
//!
//! ```text
//! ψ'[l] = ψ[l] · exp(-i Σ_t γ_t · C_t[l])
//! ```
//!
//! Cost is O(num_terms · 2^n); no matrix is ever formed.

use crate::error::{Result, StateError};
use crate::state_vector::StateVector;
use maqaoa_core::TermTable;
use num_complex::Complex64;
use rayon::prelude::*;

/// Threshold for parallel execution (number of qubits)
const PARALLEL_THRESHOLD: usize = 16;

/// Labels handled per parallel task
const CHUNK_SIZE: usize = 1 << 12;

/// Accumulate `Σ_t γ_t C_t[l]` for every label
///
/// Rows are read contiguously, one term at a time.
pub fn accumulate_phases(table: &TermTable, gammas: &[f64]) -> Result<Vec<f64>> {
    check_angles(table, gammas)?;
    let mut phases = vec![0.0; table.dimension()];
    for (row, &gamma) in table.rows().zip(gammas) {
        for (phase, value) in phases.iter_mut().zip(row) {
            *phase += gamma * value;
        }
    }
    Ok(phases)
}

/// Apply the phase layer using scalar operations
///
/// This is the reference implementation.
pub fn apply_phase_layer_scalar(
    state: &mut StateVector,
    table: &TermTable,
    gammas: &[f64],
) -> Result<()> {
    check_dimension(state, table)?;
    let phases = accumulate_phases(table, gammas)?;
    for (amplitude, &phase) in state.amplitudes_mut().iter_mut().zip(&phases) {
        *amplitude *= Complex64::from_polar(1.0, -phase);
    }
    Ok(())
}

/// Apply the phase layer using parallel processing
///
/// Distributes label chunks across CPU cores using rayon.
pub fn apply_phase_layer_parallel(
    state: &mut StateVector,
    table: &TermTable,
    gammas: &[f64],
) -> Result<()> {
    check_dimension(state, table)?;
    check_angles(table, gammas)?;

    state
        .amplitudes_mut()
        .par_chunks_mut(CHUNK_SIZE)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            let offset = chunk_index * CHUNK_SIZE;
            let mut phases = vec![0.0; chunk.len()];
            for (row, &gamma) in table.rows().zip(gammas) {
                let values = &row[offset..offset + chunk.len()];
                for (phase, value) in phases.iter_mut().zip(values) {
                    *phase += gamma * value;
                }
            }
            for (amplitude, phase) in chunk.iter_mut().zip(phases) {
                *amplitude *= Complex64::from_polar(1.0, -phase);
            }
        });
    Ok(())
}

/// Apply the phase layer, choosing the parallel path for large registers
pub fn apply_phase_layer(state: &mut StateVector, table: &TermTable, gammas: &[f64]) -> Result<()> {
    if state.num_qubits() >= PARALLEL_THRESHOLD && rayon::current_num_threads() > 1 {
        apply_phase_layer_parallel(state, table, gammas)
    } else {
        apply_phase_layer_scalar(state, table, gammas)
    }
}

fn check_dimension(state: &StateVector, table: &TermTable) -> Result<()> {
    if state.dimension() != table.dimension() {
        return Err(StateError::DimensionMismatch {
            expected: table.dimension(),
            actual: state.dimension(),
        });
    }
    Ok(())
}

fn check_angles(table: &TermTable, gammas: &[f64]) -> Result<()> {
    if gammas.len() != table.num_terms() {
        return Err(StateError::AngleCountMismatch {
            expected: table.num_terms(),
            actual: gammas.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use maqaoa_core::{DiagonalTerm, Graph};

    #[test]
    fn test_single_cut_phase() {
        let table = TermTable::from_terms(&[DiagonalTerm::cut(0, 1)], 2).unwrap();
        let mut state = StateVector::uniform(2).unwrap();
        let gamma = 0.7;
        apply_phase_layer(&mut state, &table, &[gamma]).unwrap();

        let half = 0.5;
        let amps = state.amplitudes();
        assert_relative_eq!(amps[0].re, half, epsilon = 1e-12);
        assert_relative_eq!(amps[3].im, 0.0, epsilon = 1e-12);
        // labels 01 and 10 cut the edge
        assert_relative_eq!(amps[1].re, half * gamma.cos(), epsilon = 1e-12);
        assert_relative_eq!(amps[2].im, -half * gamma.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_phase_layer_preserves_probabilities() {
        let graph = Graph::complete(4);
        let table = TermTable::edge_cuts(&graph).unwrap();
        let mut state = StateVector::uniform(4).unwrap();
        let before = state.probabilities();
        let gammas = [0.1, -0.4, 1.3, 2.2, -3.0, 0.05];
        apply_phase_layer(&mut state, &table, &gammas).unwrap();
        for (a, b) in before.iter().zip(state.probabilities()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_scalar() {
        let graph = Graph::cycle(5);
        let table = TermTable::edge_cuts(&graph).unwrap();
        let gammas = [0.3, -1.1, 0.8, 2.5, -0.2];
        let mut scalar = StateVector::uniform(5).unwrap();
        let mut parallel = scalar.clone();
        apply_phase_layer_scalar(&mut scalar, &table, &gammas).unwrap();
        apply_phase_layer_parallel(&mut parallel, &table, &gammas).unwrap();
        for (a, b) in scalar.amplitudes().iter().zip(parallel.amplitudes()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-14);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_angle_count_checked() {
        let table = TermTable::edge_cuts(&Graph::path(3)).unwrap();
        let mut state = StateVector::uniform(3).unwrap();
        assert_eq!(
            apply_phase_layer(&mut state, &table, &[0.1]).unwrap_err(),
            StateError::AngleCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_dimension_checked() {
        let table = TermTable::edge_cuts(&Graph::path(3)).unwrap();
        let mut state = StateVector::uniform(2).unwrap();
        assert!(matches!(
            apply_phase_layer(&mut state, &table, &[0.1, 0.2]),
            Err(StateError::DimensionMismatch { .. })
        ));
    }
}
