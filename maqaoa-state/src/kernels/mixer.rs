//! Single-qubit rotation layer driven by the basis index tables
//!
//! The mixer `exp(-i Σ_q β_q X_q)` is a tensor product of commuting
//! single-qubit rotations, so it is applied one qubit at a time. Since
//! `X² = I`, each rotation has the closed form
//!
//! ```text
//! exp(-iβX) = cos(β)·I - i·sin(β)·X
//! ```
//!
//! A rotation on qubit `q` only couples a label with its neighbor across
//! `q`, which the neighbor table provides directly:
//!
//! ```text
//! ψ'[l] = ψ[l]·U[b][b] + ψ[n]·U[b][1-b]      b = bit(l, q), n = neighbour(l, q)
//! ```
//!
//! Every qubit pass reads from a snapshot of the amplitudes and writes into a
//! second buffer; reading partially updated neighbors would be wrong.

use crate::error::{Result, StateError};
use crate::state_vector::StateVector;
use maqaoa_core::BasisTables;
use num_complex::Complex64;
use rayon::prelude::*;

/// Threshold for parallel execution (number of qubits)
const PARALLEL_THRESHOLD: usize = 16;

/// 2x2 single-qubit unitary, indexed `[output bit][input bit]`
pub type Unitary2 = [[Complex64; 2]; 2];

/// Closed-form `exp(-iβX)`
#[inline]
pub fn exp_x(beta: f64) -> Unitary2 {
    let c = Complex64::new(beta.cos(), 0.0);
    let s = Complex64::new(0.0, -beta.sin());
    [[c, s], [s, c]]
}

/// Apply a single-qubit unitary to `qubit`
///
/// Reads every amplitude from `input` and writes the rotated amplitudes into
/// `output`. Both slices must have the basis dimension.
pub fn apply_single_qubit(
    unitary: &Unitary2,
    input: &[Complex64],
    output: &mut [Complex64],
    qubit: usize,
    basis: &BasisTables,
) -> Result<()> {
    for len in [input.len(), output.len()] {
        if len != basis.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: basis.dimension(),
                actual: len,
            });
        }
    }
    if qubit >= basis.num_qubits() {
        return Err(StateError::InvalidQubitIndex {
            index: qubit,
            num_qubits: basis.num_qubits(),
        });
    }

    let update = |label: usize| {
        let bit = basis.bit(label, qubit) as usize;
        let neighbour = basis.neighbour(label, qubit);
        input[label] * unitary[bit][bit] + input[neighbour] * unitary[bit][1 - bit]
    };

    if basis.num_qubits() >= PARALLEL_THRESHOLD && rayon::current_num_threads() > 1 {
        output
            .par_iter_mut()
            .enumerate()
            .for_each(|(label, out)| *out = update(label));
    } else {
        for (label, out) in output.iter_mut().enumerate() {
            *out = update(label);
        }
    }
    Ok(())
}

/// Apply one rotation to a state, returning the rotated state
pub fn apply_rotation(
    unitary: &Unitary2,
    state: &StateVector,
    qubit: usize,
    basis: &BasisTables,
) -> Result<StateVector> {
    check_basis(state, basis)?;
    let mut output = vec![Complex64::new(0.0, 0.0); state.dimension()];
    apply_single_qubit(unitary, state.amplitudes(), &mut output, qubit, basis)?;
    StateVector::from_amplitudes(state.num_qubits(), output)
}

/// Apply `exp(-iβ_q X_q)` to every qubit `q`
///
/// Two buffers are swapped between qubit passes, so one layer allocates a
/// single scratch vector.
pub fn apply_mixer_layer(state: &mut StateVector, betas: &[f64], basis: &BasisTables) -> Result<()> {
    check_basis(state, basis)?;
    if betas.len() != basis.num_qubits() {
        return Err(StateError::AngleCountMismatch {
            expected: basis.num_qubits(),
            actual: betas.len(),
        });
    }

    let mut scratch = vec![Complex64::new(0.0, 0.0); state.dimension()];
    for (qubit, &beta) in betas.iter().enumerate() {
        let unitary = exp_x(beta);
        apply_single_qubit(&unitary, state.amplitudes(), &mut scratch, qubit, basis)?;
        state.amplitudes_mut().swap_with_slice(&mut scratch);
    }
    Ok(())
}

fn check_basis(state: &StateVector, basis: &BasisTables) -> Result<()> {
    if state.dimension() != basis.dimension() {
        return Err(StateError::DimensionMismatch {
            expected: basis.dimension(),
            actual: state.dimension(),
        });
    }
    Ok(())
}
