//! Expectation values of diagonal observables
//!
//! For an observable `D` that is diagonal in the computational basis,
//!
//! ```text
//! ⟨ψ|D|ψ⟩ = Σ_l conj(ψ[l]) · D[l] · ψ[l]
//! ```
//!
//! which is real up to rounding. The real part of the conjugate-weighted dot
//! product is returned.

use crate::error::{Result, StateError};
use crate::state_vector::StateVector;
use num_complex::Complex64;

/// Expectation value of a diagonal observable given by its values per label
pub fn expectation_diagonal(state: &StateVector, diagonal: &[f64]) -> Result<f64> {
    if diagonal.len() != state.dimension() {
        return Err(StateError::DimensionMismatch {
            expected: state.dimension(),
            actual: diagonal.len(),
        });
    }
    let value: Complex64 = state
        .amplitudes()
        .iter()
        .zip(diagonal)
        .map(|(&amplitude, &d)| amplitude.conj() * (amplitude * d))
        .sum();
    Ok(value.re)
}
