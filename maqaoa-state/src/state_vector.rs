//! Dense state vector over the computational basis

use crate::error::{Result, StateError};
use maqaoa_core::MAX_QUBITS;
use num_complex::Complex64;

/// Quantum state as `2^n` complex amplitudes indexed by basis label
///
/// # Example
///
/// ```
/// use maqaoa_state::StateVector;
///
/// let state = StateVector::uniform(2).unwrap();
/// assert_eq!(state.dimension(), 4);
/// assert!(state.is_normalized(1e-12));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// Create a state initialized to |0...0⟩
    pub fn new(num_qubits: usize) -> Result<Self> {
        check_qubits(num_qubits)?;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create the uniform superposition |+⟩^⊗n
    pub fn uniform(num_qubits: usize) -> Result<Self> {
        check_qubits(num_qubits)?;
        let dimension = 1usize << num_qubits;
        let amplitude = Complex64::new((dimension as f64).sqrt().recip(), 0.0);
        Ok(Self {
            num_qubits,
            amplitudes: vec![amplitude; dimension],
        })
    }

    /// Create a state vector from raw amplitude data
    ///
    /// The amplitudes are taken as given; call [`normalize`](Self::normalize)
    /// if they are not already of unit norm.
    pub fn from_amplitudes(num_qubits: usize, amplitudes: Vec<Complex64>) -> Result<Self> {
        check_qubits(num_qubits)?;
        let dimension = 1usize << num_qubits;
        if amplitudes.len() != dimension {
            return Err(StateError::DimensionMismatch {
                expected: dimension,
                actual: amplitudes.len(),
            });
        }
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Get the number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the state dimension (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Get a reference to the state amplitudes
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Get a mutable reference to the state amplitudes
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Consume the state and return its amplitudes
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Compute the L2 norm of the state vector
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Scale all amplitudes so that the norm equals 1
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 1e-10 {
            let inv_norm = 1.0 / norm;
            for amplitude in &mut self.amplitudes {
                *amplitude *= inv_norm;
            }
        }
    }

    /// Check if the state is normalized (|norm - 1| < epsilon)
    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() < epsilon
    }

    /// Measurement probability of every basis label
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }
}

fn check_qubits(num_qubits: usize) -> Result<()> {
    if num_qubits == 0 || num_qubits > MAX_QUBITS {
        return Err(StateError::InvalidQubitCount {
            num_qubits,
            max_qubits: MAX_QUBITS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let state = StateVector::new(3).unwrap();
        let amplitudes = state.amplitudes();
        assert_eq!(amplitudes[0], Complex64::new(1.0, 0.0));
        for amplitude in &amplitudes[1..] {
            assert_eq!(*amplitude, Complex64::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_uniform_state() {
        let state = StateVector::uniform(3).unwrap();
        for amplitude in state.amplitudes() {
            assert_relative_eq!(amplitude.re, 1.0 / 8f64.sqrt(), epsilon = 1e-15);
            assert_eq!(amplitude.im, 0.0);
        }
        assert_relative_eq!(state.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize() {
        let amplitudes = vec![Complex64::new(1.0, 0.0); 4];
        let mut state = StateVector::from_amplitudes(2, amplitudes).unwrap();
        state.normalize();
        assert_relative_eq!(state.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(state.amplitudes()[0].norm(), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let state = StateVector::uniform(4).unwrap();
        assert_relative_eq!(state.probabilities().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = StateVector::from_amplitudes(2, vec![Complex64::new(1.0, 0.0)]);
        assert_eq!(
            result.unwrap_err(),
            StateError::DimensionMismatch {
                expected: 4,
                actual: 1
            }
        );
    }

    #[test]
    fn test_rejects_empty_register() {
        assert!(matches!(
            StateVector::uniform(0),
            Err(StateError::InvalidQubitCount { .. })
        ));
    }
}
