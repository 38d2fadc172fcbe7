//! Basis index tables
//!
//! Basis labels are integers whose bit `q` holds the value of qubit `q`.
//! The tables are dense `2^n x n` arrays indexed by label, so that the mixer
//! kernel never computes bit positions on the hot path:
//!
//! - neighbor table: `neighbour(label, q)` is `label` with qubit `q` flipped
//! - bit table: `bit(label, q)` is the value of qubit `q` in `label`

use crate::error::QaoaError;
use crate::Result;
use std::time::Instant;
use tracing::debug;

/// Largest register the tables are built for
///
/// At this size the neighbor table holds 2^20 x 20 `u32` labels (80 MiB).
pub const MAX_QUBITS: usize = 20;

/// Neighbor and bit-value tables for an n-qubit register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisTables {
    num_qubits: usize,
    /// Row-major `dimension x num_qubits`
    neighbours: Vec<u32>,
    /// Row-major `dimension x num_qubits`
    bits: Vec<u8>,
}

impl BasisTables {
    /// Build the tables for `num_qubits` qubits
    ///
    /// # Example
    /// ```
    /// use maqaoa_core::BasisTables;
    ///
    /// let basis = BasisTables::new(3).unwrap();
    /// assert_eq!(basis.dimension(), 8);
    /// assert_eq!(basis.neighbour(0b101, 1), 0b111);
    /// assert_eq!(basis.bit(0b101, 2), 1);
    /// ```
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QaoaError::EmptyProblem);
        }
        if num_qubits > MAX_QUBITS {
            return Err(QaoaError::TooManyQubits {
                num_qubits,
                max_qubits: MAX_QUBITS,
            });
        }

        let start = Instant::now();
        let dimension = 1usize << num_qubits;
        let mut neighbours = Vec::with_capacity(dimension * num_qubits);
        let mut bits = Vec::with_capacity(dimension * num_qubits);
        for label in 0..dimension {
            for q in 0..num_qubits {
                // label < 2^MAX_QUBITS fits in u32
                neighbours.push(neighbour_label(label, q) as u32);
                bits.push(qubit_value(label, q));
            }
        }
        debug!(
            num_qubits,
            elapsed = ?start.elapsed(),
            "basis tables built"
        );

        Ok(Self {
            num_qubits,
            neighbours,
            bits,
        })
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of basis labels (2^n)
    #[inline]
    pub fn dimension(&self) -> usize {
        1 << self.num_qubits
    }

    /// Label obtained by flipping `qubit` in `label`
    #[inline]
    pub fn neighbour(&self, label: usize, qubit: usize) -> usize {
        self.neighbours[label * self.num_qubits + qubit] as usize
    }

    /// Value of `qubit` in `label`
    #[inline]
    pub fn bit(&self, label: usize, qubit: usize) -> u8 {
        self.bits[label * self.num_qubits + qubit]
    }

    /// Neighbor labels of one qubit for every basis label
    pub fn neighbour_column(&self, qubit: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbours
            .iter()
            .skip(qubit)
            .step_by(self.num_qubits)
            .map(|&n| n as usize)
    }

    /// Values of one qubit for every basis label
    pub fn bit_column(&self, qubit: usize) -> impl Iterator<Item = u8> + '_ {
        self.bits.iter().skip(qubit).step_by(self.num_qubits).copied()
    }
}

/// Label with `qubit` flipped
#[inline]
pub fn neighbour_label(label: usize, qubit: usize) -> usize {
    label ^ (1 << qubit)
}

/// Value of `qubit` in `label`
#[inline]
pub fn qubit_value(label: usize, qubit: usize) -> u8 {
    ((label >> qubit) & 1) as u8
}

/// Cut indicator of edge `(u, v)`: 1 when the endpoints take different values
#[inline]
pub fn check_edge_cut(label: usize, u: usize, v: usize) -> f64 {
    if qubit_value(label, u) != qubit_value(label, v) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_is_involutive() {
        let basis = BasisTables::new(4).unwrap();
        for label in 0..basis.dimension() {
            for q in 0..4 {
                let flipped = basis.neighbour(label, q);
                assert_ne!(flipped, label);
                assert_eq!(basis.neighbour(flipped, q), label);
            }
        }
    }

    #[test]
    fn test_bits_consistent_with_neighbours() {
        let basis = BasisTables::new(3).unwrap();
        for label in 0..basis.dimension() {
            for q in 0..3 {
                let flipped = basis.neighbour(label, q);
                for other in 0..3 {
                    if other == q {
                        assert_eq!(basis.bit(flipped, q), 1 - basis.bit(label, q));
                    } else {
                        assert_eq!(basis.bit(flipped, other), basis.bit(label, other));
                    }
                }
            }
        }
    }

    #[test]
    fn test_columns() {
        let basis = BasisTables::new(2).unwrap();
        let bits: Vec<u8> = basis.bit_column(1).collect();
        assert_eq!(bits, vec![0, 0, 1, 1]);
        let neighbours: Vec<usize> = basis.neighbour_column(0).collect();
        assert_eq!(neighbours, vec![1, 0, 3, 2]);
    }

    #[test]
    fn test_edge_cut() {
        assert_eq!(check_edge_cut(0b01, 0, 1), 1.0);
        assert_eq!(check_edge_cut(0b11, 0, 1), 0.0);
        assert_eq!(check_edge_cut(0b100, 0, 1), 0.0);
    }

    #[test]
    fn test_largest_register_labels() {
        let basis = BasisTables::new(MAX_QUBITS).unwrap();
        let last = basis.dimension() - 1;
        assert_eq!(basis.neighbour(last, MAX_QUBITS - 1), last >> 1);
        assert_eq!(basis.neighbour(0, MAX_QUBITS - 1), 1 << (MAX_QUBITS - 1));
        assert_eq!(basis.bit(last, MAX_QUBITS - 1), 1);
    }

    #[test]
    fn test_limits() {
        assert_eq!(BasisTables::new(0).unwrap_err(), QaoaError::EmptyProblem);
        assert!(matches!(
            BasisTables::new(MAX_QUBITS + 1),
            Err(QaoaError::TooManyQubits { .. })
        ));
    }
}
