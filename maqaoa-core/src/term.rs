//! Diagonal terms and their value tables
//!
//! A [`TermTable`] stores, for every term, the term's diagonal evaluated at
//! every basis label. Rows follow the term order, which is also the order of
//! the per-term angles in the multi-angle layout.

use crate::basis::{qubit_value, MAX_QUBITS};
use crate::error::QaoaError;
use crate::graph::Graph;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Diagonal operator acting on a few qubits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagonalTerm {
    /// `weight` when qubits `u` and `v` differ, 0 otherwise
    Cut { u: usize, v: usize, weight: f64 },
    /// Product of Pauli Z over `qubits`: `(-1)^(sum of bits)`
    ZProduct { qubits: Vec<usize> },
}

impl DiagonalTerm {
    /// Unit-weight cut term
    pub fn cut(u: usize, v: usize) -> Self {
        Self::Cut { u, v, weight: 1.0 }
    }

    /// Z-product term
    pub fn z_product(qubits: impl Into<Vec<usize>>) -> Self {
        Self::ZProduct {
            qubits: qubits.into(),
        }
    }

    /// Qubits the term acts on
    pub fn support(&self) -> Vec<usize> {
        match self {
            Self::Cut { u, v, .. } => vec![*u, *v],
            Self::ZProduct { qubits } => qubits.clone(),
        }
    }

    /// Term value at a basis label
    pub fn value(&self, label: usize) -> f64 {
        match self {
            Self::Cut { u, v, weight } => {
                if qubit_value(label, *u) != qubit_value(label, *v) {
                    *weight
                } else {
                    0.0
                }
            }
            Self::ZProduct { qubits } => {
                let parity = qubits.iter().fold(0u8, |acc, &q| acc ^ qubit_value(label, q));
                if parity == 0 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Same term with every qubit index passed through `map`
    ///
    /// Used to move a term onto a sub-register with its own bit positions.
    pub fn relabel(&self, map: impl Fn(usize) -> usize) -> Self {
        match self {
            Self::Cut { u, v, weight } => Self::Cut {
                u: map(*u),
                v: map(*v),
                weight: *weight,
            },
            Self::ZProduct { qubits } => Self::ZProduct {
                qubits: qubits.iter().map(|&q| map(q)).collect(),
            },
        }
    }

    /// Check that the term is well formed for a register of `num_qubits`
    pub fn validate(&self, index: usize, num_qubits: usize) -> Result<()> {
        let support = self.support();
        if support.is_empty() {
            return Err(QaoaError::EmptyTerm(index));
        }
        if let Some(&qubit) = support.iter().find(|&&q| q >= num_qubits) {
            return Err(QaoaError::TermQubitOutOfRange {
                term: index,
                qubit,
                num_qubits,
            });
        }
        Ok(())
    }
}

/// Values of a set of diagonal terms over all basis labels
#[derive(Debug, Clone, PartialEq)]
pub struct TermTable {
    num_qubits: usize,
    num_terms: usize,
    /// Row-major `num_terms x 2^num_qubits`
    values: Vec<f64>,
}

impl TermTable {
    /// Evaluate `terms` at every basis label of an n-qubit register
    pub fn from_terms(terms: &[DiagonalTerm], num_qubits: usize) -> Result<Self> {
        check_register(num_qubits)?;
        for (index, term) in terms.iter().enumerate() {
            term.validate(index, num_qubits)?;
        }

        let start = Instant::now();
        let dimension = 1usize << num_qubits;
        let mut values = Vec::with_capacity(terms.len() * dimension);
        for term in terms {
            values.extend((0..dimension).map(|label| term.value(label)));
        }
        debug!(
            num_qubits,
            num_terms = terms.len(),
            elapsed = ?start.elapsed(),
            "term table built"
        );

        Ok(Self {
            num_qubits,
            num_terms: terms.len(),
            values,
        })
    }

    /// One weighted cut term per graph edge, in edge order
    pub fn edge_cuts(graph: &Graph) -> Result<Self> {
        Self::from_terms(&edge_cut_terms(graph), graph.num_nodes())
    }

    /// One Z-product term per qubit set
    pub fn z_products(terms: &[Vec<usize>], num_qubits: usize) -> Result<Self> {
        let terms: Vec<_> = terms.iter().cloned().map(DiagonalTerm::z_product).collect();
        Self::from_terms(&terms, num_qubits)
    }

    /// Build a table from explicit rows, each of length `2^num_qubits`
    pub fn from_rows(rows: Vec<Vec<f64>>, num_qubits: usize) -> Result<Self> {
        check_register(num_qubits)?;
        let dimension = 1usize << num_qubits;
        if let Some(row) = rows.iter().find(|row| row.len() != dimension) {
            return Err(QaoaError::DimensionMismatch {
                expected: dimension,
                actual: row.len(),
            });
        }
        Ok(Self {
            num_qubits,
            num_terms: rows.len(),
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of qubits of the register
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of terms (rows)
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// Number of basis labels (columns)
    #[inline]
    pub fn dimension(&self) -> usize {
        1 << self.num_qubits
    }

    /// Values of one term over all labels
    #[inline]
    pub fn row(&self, term: usize) -> &[f64] {
        let dimension = self.dimension();
        &self.values[term * dimension..(term + 1) * dimension]
    }

    /// Iterate over all rows in term order
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.dimension())
    }

    /// Element-wise sum of the selected rows
    ///
    /// An empty selection yields the zero diagonal.
    pub fn sum_rows(&self, indices: &[usize]) -> Result<Vec<f64>> {
        let mut total = vec![0.0; self.dimension()];
        for &index in indices {
            if index >= self.num_terms {
                return Err(QaoaError::TermIndexOutOfRange {
                    index,
                    num_terms: self.num_terms,
                });
            }
            for (acc, value) in total.iter_mut().zip(self.row(index)) {
                *acc += value;
            }
        }
        Ok(total)
    }

    /// Sum of every row
    pub fn sum_all(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.dimension()];
        for row in self.rows() {
            for (acc, value) in total.iter_mut().zip(row) {
                *acc += value;
            }
        }
        total
    }
}

/// Weighted cut terms of every graph edge
pub fn edge_cut_terms(graph: &Graph) -> Vec<DiagonalTerm> {
    graph
        .edges()
        .iter()
        .map(|e| DiagonalTerm::Cut {
            u: e.u,
            v: e.v,
            weight: e.weight,
        })
        .collect()
}

/// Weighted cut value of every basis label, restricted to `edge_list`
///
/// `None` counts every edge.
pub fn evaluate_graph_cut(graph: &Graph, edge_list: Option<&[(usize, usize)]>) -> Result<Vec<f64>> {
    check_register(graph.num_nodes())?;
    let indices = graph.edge_indices(edge_list)?;
    let dimension = 1usize << graph.num_nodes();
    let mut values = vec![0.0; dimension];
    for index in indices {
        let edge = graph.edges()[index];
        let term = DiagonalTerm::Cut {
            u: edge.u,
            v: edge.v,
            weight: edge.weight,
        };
        for (label, value) in values.iter_mut().enumerate() {
            *value += term.value(label);
        }
    }
    Ok(values)
}

fn check_register(num_qubits: usize) -> Result<()> {
    if num_qubits == 0 {
        return Err(QaoaError::EmptyProblem);
    }
    if num_qubits > MAX_QUBITS {
        return Err(QaoaError::TooManyQubits {
            num_qubits,
            max_qubits: MAX_QUBITS,
        });
    }
    Ok(())
}
