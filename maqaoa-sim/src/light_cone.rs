//! Light-cone restricted simulation
//!
//! After p layers, the expectation of a diagonal term only depends on the
//! qubits reachable from its support by p steps of "share a driver term".
//! Each target term is simulated on that subset alone, with the driver terms
//! that lie entirely inside it. A driver term that only partially overlaps
//! the final subset acts on qubits the target can no longer see, so it
//! cancels out of the expectation.

use crate::error::Result;
use crate::simulation::QaoaSimulator;
use maqaoa_core::{BasisTables, DiagonalTerm, QaoaError, TermTable};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Qubits that can influence `term` after `depth` layers of `driver_terms`
pub fn backward_light_cone(term: &DiagonalTerm, driver_terms: &[DiagonalTerm], depth: usize) -> BTreeSet<usize> {
    let mut cone: BTreeSet<usize> = term.support().into_iter().collect();
    for _ in 0..depth {
        let mut grown = cone.clone();
        for driver in driver_terms {
            let support = driver.support();
            if support.iter().any(|q| cone.contains(q)) {
                grown.extend(support);
            }
        }
        if grown.len() == cone.len() {
            break;
        }
        cone = grown;
    }
    cone
}

/// One target term together with its reduced simulation problem
#[derive(Debug, Clone)]
pub struct LightConeSubset {
    /// Global qubit of each local qubit
    qubits: Vec<usize>,
    /// Global driver term index of each local driver term
    driver_indices: Vec<usize>,
    simulator: QaoaSimulator,
    target: Vec<f64>,
}

impl LightConeSubset {
    /// Build the reduced problem of `term` on a register of `num_qubits`
    pub fn new(
        term: &DiagonalTerm,
        driver_terms: &[DiagonalTerm],
        num_qubits: usize,
        depth: usize,
    ) -> Result<Self> {
        term.validate(0, num_qubits)?;
        for (index, driver) in driver_terms.iter().enumerate() {
            driver.validate(index, num_qubits)?;
        }

        let cone = backward_light_cone(term, driver_terms, depth);
        let qubits: Vec<usize> = cone.iter().copied().collect();
        let mut local = vec![usize::MAX; num_qubits];
        for (position, &qubit) in qubits.iter().enumerate() {
            local[qubit] = position;
        }
        let to_local = |q: usize| local[q];

        let mut driver_indices = Vec::new();
        let mut local_drivers = Vec::new();
        for (index, driver) in driver_terms.iter().enumerate() {
            if driver.support().iter().all(|q| cone.contains(q)) {
                driver_indices.push(index);
                local_drivers.push(driver.relabel(to_local));
            }
        }

        let basis = Arc::new(BasisTables::new(qubits.len())?);
        let table = Arc::new(TermTable::from_terms(&local_drivers, qubits.len())?);
        let local_term = term.relabel(to_local);
        let target = (0..basis.dimension()).map(|label| local_term.value(label)).collect();
        let simulator = QaoaSimulator::new(basis, table, depth)?;

        Ok(Self {
            qubits,
            driver_indices,
            simulator,
            target,
        })
    }

    /// Global qubits of the subset, ascending
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// Global indices of the driver terms simulated on the subset
    pub fn driver_indices(&self) -> &[usize] {
        &self.driver_indices
    }

    /// Expectation of the target term for a full multi-angle vector
    ///
    /// `num_driver_terms` and `num_qubits` describe the global layout the
    /// angles are taken from.
    pub fn expectation(&self, angles: &[f64], num_driver_terms: usize, num_qubits: usize) -> Result<f64> {
        let per_layer = num_driver_terms + num_qubits;
        let expected = per_layer * self.simulator.depth();
        if angles.len() != expected {
            return Err(QaoaError::angle_count(expected, angles.len()).into());
        }

        let mut local = Vec::with_capacity(self.simulator.num_angles());
        for layer in angles.chunks_exact(per_layer) {
            local.extend(self.driver_indices.iter().map(|&t| layer[t]));
            local.extend(self.qubits.iter().map(|&q| layer[num_driver_terms + q]));
        }
        self.simulator.run(&local, &self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use maqaoa_core::{edge_cut_terms, Graph};

    #[test]
    fn test_light_cone_growth() {
        let graph = Graph::path(6);
        let drivers = edge_cut_terms(&graph);
        let term = DiagonalTerm::cut(2, 3);
        let cone: Vec<_> = backward_light_cone(&term, &drivers, 1).into_iter().collect();
        assert_eq!(cone, vec![1, 2, 3, 4]);
        let cone: Vec<_> = backward_light_cone(&term, &drivers, 2).into_iter().collect();
        assert_eq!(cone, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(backward_light_cone(&term, &drivers, 0).len(), 2);
    }

    #[test]
    fn test_subset_matches_full_simulation() {
        let graph = Graph::path(5);
        let drivers = edge_cut_terms(&graph);
        let subset = LightConeSubset::new(&drivers[0], &drivers, 5, 1).unwrap();
        assert_eq!(subset.qubits(), &[0, 1, 2]);
        assert_eq!(subset.driver_indices(), &[0, 1]);

        let basis = Arc::new(BasisTables::new(5).unwrap());
        let table = Arc::new(TermTable::edge_cuts(&graph).unwrap());
        let full = QaoaSimulator::new(basis, table, 1).unwrap();
        let target = full.target_from_terms(Some(&[0])).unwrap();

        let angles: Vec<f64> = (0..9).map(|i| 0.21 * i as f64 - 0.6).collect();
        assert_abs_diff_eq!(
            subset.expectation(&angles, 4, 5).unwrap(),
            full.run(&angles, &target).unwrap(),
            epsilon = 1e-12
        );
        assert!(subset.expectation(&angles[..8], 4, 5).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_term() {
        let drivers = vec![DiagonalTerm::z_product(vec![0])];
        assert!(LightConeSubset::new(&DiagonalTerm::cut(0, 3), &drivers, 2, 1).is_err());
    }
}
