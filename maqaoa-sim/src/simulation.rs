//! Full state-vector forward simulation of a (multi-angle) QAOA circuit
//!
//! The register starts in the uniform superposition. Every layer applies the
//! phase layer of the driver terms and then the X mixer, taking its angles
//! from the multi-angle layout:
//!
//! ```text
//! [γ_{1,1} .. γ_{1,T}, β_{1,1} .. β_{1,n}, γ_{2,1} .. β_{p,n}]
//! ```
//!
//! where `T` is the number of driver terms and `n` the number of qubits.

use crate::error::Result;
use maqaoa_core::{BasisTables, QaoaError, TermTable};
use maqaoa_state::{kernels, observable, StateVector};
use std::sync::Arc;

/// Forward simulator over shared basis and driver term tables
///
/// The simulator only holds immutable tables; every call allocates its own
/// state, so one simulator can serve concurrent evaluations.
#[derive(Debug, Clone)]
pub struct QaoaSimulator {
    basis: Arc<BasisTables>,
    driver_terms: Arc<TermTable>,
    depth: usize,
}

impl QaoaSimulator {
    /// Create a simulator for `depth` layers
    ///
    /// The term table must be defined over the same register as the basis.
    pub fn new(basis: Arc<BasisTables>, driver_terms: Arc<TermTable>, depth: usize) -> Result<Self> {
        if depth == 0 {
            return Err(QaoaError::InvalidDepth.into());
        }
        if driver_terms.dimension() != basis.dimension() {
            return Err(QaoaError::DimensionMismatch {
                expected: basis.dimension(),
                actual: driver_terms.dimension(),
            }
            .into());
        }
        Ok(Self {
            basis,
            driver_terms,
            depth,
        })
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.basis.num_qubits()
    }

    /// Number of layers
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Angles per layer: one per driver term plus one per qubit
    #[inline]
    pub fn angles_per_layer(&self) -> usize {
        self.driver_terms.num_terms() + self.num_qubits()
    }

    /// Length of the multi-angle vector
    #[inline]
    pub fn num_angles(&self) -> usize {
        self.angles_per_layer() * self.depth
    }

    /// Basis tables shared by this simulator
    pub fn basis(&self) -> &Arc<BasisTables> {
        &self.basis
    }

    /// Driver terms shared by this simulator
    pub fn driver_terms(&self) -> &Arc<TermTable> {
        &self.driver_terms
    }

    /// State after all layers
    pub fn final_state(&self, angles: &[f64]) -> Result<StateVector> {
        if angles.len() != self.num_angles() {
            return Err(QaoaError::angle_count(self.num_angles(), angles.len()).into());
        }

        let num_terms = self.driver_terms.num_terms();
        let mut state = StateVector::uniform(self.num_qubits())?;
        for layer in angles.chunks_exact(self.angles_per_layer()) {
            let (gammas, betas) = layer.split_at(num_terms);
            kernels::apply_phase_layer(&mut state, &self.driver_terms, gammas)?;
            kernels::apply_mixer_layer(&mut state, betas, &self.basis)?;
        }
        Ok(state)
    }

    /// Expectation of a diagonal target after all layers
    pub fn run(&self, angles: &[f64], target: &[f64]) -> Result<f64> {
        if target.len() != self.basis.dimension() {
            return Err(QaoaError::DimensionMismatch {
                expected: self.basis.dimension(),
                actual: target.len(),
            }
            .into());
        }
        let state = self.final_state(angles)?;
        Ok(observable::expectation_diagonal(&state, target)?)
    }

    /// Target diagonal summed from driver term rows
    ///
    /// `None` sums every row.
    pub fn target_from_terms(&self, indices: Option<&[usize]>) -> Result<Vec<f64>> {
        match indices {
            None => Ok(self.driver_terms.sum_all()),
            Some(indices) => Ok(self.driver_terms.sum_rows(indices)?),
        }
    }
}

/// Expectation of the summed driver terms after `depth` multi-angle layers
///
/// `term_indices` restricts the target to a subset of the driver term rows;
/// `None` uses all of them.
pub fn run_ma_qaoa_simulation(
    angles: &[f64],
    depth: usize,
    driver_terms: &Arc<TermTable>,
    basis: &Arc<BasisTables>,
    term_indices: Option<&[usize]>,
) -> Result<f64> {
    let simulator = QaoaSimulator::new(Arc::clone(basis), Arc::clone(driver_terms), depth)?;
    let target = simulator.target_from_terms(term_indices)?;
    simulator.run(angles, &target)
}

/// Same as [`run_ma_qaoa_simulation`] with standard `[γ, β]` per layer angles
pub fn run_qaoa_simulation(
    angles: &[f64],
    depth: usize,
    driver_terms: &Arc<TermTable>,
    basis: &Arc<BasisTables>,
    term_indices: Option<&[usize]>,
) -> Result<f64> {
    let full = crate::angles::expand_standard_angles(
        angles,
        driver_terms.num_terms(),
        basis.num_qubits(),
    )?;
    run_ma_qaoa_simulation(&full, depth, driver_terms, basis, term_indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use maqaoa_core::Graph;
    use std::f64::consts::{FRAC_PI_4, FRAC_PI_8};

    fn setup(graph: &Graph) -> (Arc<BasisTables>, Arc<TermTable>) {
        (
            Arc::new(BasisTables::new(graph.num_nodes()).unwrap()),
            Arc::new(TermTable::edge_cuts(graph).unwrap()),
        )
    }

    #[test]
    fn test_zero_angles_give_average_cut() {
        let graph = Graph::complete(4);
        let (basis, table) = setup(&graph);
        let simulator = QaoaSimulator::new(basis, table, 2).unwrap();
        let target = simulator.target_from_terms(None).unwrap();
        let value = simulator.run(&vec![0.0; simulator.num_angles()], &target).unwrap();
        assert_abs_diff_eq!(value, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_edge_optimum() {
        // p = 1 on one edge reaches a full cut at γ = π/2, β_u + β_v = π/4
        let graph = Graph::path(2);
        let (basis, table) = setup(&graph);
        let angles = [std::f64::consts::FRAC_PI_2, FRAC_PI_8, FRAC_PI_8];
        let value = run_ma_qaoa_simulation(&angles, 1, &table, &basis, None).unwrap();
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_state_stays_normalized() {
        let graph = Graph::cycle(5);
        let (basis, table) = setup(&graph);
        let simulator = QaoaSimulator::new(basis, table, 3).unwrap();
        let angles: Vec<f64> = (0..simulator.num_angles())
            .map(|i| 0.37 * i as f64 - 1.1)
            .collect();
        let state = simulator.final_state(&angles).unwrap();
        assert!(state.is_normalized(1e-12));
    }

    #[test]
    fn test_standard_matches_expanded() {
        let graph = Graph::star(4);
        let (basis, table) = setup(&graph);
        let standard = [0.4, FRAC_PI_4, -0.9, 0.2];
        let full = crate::angles::expand_standard_angles(&standard, 3, 4).unwrap();
        let a = run_qaoa_simulation(&standard, 2, &table, &basis, None).unwrap();
        let b = run_ma_qaoa_simulation(&full, 2, &table, &basis, None).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-14);
    }

    #[test]
    fn test_contract_violations() {
        let graph = Graph::path(3);
        let (basis, table) = setup(&graph);
        assert!(QaoaSimulator::new(basis.clone(), table.clone(), 0).is_err());

        let simulator = QaoaSimulator::new(basis.clone(), table.clone(), 1).unwrap();
        let target = simulator.target_from_terms(None).unwrap();
        assert!(simulator.run(&[0.1; 4], &target).is_err());
        assert!(simulator.run(&[0.1; 5], &target[..4]).is_err());
        assert!(simulator.target_from_terms(Some(&[2])).is_err());

        let other = Arc::new(BasisTables::new(2).unwrap());
        assert!(QaoaSimulator::new(other, table, 1).is_err());
    }
}
