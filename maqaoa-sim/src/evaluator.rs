//! Uniform evaluator over simulation, closed-form and light-cone backends
//!
//! An [`Evaluator`] fixes the number of input angles and maps them through
//! its [`AngleLayout`] onto the full multi-angle vector its backend consumes.
//! [`Evaluator::evaluate`] returns the negated expectation, which is the
//! quantity the local optimizers minimize.

use crate::analytical;
use crate::angles::{AngleLayout, DuplicationScheme};
use crate::config::{Backend, EvaluatorConfig};
use crate::error::Result;
use crate::light_cone::LightConeSubset;
use crate::simulation::QaoaSimulator;
use maqaoa_core::{edge_cut_terms, BasisTables, DiagonalTerm, Graph, QaoaError, TermTable};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Computes the expectation for a full multi-angle vector
///
/// Implementations hold only immutable data so evaluations can run
/// concurrently.
pub trait ExpectationBackend: fmt::Debug + Send + Sync {
    /// Length of the full angle vector
    fn num_angles(&self) -> usize;

    /// Expectation of the target for `angles`
    fn expectation(&self, angles: &[f64]) -> Result<f64>;
}

/// Full state-vector simulation against a diagonal target
#[derive(Debug, Clone)]
pub struct SimulationBackend {
    simulator: QaoaSimulator,
    target: Arc<Vec<f64>>,
}

impl SimulationBackend {
    pub fn new(simulator: QaoaSimulator, target: Arc<Vec<f64>>) -> Result<Self> {
        let dimension = simulator.basis().dimension();
        if target.len() != dimension {
            return Err(QaoaError::DimensionMismatch {
                expected: dimension,
                actual: target.len(),
            }
            .into());
        }
        Ok(Self { simulator, target })
    }
}

impl ExpectationBackend for SimulationBackend {
    fn num_angles(&self) -> usize {
        self.simulator.num_angles()
    }

    fn expectation(&self, angles: &[f64]) -> Result<f64> {
        self.simulator.run(angles, &self.target)
    }
}

/// Closed-form p = 1 MA-QAOA MaxCut
#[derive(Debug, Clone)]
pub struct MaCutAnalyticalBackend {
    graph: Arc<Graph>,
    edges: Vec<usize>,
}

impl ExpectationBackend for MaCutAnalyticalBackend {
    fn num_angles(&self) -> usize {
        self.graph.num_edges() + self.graph.num_nodes()
    }

    fn expectation(&self, angles: &[f64]) -> Result<f64> {
        analytical::ma_qaoa_expectation_p1_indices(angles, &self.graph, &self.edges)
    }
}

/// Closed-form generalized first-order ansatz, n γ then n β
#[derive(Debug, Clone)]
pub struct GeneralZ1Backend {
    graph: Arc<Graph>,
}

impl ExpectationBackend for GeneralZ1Backend {
    fn num_angles(&self) -> usize {
        2 * self.graph.num_nodes()
    }

    fn expectation(&self, angles: &[f64]) -> Result<f64> {
        analytical::general_z1_expectation(angles, &self.graph)
    }
}

/// Closed-form generalized first-order ansatz with every β at π/4
#[derive(Debug, Clone)]
pub struct GeneralZ1ReducedBackend {
    graph: Arc<Graph>,
}

impl ExpectationBackend for GeneralZ1ReducedBackend {
    fn num_angles(&self) -> usize {
        self.graph.num_nodes()
    }

    fn expectation(&self, angles: &[f64]) -> Result<f64> {
        analytical::general_z1_reduced_expectation(angles, &self.graph)
    }
}

/// Sum of per-term light-cone simulations: `shift + Σ c_k ⟨T_k⟩`
#[derive(Debug, Clone)]
pub struct LightConeBackend {
    subsets: Vec<LightConeSubset>,
    coefficients: Vec<f64>,
    shift: f64,
    num_driver_terms: usize,
    num_qubits: usize,
    depth: usize,
}

impl LightConeBackend {
    /// Build one subset per target term
    ///
    /// `coefficients` holds one weight per target term followed by a constant
    /// shift.
    pub fn new(
        num_qubits: usize,
        target_terms: &[DiagonalTerm],
        coefficients: &[f64],
        driver_terms: &[DiagonalTerm],
        depth: usize,
    ) -> Result<Self> {
        if depth == 0 {
            return Err(QaoaError::InvalidDepth.into());
        }
        if coefficients.len() != target_terms.len() + 1 {
            return Err(QaoaError::CoefficientCountMismatch {
                expected: target_terms.len() + 1,
                actual: coefficients.len(),
            }
            .into());
        }

        let subsets = target_terms
            .iter()
            .map(|term| LightConeSubset::new(term, driver_terms, num_qubits, depth))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            num_subsets = subsets.len(),
            max_qubits = subsets.iter().map(|s| s.qubits().len()).max().unwrap_or(0),
            "light cone subsets built"
        );

        let (weights, shift) = coefficients.split_at(target_terms.len());
        Ok(Self {
            subsets,
            coefficients: weights.to_vec(),
            shift: shift[0],
            num_driver_terms: driver_terms.len(),
            num_qubits,
            depth,
        })
    }

    /// Subsets in target term order
    pub fn subsets(&self) -> &[LightConeSubset] {
        &self.subsets
    }
}

impl ExpectationBackend for LightConeBackend {
    fn num_angles(&self) -> usize {
        (self.num_driver_terms + self.num_qubits) * self.depth
    }

    fn expectation(&self, angles: &[f64]) -> Result<f64> {
        let terms = self
            .subsets
            .par_iter()
            .zip(self.coefficients.par_iter())
            .map(|(subset, &c)| {
                subset
                    .expectation(angles, self.num_driver_terms, self.num_qubits)
                    .map(|value| c * value)
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(self.shift + terms.iter().sum::<f64>())
    }
}

/// Expectation evaluator with a fixed input arity
///
/// Cheap to clone; clones share the backend and its tables.
///
/// # Example
///
/// ```
/// use maqaoa_core::Graph;
/// use maqaoa_sim::Evaluator;
///
/// let graph = Graph::cycle(4);
/// let evaluator = Evaluator::standard_maxcut(&graph, 2, None, false).unwrap();
/// assert_eq!(evaluator.num_angles(), 4);
/// let value = evaluator.evaluate(&[0.0; 4]).unwrap();
/// assert!((value + 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    backend: Arc<dyn ExpectationBackend>,
    layout: AngleLayout,
    num_angles: usize,
    objective_bound: Option<f64>,
}

impl Evaluator {
    /// Wrap a backend with an angle layout
    pub fn new(backend: Arc<dyn ExpectationBackend>, layout: AngleLayout) -> Result<Self> {
        let full_len = backend.num_angles();
        layout.validate(full_len)?;
        Ok(Self {
            num_angles: layout.num_angles(full_len),
            backend,
            layout,
            objective_bound: None,
        })
    }

    /// Attach the known attainable maximum of the expectation
    pub fn with_objective_bound(mut self, bound: f64) -> Self {
        self.objective_bound = Some(bound);
        self
    }

    /// Number of input angles
    #[inline]
    pub fn num_angles(&self) -> usize {
        self.num_angles
    }

    /// Angle layout
    pub fn layout(&self) -> &AngleLayout {
        &self.layout
    }

    /// Known attainable maximum, if any
    pub fn objective_bound(&self) -> Option<f64> {
        self.objective_bound
    }

    /// Raw expectation for `angles`
    pub fn expectation(&self, angles: &[f64]) -> Result<f64> {
        if angles.len() != self.num_angles {
            return Err(QaoaError::angle_count(self.num_angles, angles.len()).into());
        }
        let full = self.layout.expand(angles)?;
        self.backend.expectation(&full)
    }

    /// Negated expectation, the value to minimize
    pub fn evaluate(&self, angles: &[f64]) -> Result<f64> {
        Ok(-self.expectation(angles)?)
    }

    /// Simulation evaluator for arbitrary driver terms and target
    ///
    /// With `multi_angle == false` the input is one γ and one β per layer.
    pub fn general(
        basis: Arc<BasisTables>,
        driver_terms: Arc<TermTable>,
        target: Arc<Vec<f64>>,
        depth: usize,
        multi_angle: bool,
    ) -> Result<Self> {
        let layout = if multi_angle {
            AngleLayout::MultiAngle
        } else {
            AngleLayout::Standard {
                num_terms: driver_terms.num_terms(),
                num_qubits: basis.num_qubits(),
            }
        };
        let simulator = QaoaSimulator::new(basis, driver_terms, depth)?;
        Self::new(Arc::new(SimulationBackend::new(simulator, target)?), layout)
    }

    /// Simulation evaluator whose input angles are duplicated by `scheme`
    pub fn general_scheme(
        basis: Arc<BasisTables>,
        driver_terms: Arc<TermTable>,
        target: Arc<Vec<f64>>,
        depth: usize,
        scheme: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let simulator = QaoaSimulator::new(basis, driver_terms, depth)?;
        let scheme = DuplicationScheme::new(scheme, simulator.num_angles())?;
        Self::new(
            Arc::new(SimulationBackend::new(simulator, target)?),
            AngleLayout::Scheme(scheme),
        )
    }

    /// Simulated MaxCut with one weighted cut driver term per edge
    ///
    /// The target sums the cut terms of `edge_list` (every edge when `None`).
    pub fn standard_maxcut(
        graph: &Graph,
        depth: usize,
        edge_list: Option<&[(usize, usize)]>,
        multi_angle: bool,
    ) -> Result<Self> {
        let edges = graph.edge_indices(edge_list)?;
        let basis = Arc::new(BasisTables::new(graph.num_nodes())?);
        let driver_terms = Arc::new(TermTable::edge_cuts(graph)?);
        let target = Arc::new(driver_terms.sum_rows(&edges)?);
        let evaluator = Self::general(basis, driver_terms, target, depth, multi_angle)?;
        Ok(evaluator.with_objective_bound(selected_weight(graph, &edges)))
    }

    /// Closed-form p = 1 MaxCut
    pub fn standard_maxcut_analytical(
        graph: Arc<Graph>,
        edge_list: Option<&[(usize, usize)]>,
        multi_angle: bool,
    ) -> Result<Self> {
        let edges = graph.edge_indices(edge_list)?;
        let bound = selected_weight(&graph, &edges);
        let layout = if multi_angle {
            AngleLayout::MultiAngle
        } else {
            AngleLayout::Standard {
                num_terms: graph.num_edges(),
                num_qubits: graph.num_nodes(),
            }
        };
        let backend = MaCutAnalyticalBackend { graph, edges };
        Ok(Self::new(Arc::new(backend), layout)?.with_objective_bound(bound))
    }

    /// Light-cone evaluator for `shift + Σ c_k ⟨T_k⟩`
    ///
    /// `target_coefficients` holds one weight per target term followed by
    /// the shift.
    pub fn general_subsets(
        num_qubits: usize,
        target_terms: &[DiagonalTerm],
        target_coefficients: &[f64],
        driver_terms: &[DiagonalTerm],
        depth: usize,
        multi_angle: bool,
    ) -> Result<Self> {
        let backend = LightConeBackend::new(
            num_qubits,
            target_terms,
            target_coefficients,
            driver_terms,
            depth,
        )?;
        let layout = if multi_angle {
            AngleLayout::MultiAngle
        } else {
            AngleLayout::Standard {
                num_terms: driver_terms.len(),
                num_qubits,
            }
        };
        Self::new(Arc::new(backend), layout)
    }

    /// Light-cone MaxCut: one subset per selected edge
    pub fn standard_maxcut_subgraphs(
        graph: &Graph,
        depth: usize,
        edge_list: Option<&[(usize, usize)]>,
        multi_angle: bool,
    ) -> Result<Self> {
        let edges = graph.edge_indices(edge_list)?;
        let drivers = edge_cut_terms(graph);
        let targets: Vec<DiagonalTerm> = edges.iter().map(|&i| drivers[i].clone()).collect();
        let mut coefficients = vec![1.0; targets.len()];
        coefficients.push(0.0);
        let evaluator = Self::general_subsets(
            graph.num_nodes(),
            &targets,
            &coefficients,
            &drivers,
            depth,
            multi_angle,
        )?;
        Ok(evaluator.with_objective_bound(selected_weight(graph, &edges)))
    }

    /// Closed-form generalized first-order ansatz
    ///
    /// With `multi_angle == false` a single γ and β are shared by all nodes.
    pub fn general_z1_analytical(graph: Arc<Graph>, multi_angle: bool) -> Result<Self> {
        let bound = graph.total_weight();
        let layout = if multi_angle {
            AngleLayout::MultiAngle
        } else {
            AngleLayout::Standard {
                num_terms: graph.num_nodes(),
                num_qubits: graph.num_nodes(),
            }
        };
        Ok(Self::new(Arc::new(GeneralZ1Backend { graph }), layout)?.with_objective_bound(bound))
    }

    /// Closed-form generalized first-order ansatz with every β at π/4
    pub fn general_z1_analytical_reduced(graph: Arc<Graph>) -> Result<Self> {
        let bound = graph.total_weight();
        Ok(
            Self::new(Arc::new(GeneralZ1ReducedBackend { graph }), AngleLayout::MultiAngle)?
                .with_objective_bound(bound),
        )
    }

    /// MaxCut evaluator selected by configuration
    ///
    /// Rejects the analytical backend for any depth other than 1.
    pub fn from_config(graph: Arc<Graph>, config: &EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        let edge_list = config.edge_subset.as_deref();
        match config.backend {
            Backend::Simulation => {
                Self::standard_maxcut(&graph, config.depth, edge_list, config.multi_angle)
            }
            Backend::Analytical => {
                if config.depth != 1 {
                    return Err(QaoaError::AnalyticalDepth(config.depth).into());
                }
                Self::standard_maxcut_analytical(graph, edge_list, config.multi_angle)
            }
            Backend::LightCone => {
                Self::standard_maxcut_subgraphs(&graph, config.depth, edge_list, config.multi_angle)
            }
        }
    }
}

fn selected_weight(graph: &Graph, edges: &[usize]) -> f64 {
    edges.iter().map(|&i| graph.edges()[i].weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;
    use approx::assert_abs_diff_eq;

    fn sample_angles(len: usize) -> Vec<f64> {
        (0..len).map(|i| ((i * 7 + 3) % 11) as f64 * 0.29 - 1.3).collect()
    }

    #[test]
    fn test_evaluate_is_negated_expectation() {
        let graph = Graph::complete(3);
        let evaluator = Evaluator::standard_maxcut(&graph, 1, None, true).unwrap();
        assert_eq!(evaluator.num_angles(), 6);
        let angles = sample_angles(6);
        let e = evaluator.expectation(&angles).unwrap();
        assert_eq!(evaluator.evaluate(&angles).unwrap(), -e);
        assert_eq!(evaluator.objective_bound(), Some(3.0));
    }

    #[test]
    fn test_arity_checked() {
        let graph = Graph::path(3);
        let evaluator = Evaluator::standard_maxcut(&graph, 2, None, false).unwrap();
        assert_eq!(evaluator.num_angles(), 4);
        assert!(matches!(
            evaluator.evaluate(&[0.0; 5]),
            Err(SimulatorError::Problem(QaoaError::AngleCountMismatch { expected: 4, actual: 5 }))
        ));
    }

    #[test]
    fn test_analytical_matches_simulation() {
        let graph = Arc::new(
            Graph::from_edges(4, &[(0, 1, 1.0), (1, 2, 0.5), (0, 2, 2.0), (2, 3, 1.5)]).unwrap(),
        );
        let simulated = Evaluator::standard_maxcut(&graph, 1, None, true).unwrap();
        let closed = Evaluator::standard_maxcut_analytical(graph, None, true).unwrap();
        let angles = sample_angles(8);
        assert_abs_diff_eq!(
            simulated.expectation(&angles).unwrap(),
            closed.expectation(&angles).unwrap(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_light_cone_matches_simulation() {
        let graph = Graph::cycle(6);
        let full = Evaluator::standard_maxcut(&graph, 2, Some(&[(1, 0), (3, 4)]), true).unwrap();
        let cones = Evaluator::standard_maxcut_subgraphs(&graph, 2, Some(&[(1, 0), (3, 4)]), true)
            .unwrap();
        assert_eq!(full.num_angles(), cones.num_angles());
        let angles = sample_angles(full.num_angles());
        assert_abs_diff_eq!(
            full.expectation(&angles).unwrap(),
            cones.expectation(&angles).unwrap(),
            epsilon = 1e-10
        );
        assert_eq!(cones.objective_bound(), Some(2.0));
    }

    #[test]
    fn test_subsets_apply_coefficients_and_shift() {
        let drivers = vec![DiagonalTerm::cut(0, 1)];
        let targets = vec![DiagonalTerm::z_product(vec![0])];
        let evaluator =
            Evaluator::general_subsets(2, &targets, &[2.0, 0.5], &drivers, 1, true).unwrap();
        // zero angles leave |+⟩, where ⟨Z_0⟩ = 0
        assert_abs_diff_eq!(evaluator.expectation(&[0.0; 3]).unwrap(), 0.5, epsilon = 1e-12);
        assert!(matches!(
            Evaluator::general_subsets(2, &targets, &[2.0], &drivers, 1, true),
            Err(SimulatorError::Problem(QaoaError::CoefficientCountMismatch { .. }))
        ));
    }

    #[test]
    fn test_scheme_rejects_partial_cover() {
        let graph = Graph::path(2);
        let basis = Arc::new(BasisTables::new(2).unwrap());
        let table = Arc::new(TermTable::edge_cuts(&graph).unwrap());
        let target = Arc::new(table.sum_all());
        assert!(Evaluator::general_scheme(
            basis.clone(),
            table.clone(),
            target.clone(),
            1,
            vec![vec![0], vec![1]]
        )
        .is_err());
        let evaluator =
            Evaluator::general_scheme(basis, table, target, 1, vec![vec![0], vec![1, 2]]).unwrap();
        assert_eq!(evaluator.num_angles(), 2);
    }

    #[test]
    fn test_from_config() {
        let graph = Arc::new(Graph::cycle(4));
        let config = EvaluatorConfig::analytical().with_depth(2);
        assert!(matches!(
            Evaluator::from_config(graph.clone(), &config),
            Err(SimulatorError::Problem(QaoaError::AnalyticalDepth(2)))
        ));

        let config = EvaluatorConfig::analytical().with_multi_angle(false);
        let evaluator = Evaluator::from_config(graph.clone(), &config).unwrap();
        assert_eq!(evaluator.num_angles(), 2);

        let config = EvaluatorConfig::new()
            .with_backend(Backend::LightCone)
            .with_depth(2)
            .with_edge_subset(vec![(0, 1)]);
        let evaluator = Evaluator::from_config(graph.clone(), &config).unwrap();
        assert_eq!(evaluator.num_angles(), 16);

        let config = EvaluatorConfig::new().with_edge_subset(vec![(0, 2)]);
        assert!(matches!(
            Evaluator::from_config(graph, &config),
            Err(SimulatorError::Problem(QaoaError::UnknownEdge(0, 2)))
        ));
    }

    #[test]
    fn test_z1_evaluators() {
        let graph = Arc::new(Graph::star(4));
        let full = Evaluator::general_z1_analytical(graph.clone(), true).unwrap();
        let reduced = Evaluator::general_z1_analytical_reduced(graph.clone()).unwrap();
        let standard = Evaluator::general_z1_analytical(graph, false).unwrap();
        assert_eq!(full.num_angles(), 8);
        assert_eq!(reduced.num_angles(), 4);
        assert_eq!(standard.num_angles(), 2);

        let gammas = [0.3, -0.7, 1.1, 0.2];
        let mut angles = gammas.to_vec();
        angles.extend([std::f64::consts::FRAC_PI_4; 4]);
        assert_abs_diff_eq!(
            full.expectation(&angles).unwrap(),
            reduced.expectation(&gammas).unwrap(),
            epsilon = 1e-14
        );
    }
}
