//! Evaluator and optimizer configuration

use crate::error::{Result, SimulatorError};
use crate::optimizers::{LBFGSConfig, LocalOptimizer, NelderMeadConfig};

/// How an evaluator computes expectations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Full state-vector simulation
    #[default]
    Simulation,
    /// Closed-form p = 1 formula
    Analytical,
    /// Per-term simulation restricted to light cones
    LightCone,
}

/// Configuration for building a MaxCut evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Number of QAOA layers
    ///
    /// Default: 1
    pub depth: usize,

    /// One angle per term and per qubit when true, one γ and one β per layer
    /// otherwise
    ///
    /// Default: true
    pub multi_angle: bool,

    /// Expectation backend
    ///
    /// Default: [`Backend::Simulation`]
    pub backend: Backend,

    /// Edges contributing to the objective, in either orientation
    ///
    /// Default: None (every edge)
    pub edge_subset: Option<Vec<(usize, usize)>>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            multi_angle: true,
            backend: Backend::Simulation,
            edge_subset: None,
        }
    }
}

impl EvaluatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed-form p = 1 evaluation
    pub fn analytical() -> Self {
        Self {
            backend: Backend::Analytical,
            ..Default::default()
        }
    }

    /// Set the number of layers
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Choose between the multi-angle and the standard layout
    pub fn with_multi_angle(mut self, multi_angle: bool) -> Self {
        self.multi_angle = multi_angle;
        self
    }

    /// Set the expectation backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Restrict the objective to a subset of edges
    pub fn with_edge_subset(mut self, edges: Vec<(usize, usize)>) -> Self {
        self.edge_subset = Some(edges);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(SimulatorError::InvalidConfig("depth must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Configuration for the multi-start angle search
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Maximum number of random restarts
    ///
    /// Default: 10
    pub num_restarts: usize,

    /// Stop once the best objective is within this distance of
    /// `objective_max`
    ///
    /// Default: 1e-3
    pub early_stop_tolerance: f64,

    /// Known attainable maximum of the objective
    ///
    /// When None, the evaluator's own bound is used if it has one.
    ///
    /// Default: None
    pub objective_max: Option<f64>,

    /// Random number generator seed for reproducibility
    ///
    /// If None, uses a random seed. Set to Some(seed) for deterministic results.
    ///
    /// Default: None (random)
    pub seed: Option<u64>,

    /// Run restarts on the rayon thread pool
    ///
    /// Results equal the sequential run for the same seed.
    ///
    /// Default: false
    pub parallel: bool,

    /// Local optimizer used by every restart
    ///
    /// Default: L-BFGS
    pub local: LocalOptimizer,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            num_restarts: 10,
            early_stop_tolerance: 1e-3,
            objective_max: None,
            seed: None,
            parallel: false,
            local: LocalOptimizer::default(),
        }
    }
}

impl OptimizerConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for reproducible runs
    ///
    /// - Fixed seed
    /// - Sequential restarts
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Set the number of restarts
    pub fn with_restarts(mut self, num_restarts: usize) -> Self {
        self.num_restarts = num_restarts;
        self
    }

    /// Set the early stop tolerance
    pub fn with_early_stop_tolerance(mut self, tolerance: f64) -> Self {
        self.early_stop_tolerance = tolerance;
        self
    }

    /// Set the known maximum of the objective
    pub fn with_objective_max(mut self, objective_max: f64) -> Self {
        self.objective_max = Some(objective_max);
        self
    }

    /// Set the random seed for deterministic execution
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable parallel restarts
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Use L-BFGS with the given settings
    pub fn with_lbfgs(mut self, config: LBFGSConfig) -> Self {
        self.local = LocalOptimizer::LBfgs(config);
        self
    }

    /// Use Nelder-Mead with the given settings
    pub fn with_nelder_mead(mut self, config: NelderMeadConfig) -> Self {
        self.local = LocalOptimizer::NelderMead(config);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_restarts == 0 {
            return Err(SimulatorError::InvalidConfig("num_restarts must be > 0".to_string()));
        }
        if self.early_stop_tolerance.is_nan() || self.early_stop_tolerance < 0.0 {
            return Err(SimulatorError::InvalidConfig(format!(
                "early_stop_tolerance must be >= 0, got {}",
                self.early_stop_tolerance
            )));
        }
        Ok(())
    }
}
