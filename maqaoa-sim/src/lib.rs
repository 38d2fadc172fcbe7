//! MA-QAOA expectation evaluators and multi-start angle optimization
//!
//! This crate turns a MaxCut (or general diagonal) problem into an
//! [`Evaluator`]: a function from an angle vector to the expected objective.
//! Several backends compute the same quantity:
//!
//! - **Simulation**: full state-vector evolution ([`QaoaSimulator`])
//! - **Analytical**: closed-form p = 1 formulas ([`analytical`])
//! - **Light cone**: per-term simulation on the qubits that can influence
//!   the term ([`light_cone`])
//!
//! [`optimize_qaoa_angles`] maximizes an evaluator with random restarts of a
//! local optimizer.
//!
//! # Example
//!
//! ```
//! use maqaoa_core::Graph;
//! use maqaoa_sim::{optimize_qaoa_angles, Evaluator, EvaluatorConfig, OptimizerConfig};
//! use std::sync::Arc;
//!
//! let graph = Arc::new(Graph::cycle(4));
//! let evaluator = Evaluator::from_config(graph, &EvaluatorConfig::analytical()).unwrap();
//!
//! let config = OptimizerConfig::deterministic(42).with_restarts(5);
//! let outcome = optimize_qaoa_angles(&evaluator, &config).unwrap();
//! assert!(outcome.objective > 2.0);
//! assert_eq!(outcome.angles.len(), evaluator.num_angles());
//! ```

pub mod analytical;
pub mod angles;
pub mod config;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod light_cone;
pub mod optimizers;
pub mod simulation;
pub mod statistics;

pub use angles::{compress_to_standard, expand_standard_angles, AngleLayout, DuplicationScheme};
pub use config::{Backend, EvaluatorConfig, OptimizerConfig};
pub use driver::{optimize_qaoa_angles, OptimizationOutcome};
pub use error::{Result, SimulatorError};
pub use evaluator::{Evaluator, ExpectationBackend};
pub use light_cone::LightConeSubset;
pub use optimizers::{ConvergenceStatus, LBFGSConfig, LocalOptimizer, NelderMeadConfig};
pub use simulation::{run_ma_qaoa_simulation, run_qaoa_simulation, QaoaSimulator};
pub use statistics::OptimizationStatistics;
