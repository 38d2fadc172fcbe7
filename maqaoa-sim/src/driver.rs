//! Multi-start angle optimization
//!
//! Each restart draws angles uniformly from `[-π, π]` and runs the configured
//! local optimizer on [`Evaluator::evaluate`]. The best restart wins. When the
//! attainable maximum is known, the search stops as soon as the best
//! objective is within `early_stop_tolerance` of it.
//!
//! Parallel mode runs restarts in batches on the rayon pool. Start points are
//! still drawn one after another from the same generator and results are
//! reduced in draw order, so a seeded run returns the same outcome in both
//! modes.

use crate::config::OptimizerConfig;
use crate::error::{Result, SimulatorError};
use crate::evaluator::Evaluator;
use crate::optimizers::LocalResult;
use crate::statistics::OptimizationStatistics;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Best angles found by [`optimize_qaoa_angles`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Best expectation found (maximized)
    pub objective: f64,
    /// Angles reaching `objective`, in the evaluator's layout
    pub angles: Vec<f64>,
    /// Run statistics
    pub statistics: OptimizationStatistics,
}

/// Tracks the best restart and decides when to stop
struct RestartReducer {
    best_value: f64,
    best_angles: Vec<f64>,
    objective_max: Option<f64>,
    tolerance: f64,
    last_error: Option<SimulatorError>,
    statistics: OptimizationStatistics,
}

impl RestartReducer {
    fn new(objective_max: Option<f64>, tolerance: f64) -> Self {
        Self {
            best_value: f64::INFINITY,
            best_angles: Vec::new(),
            objective_max,
            tolerance,
            last_error: None,
            statistics: OptimizationStatistics::new(),
        }
    }

    /// Fold one restart in; returns `true` once the known maximum is reached
    fn record(&mut self, restart: usize, result: Result<LocalResult>) -> bool {
        self.statistics.restarts_run += 1;
        match result {
            Ok(local) => {
                trace!(
                    restart,
                    objective = -local.value,
                    status = ?local.status,
                    iterations = local.num_iterations,
                    "restart finished"
                );
                self.statistics.local_iterations += local.num_iterations;
                self.statistics.evaluations += local.num_evaluations;
                if local.status.is_converged() {
                    self.statistics.converged_restarts += 1;
                }
                if local.value.is_finite() && local.value < self.best_value {
                    self.best_value = local.value;
                    self.best_angles = local.parameters;
                    self.statistics.best_restart = restart;
                }
            }
            Err(err) => {
                warn!(restart, error = %err, "local optimization failed");
                self.statistics.failed_restarts += 1;
                self.last_error = Some(err);
            }
        }
        self.reached_maximum()
    }

    fn reached_maximum(&self) -> bool {
        match self.objective_max {
            Some(max) if self.best_value.is_finite() => max - (-self.best_value) < self.tolerance,
            _ => false,
        }
    }

    fn finish(mut self, started: Instant) -> Result<OptimizationOutcome> {
        if !self.best_value.is_finite() {
            let reason = match self.last_error {
                Some(err) => format!("no restart produced a finite objective, last error: {err}"),
                None => "no restart produced a finite objective".to_string(),
            };
            return Err(SimulatorError::OptimizationFailed(reason));
        }
        self.statistics.total_time = started.elapsed();
        Ok(OptimizationOutcome {
            objective: -self.best_value,
            angles: self.best_angles,
            statistics: self.statistics,
        })
    }
}

/// Maximize the evaluator's expectation with random restarts
///
/// The maximum used for early stopping is `config.objective_max` when set,
/// otherwise the evaluator's own bound (the selected edge weight for MaxCut
/// evaluators).
///
/// # Example
///
/// ```
/// use maqaoa_core::Graph;
/// use maqaoa_sim::{optimize_qaoa_angles, Evaluator, OptimizerConfig};
///
/// let graph = Graph::path(2);
/// let evaluator = Evaluator::standard_maxcut(&graph, 1, None, true).unwrap();
/// let outcome = optimize_qaoa_angles(&evaluator, &OptimizerConfig::deterministic(7)).unwrap();
/// assert!(outcome.objective > 0.999);
/// assert_eq!(outcome.angles.len(), 3);
/// ```
pub fn optimize_qaoa_angles(evaluator: &Evaluator, config: &OptimizerConfig) -> Result<OptimizationOutcome> {
    config.validate()?;
    let started = Instant::now();
    let num_angles = evaluator.num_angles();
    let objective_max = config.objective_max.or(evaluator.objective_bound());

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut draw = || -> Vec<f64> { (0..num_angles).map(|_| rng.gen_range(-PI..=PI)).collect() };
    let run = |start: &[f64]| config.local.minimize(|angles| evaluator.evaluate(angles), start);

    debug!(
        num_angles,
        num_restarts = config.num_restarts,
        parallel = config.parallel,
        ?objective_max,
        "starting angle optimization"
    );

    let mut reducer = RestartReducer::new(objective_max, config.early_stop_tolerance);
    let mut stopped_at = None;

    if config.parallel {
        let batch_size = rayon::current_num_threads().max(1);
        let mut restart = 0;
        'batches: while restart < config.num_restarts {
            let count = batch_size.min(config.num_restarts - restart);
            let starts: Vec<Vec<f64>> = (0..count).map(|_| draw()).collect();
            let results: Vec<Result<LocalResult>> = starts.par_iter().map(|s| run(s.as_slice())).collect();
            for result in results {
                let reached = reducer.record(restart, result);
                restart += 1;
                if reached {
                    stopped_at = Some(restart);
                    break 'batches;
                }
            }
        }
    } else {
        for restart in 0..config.num_restarts {
            let start = draw();
            if reducer.record(restart, run(start.as_slice())) {
                stopped_at = Some(restart + 1);
                break;
            }
        }
    }

    reducer.statistics.early_stopped = stopped_at.is_some_and(|done| done < config.num_restarts);
    let outcome = reducer.finish(started)?;
    debug!(
        objective = outcome.objective,
        restarts = outcome.statistics.restarts_run,
        elapsed = ?outcome.statistics.total_time,
        "angle optimization finished"
    );
    Ok(outcome)
}
