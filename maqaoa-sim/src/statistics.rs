//! Optimization statistics tracking

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics of one multi-start optimization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStatistics {
    /// Total wall time
    pub total_time: Duration,

    /// Restarts whose result was considered
    pub restarts_run: usize,

    /// Restarts whose local run met a convergence criterion
    pub converged_restarts: usize,

    /// Restarts whose local run returned an error
    pub failed_restarts: usize,

    /// Index of the restart that produced the best objective
    pub best_restart: usize,

    /// Local optimizer iterations over all considered restarts
    pub local_iterations: usize,

    /// Objective evaluations over all considered restarts
    pub evaluations: usize,

    /// Whether the known maximum was reached before the last restart
    pub early_stopped: bool,
}

impl OptimizationStatistics {
    /// Create a new statistics object
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of considered restarts that converged
    pub fn convergence_rate(&self) -> f64 {
        if self.restarts_run == 0 {
            0.0
        } else {
            self.converged_restarts as f64 / self.restarts_run as f64
        }
    }

    /// Objective evaluations per second
    pub fn evaluations_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.evaluations as f64 / secs
        }
    }
}

impl std::fmt::Display for OptimizationStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Optimization Statistics:")?;
        writeln!(f, "  Total time: {:?}", self.total_time)?;
        writeln!(
            f,
            "  Restarts: {} ({} converged, {} failed)",
            self.restarts_run, self.converged_restarts, self.failed_restarts
        )?;
        writeln!(f, "  Best restart: {}", self.best_restart)?;
        writeln!(f, "  Local iterations: {}", self.local_iterations)?;
        writeln!(
            f,
            "  Evaluations: {} ({:.0}/s)",
            self.evaluations,
            self.evaluations_per_second()
        )?;
        write!(f, "  Early stop: {}", self.early_stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_rate() {
        let mut stats = OptimizationStatistics::new();
        assert_eq!(stats.convergence_rate(), 0.0);
        stats.restarts_run = 4;
        stats.converged_restarts = 3;
        assert_eq!(stats.convergence_rate(), 0.75);
    }

    #[test]
    fn test_evaluation_rate() {
        let stats = OptimizationStatistics {
            total_time: Duration::from_millis(500),
            evaluations: 100,
            ..Default::default()
        };
        assert_eq!(stats.evaluations_per_second(), 200.0);
        assert!(stats.to_string().contains("Evaluations: 100"));
    }
}
