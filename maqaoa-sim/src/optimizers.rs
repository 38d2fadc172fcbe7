//! Local optimizers used by the multi-start driver
//!
//! Both optimizers minimize a closure `Fn(&[f64]) -> Result<f64>`. The
//! closure is usually [`Evaluator::evaluate`](crate::Evaluator::evaluate),
//! which already negates the expectation.
//!
//! # Available Optimizers
//!
//! - **L-BFGS**: quasi-Newton method with central finite-difference gradients,
//!   two-loop recursion over a bounded correction history and Armijo
//!   backtracking. The default; QAOA expectations are smooth in the angles.
//! - **Nelder-Mead**: gradient-free simplex method. Useful when the objective
//!   is expensive to differentiate (many angles, large registers).
//!
//! # Example
//!
//! ```
//! use maqaoa_sim::optimizers::{LBFGSConfig, LBFGSOptimizer};
//!
//! let optimizer = LBFGSOptimizer::new(LBFGSConfig::default());
//! let result = optimizer
//!     .minimize(|x: &[f64]| Ok((x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2)), &[0.0, 0.0])
//!     .unwrap();
//! assert!((result.parameters[0] - 1.0).abs() < 1e-4);
//! ```

use crate::error::Result;
use std::cell::Cell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Convergence status of a local optimization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Not yet converged
    NotConverged,
    /// Objective change below tolerance
    ObjectiveConverged,
    /// Gradient norm (or simplex size) below tolerance
    GradientConverged,
    /// Both objective and gradient converged
    FullyConverged,
    /// Maximum iterations reached
    MaxIterations,
    /// No step satisfied the sufficient decrease condition
    LineSearchFailed,
}

impl ConvergenceStatus {
    /// Whether the run met one of its convergence criteria
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Self::ObjectiveConverged | Self::GradientConverged | Self::FullyConverged
        )
    }
}

/// Result of one local optimization run
#[derive(Debug, Clone)]
pub struct LocalResult {
    /// Best parameters found
    pub parameters: Vec<f64>,
    /// Objective value at `parameters`
    pub value: f64,
    /// Why the run stopped
    pub status: ConvergenceStatus,
    /// Number of iterations performed
    pub num_iterations: usize,
    /// Number of objective evaluations, gradient probes included
    pub num_evaluations: usize,
    /// Wall time of the run
    pub total_time: Duration,
}

/// Local optimizer selection for the driver
#[derive(Debug, Clone)]
pub enum LocalOptimizer {
    LBfgs(LBFGSConfig),
    NelderMead(NelderMeadConfig),
}

impl Default for LocalOptimizer {
    fn default() -> Self {
        Self::LBfgs(LBFGSConfig::default())
    }
}

impl LocalOptimizer {
    /// Minimize `objective` starting from `initial`
    pub fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<LocalResult>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        match self {
            Self::LBfgs(config) => LBFGSOptimizer::new(config.clone()).minimize(objective, initial),
            Self::NelderMead(config) => {
                NelderMeadOptimizer::new(config.clone()).minimize(objective, initial)
            }
        }
    }
}

/// Objective wrapper that counts evaluations
struct Counted<'a, F> {
    objective: &'a F,
    evaluations: Cell<usize>,
}

impl<'a, F> Counted<'a, F>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    fn new(objective: &'a F) -> Self {
        Self {
            objective,
            evaluations: Cell::new(0),
        }
    }

    fn eval(&self, params: &[f64]) -> Result<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        (self.objective)(params)
    }

    fn count(&self) -> usize {
        self.evaluations.get()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// L-BFGS Optimizer
// ============================================================================

/// Configuration for L-BFGS optimizer
#[derive(Debug, Clone)]
pub struct LBFGSConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Convergence tolerance for the objective change between iterations
    pub tolerance: f64,

    /// Convergence tolerance for the gradient norm
    pub gradient_tolerance: f64,

    /// Number of corrections to approximate the inverse Hessian (typically 5-20)
    pub memory_size: usize,

    /// Step size for numerical gradient computation
    pub gradient_epsilon: f64,

    /// Armijo sufficient decrease constant
    pub line_search_tolerance: f64,

    /// Maximum number of line search iterations
    pub max_line_search_iterations: usize,
}

impl Default for LBFGSConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-9,
            gradient_tolerance: 1e-6,
            memory_size: 10,
            gradient_epsilon: 1e-6,
            line_search_tolerance: 1e-4,
            max_line_search_iterations: 30,
        }
    }
}

/// Bounded `(s, y, rho)` correction history
struct CorrectionHistory {
    capacity: usize,
    entries: VecDeque<(Vec<f64>, Vec<f64>, f64)>,
}

impl CorrectionHistory {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Store a correction pair
    ///
    /// A pair without positive curvature discards the whole history, so the
    /// next direction restarts from steepest descent instead of reusing
    /// stale pairs.
    fn push(&mut self, s: Vec<f64>, y: Vec<f64>) {
        if self.capacity == 0 {
            return;
        }
        let sy = dot(&s, &y);
        if sy <= 1e-12 {
            self.entries.clear();
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((s, y, 1.0 / sy));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    /// Two-loop recursion: `-H·g`
    fn direction(&self, gradient: &[f64]) -> Vec<f64> {
        let mut q = gradient.to_vec();
        let mut alpha = vec![0.0; self.entries.len()];

        for (i, (s, y, rho)) in self.entries.iter().enumerate().rev() {
            alpha[i] = rho * dot(s, &q);
            for (qj, yj) in q.iter_mut().zip(y) {
                *qj -= alpha[i] * yj;
            }
        }

        // Initial inverse Hessian scale from the newest pair
        let scale = self.entries.back().map_or(1.0, |(s, y, _)| dot(s, y) / dot(y, y));
        let mut r: Vec<f64> = q.iter().map(|qi| scale * qi).collect();

        for (i, (s, y, rho)) in self.entries.iter().enumerate() {
            let beta = rho * dot(y, &r);
            for (rj, sj) in r.iter_mut().zip(s) {
                *rj += sj * (alpha[i] - beta);
            }
        }

        r.iter().map(|ri| -ri).collect()
    }
}

/// L-BFGS optimizer over a closure objective
///
/// # Algorithm
///
/// 1. Compute numerical gradient via central finite differences
/// 2. Use L-BFGS two-loop recursion to approximate `-H⁻¹g`
/// 3. Fall back to steepest descent if that is not a descent direction
/// 4. Backtrack until the Armijo condition holds
/// 5. Update parameters and the correction history
#[derive(Debug, Clone, Default)]
pub struct LBFGSOptimizer {
    config: LBFGSConfig,
}

impl LBFGSOptimizer {
    /// Create a new L-BFGS optimizer
    pub fn new(config: LBFGSConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &LBFGSConfig {
        &self.config
    }

    /// Run L-BFGS minimization
    pub fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<LocalResult>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        let start_time = Instant::now();
        let counted = Counted::new(&objective);

        let mut params = initial.to_vec();
        let mut value = counted.eval(&params)?;
        let mut gradient = self.numerical_gradient(&counted, &params)?;
        let mut history = CorrectionHistory::new(self.config.memory_size);
        let mut prev_value = f64::INFINITY;

        let finish = |params: Vec<f64>, value: f64, status, iterations, evaluations| LocalResult {
            parameters: params,
            value,
            status,
            num_iterations: iterations,
            num_evaluations: evaluations,
            total_time: start_time.elapsed(),
        };

        for iteration in 0..self.config.max_iterations {
            let gradient_norm = dot(&gradient, &gradient).sqrt();
            let status = self.check_convergence((prev_value - value).abs(), gradient_norm);
            if status != ConvergenceStatus::NotConverged {
                return Ok(finish(params, value, status, iteration, counted.count()));
            }

            let mut direction = history.direction(&gradient);
            let mut slope = dot(&gradient, &direction);
            if slope >= 0.0 || slope.is_nan() {
                history.clear();
                direction = gradient.iter().map(|g| -g).collect();
                slope = -gradient_norm * gradient_norm;
            }

            let Some((step, new_value)) =
                self.line_search(&counted, &params, &direction, value, slope)?
            else {
                return Ok(finish(
                    params,
                    value,
                    ConvergenceStatus::LineSearchFailed,
                    iteration,
                    counted.count(),
                ));
            };

            let s: Vec<f64> = direction.iter().map(|d| step * d).collect();
            let new_params: Vec<f64> = params.iter().zip(&s).map(|(p, si)| p + si).collect();
            let new_gradient = self.numerical_gradient(&counted, &new_params)?;
            let y: Vec<f64> = new_gradient.iter().zip(&gradient).map(|(n, o)| n - o).collect();
            history.push(s, y);

            prev_value = value;
            value = new_value;
            params = new_params;
            gradient = new_gradient;
        }

        Ok(finish(
            params,
            value,
            ConvergenceStatus::MaxIterations,
            self.config.max_iterations,
            counted.count(),
        ))
    }

    /// Compute numerical gradient via central finite differences
    fn numerical_gradient<F>(&self, objective: &Counted<'_, F>, params: &[f64]) -> Result<Vec<f64>>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        let eps = self.config.gradient_epsilon;
        let mut probe = params.to_vec();
        let mut gradient = vec![0.0; params.len()];

        for i in 0..params.len() {
            probe[i] = params[i] + eps;
            let plus = objective.eval(&probe)?;
            probe[i] = params[i] - eps;
            let minus = objective.eval(&probe)?;
            probe[i] = params[i];
            gradient[i] = (plus - minus) / (2.0 * eps);
        }

        Ok(gradient)
    }

    /// Backtracking line search on the Armijo condition
    ///
    /// Returns the accepted step and the objective value there.
    fn line_search<F>(
        &self,
        objective: &Counted<'_, F>,
        params: &[f64],
        direction: &[f64],
        current_value: f64,
        slope: f64,
    ) -> Result<Option<(f64, f64)>>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        let c1 = self.config.line_search_tolerance;
        let tau = 0.5;
        let mut alpha = 1.0;

        for _ in 0..self.config.max_line_search_iterations {
            let trial: Vec<f64> = params
                .iter()
                .zip(direction)
                .map(|(&p, &d)| p + alpha * d)
                .collect();
            let trial_value = objective.eval(&trial)?;

            if trial_value <= current_value + c1 * alpha * slope {
                return Ok(Some((alpha, trial_value)));
            }
            alpha *= tau;
        }

        Ok(None)
    }

    fn check_convergence(&self, value_change: f64, gradient_norm: f64) -> ConvergenceStatus {
        let value_done = value_change < self.config.tolerance;
        let gradient_done = gradient_norm < self.config.gradient_tolerance;
        match (value_done, gradient_done) {
            (true, true) => ConvergenceStatus::FullyConverged,
            (true, false) => ConvergenceStatus::ObjectiveConverged,
            (false, true) => ConvergenceStatus::GradientConverged,
            (false, false) => ConvergenceStatus::NotConverged,
        }
    }
}

// ============================================================================
// Nelder-Mead Optimizer
// ============================================================================

/// Configuration for Nelder-Mead optimizer
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Convergence tolerance for simplex size and value spread
    pub tolerance: f64,

    /// Offset of the initial vertices from the start point, in radians
    pub initial_step: f64,

    /// Reflection coefficient (default: 1.0)
    pub alpha: f64,

    /// Expansion coefficient (default: 2.0)
    pub gamma: f64,

    /// Contraction coefficient (default: 0.5)
    pub rho: f64,

    /// Shrink coefficient (default: 0.5)
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            initial_step: 0.25,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

/// Nelder-Mead simplex optimizer
///
/// Maintains a simplex of n+1 points and replaces the worst vertex by
/// reflection, expansion or contraction, shrinking toward the best vertex
/// when none of them improves.
#[derive(Debug, Clone, Default)]
pub struct NelderMeadOptimizer {
    config: NelderMeadConfig,
}

impl NelderMeadOptimizer {
    /// Create a new Nelder-Mead optimizer
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Run Nelder-Mead minimization
    pub fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<LocalResult>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        let start_time = Instant::now();
        let counted = Counted::new(&objective);
        let n = initial.len();

        let mut simplex = self.initialize_simplex(initial);
        let mut values = simplex
            .iter()
            .map(|vertex| counted.eval(vertex))
            .collect::<Result<Vec<f64>>>()?;

        let mut status = ConvergenceStatus::MaxIterations;
        let mut iterations = self.config.max_iterations;

        for iteration in 0..self.config.max_iterations {
            let mut order: Vec<usize> = (0..simplex.len()).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

            let best = order[0];
            let worst = order[n];
            let second_worst = order[n.saturating_sub(1)];

            let size = simplex_size(&simplex, best);
            let spread = (values[worst] - values[best]).abs();
            if n == 0 || (size < self.config.tolerance && spread < self.config.tolerance) {
                status = ConvergenceStatus::FullyConverged;
                iterations = iteration;
                break;
            }

            let centroid = centroid(&simplex, &order[..n]);

            let reflected = self.towards(&centroid, &simplex[worst], -self.config.alpha);
            let reflected_value = counted.eval(&reflected)?;

            if reflected_value < values[best] {
                let expanded = self.towards(&centroid, &reflected, self.config.gamma);
                let expanded_value = counted.eval(&expanded)?;
                if expanded_value < reflected_value {
                    simplex[worst] = expanded;
                    values[worst] = expanded_value;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = reflected_value;
                }
            } else if reflected_value < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            } else {
                let contracted = if reflected_value < values[worst] {
                    self.towards(&centroid, &reflected, self.config.rho)
                } else {
                    self.towards(&centroid, &simplex[worst], self.config.rho)
                };
                let contracted_value = counted.eval(&contracted)?;

                if contracted_value < values[worst].min(reflected_value) {
                    simplex[worst] = contracted;
                    values[worst] = contracted_value;
                } else {
                    let anchor = simplex[best].clone();
                    for (index, vertex) in simplex.iter_mut().enumerate() {
                        if index == best {
                            continue;
                        }
                        for (x, b) in vertex.iter_mut().zip(&anchor) {
                            *x = b + self.config.sigma * (*x - b);
                        }
                        values[index] = counted.eval(vertex)?;
                    }
                }
            }
        }

        let best = (0..values.len())
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);

        Ok(LocalResult {
            parameters: simplex.swap_remove(best),
            value: values[best],
            status,
            num_iterations: iterations,
            num_evaluations: counted.count(),
            total_time: start_time.elapsed(),
        })
    }

    /// Start point plus one vertex offset along each axis
    fn initialize_simplex(&self, initial: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = vec![initial.to_vec()];
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[i] += self.config.initial_step;
            simplex.push(vertex);
        }
        simplex
    }

    /// `centroid + coefficient * (point - centroid)`
    ///
    /// Reflection uses a negative coefficient, contraction a coefficient
    /// below one and expansion one above.
    fn towards(&self, centroid: &[f64], point: &[f64], coefficient: f64) -> Vec<f64> {
        centroid
            .iter()
            .zip(point)
            .map(|(&c, &p)| c + coefficient * (p - c))
            .collect()
    }
}

fn centroid(simplex: &[Vec<f64>], indices: &[usize]) -> Vec<f64> {
    let mut centroid = vec![0.0; simplex[0].len()];
    for &index in indices {
        for (c, x) in centroid.iter_mut().zip(&simplex[index]) {
            *c += x;
        }
    }
    let count = indices.len() as f64;
    for c in &mut centroid {
        *c /= count;
    }
    centroid
}

/// Largest coordinate distance of any vertex from the best one
fn simplex_size(simplex: &[Vec<f64>], best: usize) -> f64 {
    simplex
        .iter()
        .flat_map(|vertex| vertex.iter().zip(&simplex[best]).map(|(x, b)| (x - b).abs()))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;
    use approx::assert_abs_diff_eq;
    use maqaoa_core::QaoaError;

    fn quadratic(x: &[f64]) -> Result<f64> {
        Ok((x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2) + 0.5 * x[2].powi(2))
    }

    fn rosenbrock(x: &[f64]) -> Result<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
    }

    #[test]
    fn test_lbfgs_config_default() {
        let config = LBFGSConfig::default();
        assert_eq!(config.memory_size, 10);
        assert_eq!(config.gradient_epsilon, 1e-6);
    }

    #[test]
    fn test_lbfgs_quadratic() {
        let result = LBFGSOptimizer::default().minimize(quadratic, &[3.0, 0.0, -1.0]).unwrap();
        assert!(result.status.is_converged(), "{:?}", result.status);
        assert_abs_diff_eq!(result.parameters[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.parameters[1], -2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.parameters[2], 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.value, 0.0, epsilon = 1e-6);
        assert!(result.num_evaluations > result.num_iterations);
    }

    #[test]
    fn test_lbfgs_rosenbrock() {
        let result = LBFGSOptimizer::default().minimize(rosenbrock, &[-1.2, 1.0]).unwrap();
        assert_ne!(result.status, ConvergenceStatus::MaxIterations);
        assert_abs_diff_eq!(result.value, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_lbfgs_periodic_objective() {
        // -sin(x)·sin(y) has maxima of 1 at (π/2, π/2) modulo sign flips
        let objective = |x: &[f64]| Ok(-(x[0].sin() * x[1].sin()));
        let result = LBFGSOptimizer::default().minimize(objective, &[0.7, 0.4]).unwrap();
        assert_abs_diff_eq!(result.value, -1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_nelder_mead_config_default() {
        let config = NelderMeadConfig::default();
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.gamma, 2.0);
        assert_eq!(config.rho, 0.5);
        assert_eq!(config.sigma, 0.5);
    }

    #[test]
    fn test_nelder_mead_quadratic() {
        let result = NelderMeadOptimizer::default().minimize(quadratic, &[3.0, 0.0, -1.0]).unwrap();
        assert_eq!(result.status, ConvergenceStatus::FullyConverged);
        assert_abs_diff_eq!(result.parameters[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.parameters[1], -2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_objective_errors_propagate() {
        let failing = |_: &[f64]| -> Result<f64> {
            Err(SimulatorError::from(QaoaError::angle_count(3, 2)))
        };
        assert!(LBFGSOptimizer::default().minimize(failing, &[0.0]).is_err());
        assert!(NelderMeadOptimizer::default().minimize(failing, &[0.0]).is_err());
    }

    #[test]
    fn test_local_optimizer_dispatch() {
        let nm = LocalOptimizer::NelderMead(NelderMeadConfig::default());
        let result = nm.minimize(|x: &[f64]| Ok((x[0] - 0.5).powi(2)), &[0.0]).unwrap();
        assert_abs_diff_eq!(result.parameters[0], 0.5, epsilon = 1e-3);

        let result = LocalOptimizer::default()
            .minimize(|x: &[f64]| Ok((x[0] - 0.5).powi(2)), &[0.0])
            .unwrap();
        assert_abs_diff_eq!(result.parameters[0], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_history_skips_negative_curvature() {
        let mut history = CorrectionHistory::new(2);
        history.push(vec![1.0], vec![-1.0]);
        assert!(history.entries.is_empty());
        history.push(vec![1.0], vec![2.0]);
        history.push(vec![0.5], vec![1.0]);
        history.push(vec![0.25], vec![0.5]);
        assert_eq!(history.entries.len(), 2);
        // quadratic with curvature 2: direction is -g/2
        let direction = history.direction(&[4.0]);
        assert_abs_diff_eq!(direction[0], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_history_resets_on_negative_curvature() {
        let mut history = CorrectionHistory::new(3);
        history.push(vec![1.0, 0.0], vec![2.0, 0.0]);
        history.push(vec![0.0, 1.0], vec![0.0, 4.0]);
        assert_eq!(history.entries.len(), 2);

        history.push(vec![1.0, 1.0], vec![-1.0, 0.5]);
        assert!(history.entries.is_empty());
        // empty history falls back to steepest descent
        assert_eq!(history.direction(&[3.0, -1.0]), vec![-3.0, 1.0]);
    }
}
