//! Closed-form p = 1 expectations
//!
//! These evaluators never touch a state vector; their cost is linear in the
//! number of edges times the node degree.
//!
//! # MA-QAOA MaxCut
//!
//! For an edge `(u, v)` with weight `w` and weight-scaled angles
//! `γ_e = w_e · γ_e`, let `d = N(u) \ {v}`, `e = N(v) \ {u}` and `f = d ∩ e`
//! (the triangles through the edge). Then
//!
//! ```text
//! ⟨C_uv⟩ = w/2
//!        + w/4 · sin2β_u · sin2β_v · Πd · Πe · (Π_f cos(γ_um + γ_vm) - Π_f cos(γ_um - γ_vm))
//!        + w/2 · sin γ_uv · (sin2β_u · cos2β_v · Π'd + cos2β_u · sin2β_v · Π'e)
//! ```
//!
//! where `Πd = Π_{m ∈ d\f} cos γ_um`, `Πe = Π_{m ∈ e\f} cos γ_vm`, and the
//! primed products also run over `f`. The triangle term only appears when
//! `f` is non-empty.
//!
//! # Generalized first-order ansatz
//!
//! Driver terms are the single-qubit `Z_i`, each node has its own γ and β:
//!
//! ```text
//! ⟨C⟩ = Σ_(u,v) w/2 · (1 - sin2β_u · sin2β_v · sin2γ_u · sin2γ_v)
//! ```

use crate::error::Result;
use maqaoa_core::{Graph, QaoaError};
use std::f64::consts::FRAC_PI_4;

/// Expected cut of a p = 1 MA-QAOA state, restricted to `edge_list`
///
/// `angles` holds one γ per edge (edge order) followed by one β per node.
/// `None` sums over every edge.
pub fn ma_qaoa_expectation_p1(
    angles: &[f64],
    graph: &Graph,
    edge_list: Option<&[(usize, usize)]>,
) -> Result<f64> {
    let indices = graph.edge_indices(edge_list)?;
    ma_qaoa_expectation_p1_indices(angles, graph, &indices)
}

/// Same as [`ma_qaoa_expectation_p1`] over already resolved edge indices
pub fn ma_qaoa_expectation_p1_indices(angles: &[f64], graph: &Graph, edges: &[usize]) -> Result<f64> {
    let num_edges = graph.num_edges();
    let expected = num_edges + graph.num_nodes();
    if angles.len() != expected {
        return Err(QaoaError::angle_count(expected, angles.len()).into());
    }

    let (gammas, betas) = angles.split_at(num_edges);
    let gamma: Vec<f64> = gammas
        .iter()
        .zip(graph.edges())
        .map(|(g, edge)| g * edge.weight)
        .collect();

    let mut total = 0.0;
    for &index in edges {
        let edge = graph.edges()[index];
        let (u, v, w) = (edge.u, edge.v, edge.weight);
        let (sin_u, cos_u) = (2.0 * betas[u]).sin_cos();
        let (sin_v, cos_v) = (2.0 * betas[v]).sin_cos();

        let from_v = graph.incident_edges(v);
        let mut cos_d = 1.0;
        let mut cos_f_u = 1.0;
        let mut triangle_plus = 1.0;
        let mut triangle_minus = 1.0;
        let mut has_triangle = false;
        for (&m, &um) in graph.incident_edges(u) {
            if m == v {
                continue;
            }
            match from_v.get(&m) {
                Some(&vm) => {
                    has_triangle = true;
                    cos_f_u *= gamma[um].cos();
                    triangle_plus *= (gamma[um] + gamma[vm]).cos();
                    triangle_minus *= (gamma[um] - gamma[vm]).cos();
                }
                None => cos_d *= gamma[um].cos(),
            }
        }

        let from_u = graph.incident_edges(u);
        let mut cos_e = 1.0;
        let mut cos_f_v = 1.0;
        for (&m, &vm) in from_v {
            if m == u {
                continue;
            }
            if from_u.contains_key(&m) {
                cos_f_v *= gamma[vm].cos();
            } else {
                cos_e *= gamma[vm].cos();
            }
        }

        let mut value = w / 2.0;
        if has_triangle {
            value += w / 4.0 * sin_u * sin_v * cos_d * cos_e * (triangle_plus - triangle_minus);
        }
        cos_d *= cos_f_u;
        cos_e *= cos_f_v;
        value += w / 2.0 * gamma[index].sin() * (sin_u * cos_v * cos_d + cos_u * sin_v * cos_e);

        total += value;
    }
    Ok(total)
}

/// Expected cut of the generalized first-order ansatz
///
/// `angles` holds n γ values followed by n β values, one pair per node.
/// Each edge contributes `w/2 · (1 − f_u f_v)` with
/// `f = sin 2γ · sin 2β`, which reduces to `m/2 − Σ f_u f_v / 2` on unit
/// weights.
pub fn general_z1_expectation(angles: &[f64], graph: &Graph) -> Result<f64> {
    let n = graph.num_nodes();
    if angles.len() != 2 * n {
        return Err(QaoaError::angle_count(2 * n, angles.len()).into());
    }
    let (gammas, betas) = angles.split_at(n);
    let node_factor: Vec<f64> = gammas
        .iter()
        .zip(betas)
        .map(|(g, b)| (2.0 * g).sin() * (2.0 * b).sin())
        .collect();

    Ok(graph
        .edges()
        .iter()
        .map(|e| e.weight / 2.0 * (1.0 - node_factor[e.u] * node_factor[e.v]))
        .sum())
}

/// [`general_z1_expectation`] with every β fixed at π/4
///
/// Only the n γ values are free.
pub fn general_z1_reduced_expectation(gammas: &[f64], graph: &Graph) -> Result<f64> {
    let n = graph.num_nodes();
    if gammas.len() != n {
        return Err(QaoaError::angle_count(n, gammas.len()).into());
    }
    let mut angles = Vec::with_capacity(2 * n);
    angles.extend_from_slice(gammas);
    angles.resize(2 * n, FRAC_PI_4);
    general_z1_expectation(&angles, graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_8, PI};

    #[test]
    fn test_general_z1_scales_edges_by_weight() {
        let graph = Graph::from_edges(3, &[(0, 1, 2.0), (1, 2, 0.5)]).unwrap();
        // f = [1, 1/2, -1]
        let angles = [FRAC_PI_4, PI / 12.0, -FRAC_PI_4, FRAC_PI_4, FRAC_PI_4, FRAC_PI_4];
        let value = general_z1_expectation(&angles, &graph).unwrap();
        assert_abs_diff_eq!(value, 2.0 / 2.0 * 0.5 + 0.5 / 2.0 * 1.5, epsilon = 1e-12);

        let unit = Graph::unweighted(3, &[(0, 1), (1, 2)]).unwrap();
        let value = general_z1_expectation(&angles, &unit).unwrap();
        assert_abs_diff_eq!(value, 1.0 - (0.5 - 0.5) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_edge_closed_form() {
        let graph = Graph::path(2);
        let angles = [FRAC_PI_2, FRAC_PI_8, FRAC_PI_8];
        let value = ma_qaoa_expectation_p1(&angles, &graph, None).unwrap();
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-12);

        // 1/2 + 1/2 · sin γ · sin(2(β_u + β_v))
        let angles = [0.3, 0.2, -0.5];
        let expected = 0.5 + 0.5 * 0.3f64.sin() * (2.0 * (0.2 - 0.5f64)).sin();
        let value = ma_qaoa_expectation_p1(&angles, &graph, None).unwrap();
        assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_angles_give_half_weight() {
        let graph = Graph::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0), (0, 2, 0.5)]).unwrap();
        let value = ma_qaoa_expectation_p1(&[0.0; 6], &graph, None).unwrap();
        assert_abs_diff_eq!(value, 1.75, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_list_selects_terms() {
        let graph = Graph::complete(4);
        let angles: Vec<f64> = (0..10).map(|i| 0.1 * i as f64 + 0.05).collect();
        let all = ma_qaoa_expectation_p1(&angles, &graph, None).unwrap();
        let parts: f64 = graph
            .edges()
            .iter()
            .map(|e| ma_qaoa_expectation_p1(&angles, &graph, Some(&[(e.v, e.u)])).unwrap())
            .sum();
        assert_abs_diff_eq!(all, parts, epsilon = 1e-12);
        assert!(ma_qaoa_expectation_p1(&angles, &graph, Some(&[(0, 0)])).is_err());
    }

    #[test]
    fn test_angle_count_checked() {
        let graph = Graph::cycle(4);
        assert!(ma_qaoa_expectation_p1(&[0.0; 7], &graph, None).is_err());
        assert!(general_z1_expectation(&[0.0; 7], &graph).is_err());
        assert!(general_z1_reduced_expectation(&[0.0; 5], &graph).is_err());
    }

    #[test]
    fn test_general_z1_bounds() {
        let graph = Graph::cycle(4);
        // sin2γ·sin2β = -1 on even nodes, +1 on odd nodes cuts every edge
        let gammas = [-PI / 4.0, PI / 4.0, -PI / 4.0, PI / 4.0];
        let value = general_z1_reduced_expectation(&gammas, &graph).unwrap();
        assert_abs_diff_eq!(value, 4.0, epsilon = 1e-12);

        let value = general_z1_expectation(&[0.0; 8], &graph).unwrap();
        assert_abs_diff_eq!(value, 2.0, epsilon = 1e-12);
    }
}
