//! Angle layouts accepted by evaluators
//!
//! Backends always consume the full multi-angle vector. A layout maps the
//! optimizer's (possibly shorter) vector onto it:
//!
//! - [`AngleLayout::MultiAngle`]: identity
//! - [`AngleLayout::Standard`]: one γ and one β per layer, repeated over all
//!   terms and qubits of that layer
//! - [`AngleLayout::Scheme`]: each reduced angle is copied into a listed set
//!   of full positions

use crate::error::Result;
use maqaoa_core::QaoaError;
use std::borrow::Cow;

/// Expand `[γ_1, β_1, .., γ_p, β_p]` into the multi-angle layout
///
/// Each layer becomes `num_terms` copies of γ followed by `num_qubits`
/// copies of β.
pub fn expand_standard_angles(angles: &[f64], num_terms: usize, num_qubits: usize) -> Result<Vec<f64>> {
    if angles.len() % 2 != 0 {
        return Err(QaoaError::IncompleteLayer {
            len: angles.len(),
            per_layer: 2,
        }
        .into());
    }
    let mut full = Vec::with_capacity(angles.len() / 2 * (num_terms + num_qubits));
    for layer in angles.chunks_exact(2) {
        full.extend(std::iter::repeat(layer[0]).take(num_terms));
        full.extend(std::iter::repeat(layer[1]).take(num_qubits));
    }
    Ok(full)
}

/// Collapse a multi-angle vector whose blocks are uniform back to `[γ, β]`
/// per layer
///
/// Fails when the length is not a whole number of layers or when a block
/// holds differing angles.
pub fn compress_to_standard(angles: &[f64], num_terms: usize, num_qubits: usize) -> Result<Vec<f64>> {
    let per_layer = num_terms + num_qubits;
    if per_layer == 0 || angles.len() % per_layer != 0 {
        return Err(QaoaError::IncompleteLayer {
            len: angles.len(),
            per_layer,
        }
        .into());
    }

    let mut standard = Vec::with_capacity(2 * angles.len() / per_layer);
    for layer in angles.chunks_exact(per_layer) {
        let (gammas, betas) = layer.split_at(num_terms);
        standard.push(uniform_block(gammas)?);
        standard.push(uniform_block(betas)?);
    }
    Ok(standard)
}

fn uniform_block(block: &[f64]) -> Result<f64> {
    let first = block.first().copied().unwrap_or(0.0);
    if block.iter().any(|&angle| angle != first) {
        return Err(QaoaError::InvalidScheme(
            "angle block is not uniform, cannot compress to standard layout".to_string(),
        )
        .into());
    }
    Ok(first)
}

/// Duplication scheme: reduced angle `i` is written to every full position in
/// `groups[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicationScheme {
    groups: Vec<Vec<usize>>,
    full_len: usize,
}

impl DuplicationScheme {
    /// Create a scheme over a full layout of `full_len` angles
    ///
    /// Every full position must be listed exactly once.
    pub fn new(groups: Vec<Vec<usize>>, full_len: usize) -> Result<Self> {
        let mut seen = vec![false; full_len];
        for (angle, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(invalid(format!("reduced angle {angle} maps to no position")));
            }
            for &position in group {
                match seen.get_mut(position) {
                    None => {
                        return Err(invalid(format!(
                            "position {position} outside of {full_len} full angles"
                        )))
                    }
                    Some(true) => {
                        return Err(invalid(format!("position {position} is assigned twice")))
                    }
                    Some(slot) => *slot = true,
                }
            }
        }
        if let Some(position) = seen.iter().position(|&covered| !covered) {
            return Err(invalid(format!("position {position} is not covered")));
        }
        Ok(Self { groups, full_len })
    }

    /// Scheme that encodes the standard layout for `depth` layers
    pub fn standard(num_terms: usize, num_qubits: usize, depth: usize) -> Result<Self> {
        let per_layer = num_terms + num_qubits;
        let mut groups = Vec::with_capacity(2 * depth);
        for layer in 0..depth {
            let offset = layer * per_layer;
            groups.push((offset..offset + num_terms).collect());
            groups.push((offset + num_terms..offset + per_layer).collect());
        }
        // Layers without terms leave an empty γ group
        groups.retain(|group: &Vec<usize>| !group.is_empty());
        Self::new(groups, per_layer * depth)
    }

    /// Number of reduced angles
    pub fn num_angles(&self) -> usize {
        self.groups.len()
    }

    /// Number of full angles
    pub fn full_len(&self) -> usize {
        self.full_len
    }

    /// Write the reduced angles into a full vector
    pub fn expand(&self, angles: &[f64]) -> Result<Vec<f64>> {
        if angles.len() != self.groups.len() {
            return Err(QaoaError::angle_count(self.groups.len(), angles.len()).into());
        }
        let mut full = vec![0.0; self.full_len];
        for (&angle, group) in angles.iter().zip(&self.groups) {
            for &position in group {
                full[position] = angle;
            }
        }
        Ok(full)
    }
}

fn invalid(message: String) -> crate::error::SimulatorError {
    QaoaError::InvalidScheme(message).into()
}

/// How an evaluator's input angles map onto the multi-angle layout
#[derive(Debug, Clone, PartialEq)]
pub enum AngleLayout {
    /// Input is already the multi-angle vector
    MultiAngle,
    /// One γ and one β per layer
    Standard { num_terms: usize, num_qubits: usize },
    /// Arbitrary duplication scheme
    Scheme(DuplicationScheme),
}

impl AngleLayout {
    /// Number of input angles for a backend taking `full_len` angles
    pub fn num_angles(&self, full_len: usize) -> usize {
        match self {
            Self::MultiAngle => full_len,
            Self::Standard {
                num_terms,
                num_qubits,
            } => 2 * full_len / (num_terms + num_qubits).max(1),
            Self::Scheme(scheme) => scheme.num_angles(),
        }
    }

    /// Check that the layout fits a backend taking `full_len` angles
    pub fn validate(&self, full_len: usize) -> Result<()> {
        match self {
            Self::MultiAngle => Ok(()),
            Self::Standard {
                num_terms,
                num_qubits,
            } => {
                let per_layer = num_terms + num_qubits;
                if per_layer == 0 || full_len % per_layer != 0 {
                    return Err(invalid(format!(
                        "{full_len} full angles are not whole layers of {per_layer}"
                    )));
                }
                Ok(())
            }
            Self::Scheme(scheme) if scheme.full_len() != full_len => Err(invalid(format!(
                "scheme covers {} full angles, backend takes {full_len}",
                scheme.full_len()
            ))),
            Self::Scheme(_) => Ok(()),
        }
    }

    /// Map input angles to the full layout
    ///
    /// The multi-angle layout borrows the input unchanged.
    pub fn expand<'a>(&self, angles: &'a [f64]) -> Result<Cow<'a, [f64]>> {
        match self {
            Self::MultiAngle => Ok(Cow::Borrowed(angles)),
            Self::Standard {
                num_terms,
                num_qubits,
            } => Ok(Cow::Owned(expand_standard_angles(angles, *num_terms, *num_qubits)?)),
            Self::Scheme(scheme) => Ok(Cow::Owned(scheme.expand(angles)?)),
        }
    }
}
