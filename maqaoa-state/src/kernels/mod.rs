//! Basis-indexed kernels for the two QAOA unitaries

pub mod mixer;
pub mod phase;

pub use mixer::{apply_mixer_layer, apply_rotation, apply_single_qubit, exp_x, Unitary2};
pub use phase::{accumulate_phases, apply_phase_layer};
