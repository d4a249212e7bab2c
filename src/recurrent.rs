use crate::device::Device;
use crate::error::ModelError;
use crate::initializer::{Constant, GlorotUniform, Initializer, Orthogonal, init_matrix};
use ndarray::{Array2, Axis, concatenate};

/// Applies stable sigmoid activation to an array.
///
/// Uses clipping to prevent numerical overflow before computing sigmoid.
#[inline]
fn apply_sigmoid(arr: Array2<f32>) -> Array2<f32> {
    arr.mapv(|x| {
        let clipped_x = x.clamp(-500.0, 500.0);
        1.0 / (1.0 + (-clipped_x).exp())
    })
}

/// Applies stable hyperbolic tangent activation to an array
#[inline]
fn apply_tanh(arr: Array2<f32>) -> Array2<f32> {
    arr.mapv(|x| x.clamp(-500.0, 500.0).tanh())
}

/// Helper function to extract cache and return error if not available.
///
/// This is used during backward pass to ensure forward pass has been run.
#[inline]
fn take_cache<T>(cache: &mut Option<T>, error_msg: &str) -> Result<T, ModelError> {
    cache
        .take()
        .ok_or_else(|| ModelError::ProcessingError(error_msg.to_string()))
}

/// Input validation functions for recurrent cells
mod input_validation_function;
use input_validation_function::*;

/// Tagged variant over the four cell kinds with a uniform contract
pub mod cell;
/// A stateless GRU (Gated Recurrent Unit) cell implementation
pub mod gru;
/// A single affine projection unit owned by the cells
pub mod linear_unit;
/// A stack of stateless GRU cells sharing one concatenated hidden tensor
pub mod stacked_gru;
/// A stack of stateful GRU cells, each owning its hidden state
pub mod stacked_stateful_gru;
/// A GRU cell that retains its hidden state across calls
pub mod stateful_gru;
/// Borrowed views over cell weights
pub mod weight;

pub use cell::RecurrentCell;
pub use gru::GRU;
pub use linear_unit::LinearUnit;
pub use stacked_gru::StackedGRU;
pub use stacked_stateful_gru::StackedStatefulGRU;
pub use stateful_gru::StatefulGRU;
pub use weight::{GRUWeight, LinearUnitWeight};
