use crate::Tensor;
use crate::error::ModelError;
use ndarray::Array2;

/// Strategy for producing initial parameter values.
///
/// An initializer maps a requested shape to a freshly allocated array of
/// that shape. Implementations that sample randomly accept an optional seed
/// so tests can pin the output.
pub trait Initializer {
    /// Produces a newly allocated array of the requested shape.
    ///
    /// # Parameters
    ///
    /// - `shape` - The target shape; an empty slice requests a 0-dimensional (scalar) array
    ///
    /// # Returns
    ///
    /// - `Result<Tensor, ModelError>` - The initialized array
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the shape violates the strategy's constraints
    /// - `ModelError::ProcessingError` - If an internal computation fails
    fn initialize(&self, shape: &[usize]) -> Result<Tensor, ModelError>;
}

/// Materializes a 2-D weight matrix from an initializer.
///
/// Convenience used by the recurrent cells when building their projection
/// kernels and biases.
pub(crate) fn init_matrix(
    init: &dyn Initializer,
    rows: usize,
    cols: usize,
) -> Result<Array2<f32>, ModelError> {
    init.initialize(&[rows, cols])?
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(|_| {
            ModelError::ProcessingError(format!(
                "Initializer did not produce a matrix of shape ({}, {})",
                rows, cols
            ))
        })
}

/// Constant-fill initialization, typically used for biases
pub mod constant;
/// Uniform Xavier/Glorot initialization for input kernels
pub mod glorot_uniform;
/// SVD-based orthogonal initialization for recurrent kernels
pub mod orthogonal;

pub use constant::Constant;
pub use glorot_uniform::GlorotUniform;
pub use orthogonal::Orthogonal;
