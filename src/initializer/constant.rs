use crate::Tensor;
use crate::error::ModelError;
use crate::initializer::Initializer;
use ndarray::IxDyn;

/// Fills an array of any shape with a fixed value.
///
/// Used for bias initialization; `Constant::zeros()` is the usual choice.
pub struct Constant {
    value: f32,
}

impl Constant {
    /// Creates a constant initializer with the given fill value
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    /// Creates a constant initializer filling with zero
    pub fn zeros() -> Self {
        Self::new(0.0)
    }

    /// Gets the `value` field
    pub fn get_value(&self) -> f32 {
        self.value
    }
}

impl Initializer for Constant {
    fn initialize(&self, shape: &[usize]) -> Result<Tensor, ModelError> {
        Ok(Tensor::from_elem(IxDyn(shape), self.value))
    }
}
