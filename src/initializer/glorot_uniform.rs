use crate::Tensor;
use crate::error::ModelError;
use crate::initializer::Initializer;
use ndarray::IxDyn;
use ndarray_rand::RandomExt;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{RngCore, SeedableRng, thread_rng};
use ndarray_rand::rand_distr::Uniform;

/// Xavier/Glorot uniform initialization.
///
/// Samples uniformly from ±sqrt(6 / (fan_in + fan_out)), where `fan_in` is
/// the first shape element and `fan_out` is the product of the remaining
/// ones. Keeps the activation variance roughly constant across layers, which
/// makes it the usual choice for the input kernels of a cell.
///
/// # Fields
///
/// - `random_seed` - Optional seed for the uniform sample, for reproducibility
pub struct GlorotUniform {
    random_seed: Option<u64>,
}

impl Default for GlorotUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl GlorotUniform {
    /// Creates a Glorot uniform initializer with no fixed seed
    pub fn new() -> Self {
        Self { random_seed: None }
    }

    /// Pins the uniform sample to a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Gets the `random_seed` field
    pub fn get_random_seed(&self) -> Option<u64> {
        self.random_seed
    }
}

impl Initializer for GlorotUniform {
    fn initialize(&self, shape: &[usize]) -> Result<Tensor, ModelError> {
        if shape.len() < 2 {
            return Err(ModelError::InputValidationError(format!(
                "Glorot initialization requires at least 2 dimensions, got shape {:?}",
                shape
            )));
        }
        if shape.iter().any(|&dim| dim == 0) {
            return Ok(Tensor::zeros(IxDyn(shape)));
        }

        let fan_in = shape[0];
        let fan_out: usize = shape[1..].iter().product();
        let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();

        let mut rng_source = match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(thread_rng().next_u64()),
        };
        Ok(Tensor::random_using(
            IxDyn(shape),
            Uniform::new(-limit, limit),
            &mut rng_source,
        ))
    }
}
