use crate::Tensor;
use crate::error::ModelError;
use crate::initializer::Initializer;
use ndarray::{Array2, IxDyn};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{RngCore, SeedableRng, thread_rng};
use ndarray_rand::rand_distr::StandardNormal;

/// Initializes an array with an orthogonal system of vectors.
///
/// The initializer samples a matrix of the same flattened shape as the
/// requested array from the standard Gaussian distribution, applies a
/// singular value decomposition, keeps whichever of the resulting orthogonal
/// factors matches the flattened shape, reshapes it back to the requested
/// shape and multiplies by a constant `scale`.
///
/// Arrays with more than two dimensions are treated as matrices by flattening
/// all axes after the first, so the first axis indexes the vectors of the
/// orthogonal system. The number of vectors (first shape element) must not
/// exceed the dimension of each vector (product of the remaining shape
/// elements).
///
/// For the flattened result `Q` of shape (rows, cols) with rows ≤ cols, the
/// rows form an orthogonal system: `Q Qᵀ = scale² · I`.
///
/// # Fields
///
/// - `scale` - Constant multiplied into the orthogonal factor
/// - `random_seed` - Optional seed for the Gaussian sample, for reproducibility
///
/// # Examples
/// ```rust
/// use rustyrnn::initializer::{Initializer, Orthogonal};
///
/// let init = Orthogonal::new(1.0).with_seed(7);
/// let q = init.initialize(&[3, 5]).unwrap();
/// assert_eq!(q.shape(), &[3, 5]);
///
/// // More vectors than dimensions cannot form an orthogonal system
/// assert!(init.initialize(&[5, 3]).is_err());
/// ```
pub struct Orthogonal {
    scale: f32,
    random_seed: Option<u64>,
}

impl Default for Orthogonal {
    /// Creates an orthogonal initializer with scale 1.1 and no fixed seed
    fn default() -> Self {
        Self {
            scale: 1.1,
            random_seed: None,
        }
    }
}

impl Orthogonal {
    /// Creates an orthogonal initializer with the given scale and no fixed seed
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            random_seed: None,
        }
    }

    /// Pins the Gaussian sample to a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Gets the `scale` field
    pub fn get_scale(&self) -> f32 {
        self.scale
    }

    /// Gets the `random_seed` field
    pub fn get_random_seed(&self) -> Option<u64> {
        self.random_seed
    }
}

impl Initializer for Orthogonal {
    fn initialize(&self, shape: &[usize]) -> Result<Tensor, ModelError> {
        // A scalar is filled with the scale constant itself
        if shape.is_empty() {
            return Ok(Tensor::from_elem(IxDyn(&[]), self.scale));
        }

        let size: usize = shape.iter().product();
        if size == 0 {
            return Ok(Tensor::zeros(IxDyn(shape)));
        }

        // Flatten all axes after the first
        let rows = shape[0];
        let cols = size / rows;
        if rows > cols {
            return Err(ModelError::InputValidationError(format!(
                "Cannot make an orthogonal system because the number of vectors ({}) is larger than the dimension of each vector ({})",
                rows, cols
            )));
        }

        let mut rng_source = match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(thread_rng().next_u64()),
        };
        let a: Array2<f32> = Array2::random_using((rows, cols), StandardNormal, &mut rng_source);

        // nalgebra stores matrices column-major; from_row_slice preserves
        // ndarray's logical element order
        let a_slice = a.as_slice().ok_or_else(|| {
            ModelError::ProcessingError("Failed to convert sampled matrix to slice".to_string())
        })?;
        let a_mat = nalgebra::DMatrix::from_row_slice(rows, cols, a_slice);

        let svd = nalgebra::SVD::new(a_mat, true, true);
        let u = svd
            .u
            .ok_or_else(|| ModelError::ProcessingError("SVD did not compute U".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| ModelError::ProcessingError("SVD did not compute V^T".to_string()))?;

        // The thin SVD yields U with shape (rows, rows) and V^T with shape
        // (rows, cols); keep the factor matching the flattened shape
        let q = if u.nrows() == rows && u.ncols() == cols {
            u
        } else {
            v_t
        };

        let scale = self.scale;
        let q_arr = Array2::from_shape_fn((rows, cols), |(i, j)| q[(i, j)] * scale);
        Tensor::from_shape_vec(IxDyn(shape), q_arr.into_iter().collect()).map_err(|_| {
            ModelError::ProcessingError(format!(
                "Failed to reshape orthogonal factor to {:?}",
                shape
            ))
        })
    }
}
