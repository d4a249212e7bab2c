use ndarray::ArrayD;

/// Type alias for n-dimensional arrays produced by initializers
pub type Tensor = ArrayD<f32>;

/// Module `error` contains the error types surfaced by this crate.
///
/// All fallible operations return `Result<_, ModelError>`. Errors are split
/// into input/configuration validation failures and internal processing
/// failures; see the variant documentation for details.
pub mod error;

/// Module `device` contains the device placement abstraction.
///
/// Every parameter-owning object in this crate (linear units, cells, stacks)
/// carries a [`Device`](device::Device) placement attribute. Transfer
/// operations (`to_cpu`, `to_gpu`, `to_device`) move an object and everything
/// it owns, including any retained recurrent state, in a single pass.
///
/// GPU placement is available behind the `gpu` cargo feature; without it,
/// `to_gpu` fails with a descriptive error.
pub mod device;

/// Module `initializer` contains parameter initialization strategies.
///
/// Initializers produce freshly allocated arrays of a requested shape:
///
/// - **Orthogonal**: singular-value-decomposition based orthogonal system,
///   scaled by a constant; the standard choice for recurrent kernels, where
///   it keeps repeated applications of the weight matrix from shrinking or
///   amplifying the hidden signal.
/// - **GlorotUniform**: uniform samples on ±sqrt(6 / (fan_in + fan_out)),
///   the standard choice for input kernels.
/// - **Constant**: fills with a fixed value, typically used for biases.
///
/// All random initializers accept an optional seed for reproducibility.
///
/// # Examples
/// ```rust
/// use rustyrnn::initializer::{Initializer, Orthogonal};
///
/// let init = Orthogonal::new(1.0).with_seed(42);
/// let q = init.initialize(&[4, 8]).unwrap();
/// assert_eq!(q.shape(), &[4, 8]);
/// ```
pub mod initializer;

/// Module `recurrent` contains the GRU cell family.
///
/// # Core Components
///
/// - **LinearUnit**: a single affine projection with optional bias, gradient
///   accumulation and SGD update; the building block the cells are composed
///   from
/// - **GRU**: a stateless gated recurrent unit cell mapping a previous
///   hidden batch and an input batch to the next hidden batch, with a
///   single-step backward pass
/// - **StatefulGRU**: a GRU that retains its hidden state across calls,
///   with explicit state override and reset operations
/// - **StackedGRU** / **StackedStatefulGRU**: ordered stacks of cells,
///   layer 0 consuming the external input and each further layer consuming
///   the layer below's output
/// - **RecurrentCell**: a tagged variant over the four cell kinds exposing
///   one uniform forward/state-management contract
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::StatefulGRU;
/// use ndarray::Array2;
///
/// let mut cell = StatefulGRU::new(4, 8).unwrap();
/// let x = Array2::<f32>::ones((2, 4));
///
/// // First call starts from an absent state; the result is retained.
/// let h1 = cell.forward(&x).unwrap();
/// assert_eq!(h1.shape(), &[2, 8]);
/// let h2 = cell.forward(&x).unwrap();
/// assert_eq!(h2.shape(), &[2, 8]);
///
/// cell.reset_state();
/// assert!(cell.get_state().is_none());
/// ```
pub mod recurrent;

/// A convenience module that re-exports the most commonly used types of this
/// crate: the error type, the device abstraction, all initializers and the
/// full cell family.
///
/// # Examples
/// ```rust
/// use rustyrnn::prelude::*;
/// ```
pub mod prelude;

pub use error::ModelError;
