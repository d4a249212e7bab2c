use super::*;

/// Threshold for using parallel computation in GRU cells.
/// When batch_size * n_units < this value, sequential execution is used.
/// When batch_size * n_units >= this value, parallel execution is used.
///
/// Value is chosen based on empirical benchmarks where rayon's thread pool
/// overhead is amortized by computational gains from parallelization.
const GRU_PARALLEL_THRESHOLD: usize = 1024;

/// Stateless Gated Recurrent Unit (GRU) cell.
///
/// Owns six linear projection units: W_r, W_z and W map the input vector to
/// the hidden dimension, U_r, U_z and U map the previous hidden vector to
/// the hidden dimension. Given a previous hidden batch `h` of shape
/// (batch, n_units) and an input batch `x` of shape (batch, n_inputs), one
/// forward step computes
///
/// ```text
/// r  = sigmoid(W_r x + U_r h)
/// z  = sigmoid(W_z x + U_z h)
/// h̄  = tanh(W x + U (r ⊙ h))
/// h' = (1 - z) ⊙ h + z ⊙ h̄
/// ```
///
/// and returns `h'` without retaining any state. Use
/// [`StatefulGRU`](super::StatefulGRU) for a cell that carries its hidden
/// state across calls.
///
/// The cell caches its intermediate values during forward so that a single
/// [`backward`](Self::backward) step can propagate gradients through all six
/// units and the element-wise nonlinearities.
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::GRU;
/// use ndarray::Array2;
///
/// let mut cell = GRU::new(4, 3).unwrap();
/// let h = Array2::<f32>::zeros((2, 3));
/// let x = Array2::<f32>::ones((2, 4));
///
/// let h_next = cell.forward(&h, &x).unwrap();
/// assert_eq!(h_next.shape(), &[2, 3]);
/// ```
pub struct GRU {
    n_inputs: usize,
    n_units: usize,

    // Six projection units: three for the input, three for the hidden state
    pub(crate) reset_input: LinearUnit,
    pub(crate) reset_recurrent: LinearUnit,
    pub(crate) update_input: LinearUnit,
    pub(crate) update_recurrent: LinearUnit,
    pub(crate) candidate_input: LinearUnit,
    pub(crate) candidate_recurrent: LinearUnit,

    // Caches for the backward pass
    input_cache: Option<Array2<f32>>,
    hidden_cache: Option<Array2<f32>>,
    r_cache: Option<Array2<f32>>,
    z_cache: Option<Array2<f32>>,
    h_bar_cache: Option<Array2<f32>>,
    rh_cache: Option<Array2<f32>>,

    device: Device,
}

impl GRU {
    /// Creates a GRU cell with default initialization.
    ///
    /// Input kernels use Glorot uniform initialization, recurrent kernels use
    /// orthogonal initialization, biases start at zero.
    ///
    /// # Parameters
    ///
    /// - `n_inputs` - Dimension of the input vector x
    /// - `n_units` - Dimension of the hidden vector h
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new GRU cell instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `n_inputs` or `n_units` is 0
    pub fn new(n_inputs: usize, n_units: usize) -> Result<Self, ModelError> {
        let init = GlorotUniform::new();
        let inner_init = Orthogonal::default();
        Self::with_initializers(n_inputs, n_units, &init, &inner_init, 0.0)
    }

    /// Creates a GRU cell with custom initialization.
    ///
    /// # Parameters
    ///
    /// - `n_inputs` - Dimension of the input vector x
    /// - `n_units` - Dimension of the hidden vector h
    /// - `init` - Initializer for the input kernels W_r, W_z, W
    /// - `inner_init` - Initializer for the recurrent kernels U_r, U_z, U
    /// - `bias_init` - Initial value for all biases
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new GRU cell instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `n_inputs` or `n_units` is 0,
    ///   or if an initializer rejects the kernel shape
    pub fn with_initializers(
        n_inputs: usize,
        n_units: usize,
        init: &dyn Initializer,
        inner_init: &dyn Initializer,
        bias_init: f32,
    ) -> Result<Self, ModelError> {
        validate_recurrent_dimensions(n_inputs, n_units)?;

        let bias_filler = Constant::new(bias_init);
        let bias: Option<&dyn Initializer> = Some(&bias_filler);

        Ok(Self {
            n_inputs,
            n_units,
            reset_input: LinearUnit::new(n_inputs, n_units, init, bias)?,
            reset_recurrent: LinearUnit::new(n_units, n_units, inner_init, bias)?,
            update_input: LinearUnit::new(n_inputs, n_units, init, bias)?,
            update_recurrent: LinearUnit::new(n_units, n_units, inner_init, bias)?,
            candidate_input: LinearUnit::new(n_inputs, n_units, init, bias)?,
            candidate_recurrent: LinearUnit::new(n_units, n_units, inner_init, bias)?,
            input_cache: None,
            hidden_cache: None,
            r_cache: None,
            z_cache: None,
            h_bar_cache: None,
            rh_cache: None,
            device: Device::default(),
        })
    }

    /// Performs one forward step of the GRU recurrence.
    ///
    /// # Parameters
    ///
    /// - `hidden` - Previous hidden batch with shape (batch, n_units)
    /// - `input` - Input batch with shape (batch, n_inputs)
    ///
    /// # Returns
    ///
    /// - `Result<Array2<f32>, ModelError>` - The next hidden batch with shape (batch, n_units)
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the feature widths or batch sizes do not match
    pub fn forward(
        &mut self,
        hidden: &Array2<f32>,
        input: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        validate_feature_width(input, self.n_inputs, "input")?;
        validate_feature_width(hidden, self.n_units, "hidden state")?;
        validate_batch_match(hidden.nrows(), input.nrows())?;

        let batch = input.nrows();

        // Determine whether to use parallel execution based on computational load
        let use_parallel = batch * self.n_units >= GRU_PARALLEL_THRESHOLD;

        // Pre-activations of the reset and update gates (parallel or sequential)
        let (r_raw, z_raw) = if use_parallel {
            rayon::join(
                || self.reset_input.forward(input) + self.reset_recurrent.forward(hidden),
                || self.update_input.forward(input) + self.update_recurrent.forward(hidden),
            )
        } else {
            (
                self.reset_input.forward(input) + self.reset_recurrent.forward(hidden),
                self.update_input.forward(input) + self.update_recurrent.forward(hidden),
            )
        };

        let (r, z) = if use_parallel {
            rayon::join(|| apply_sigmoid(r_raw), || apply_sigmoid(z_raw))
        } else {
            (apply_sigmoid(r_raw), apply_sigmoid(z_raw))
        };

        // Candidate state: h̄ = tanh(W x + U (r ⊙ h))
        let r_h = &r * hidden;
        let h_bar = apply_tanh(
            self.candidate_input.forward(input) + self.candidate_recurrent.forward(&r_h),
        );

        // Next hidden state: h' = (1 - z) ⊙ h + z ⊙ h̄
        let h_new = &(1.0 - &z) * hidden + &z * &h_bar;

        // Cache values for backward
        self.input_cache = Some(input.clone());
        self.hidden_cache = Some(hidden.clone());
        self.r_cache = Some(r);
        self.z_cache = Some(z);
        self.h_bar_cache = Some(h_bar);
        self.rh_cache = Some(r_h);

        Ok(h_new)
    }

    /// Propagates a gradient back through the most recent forward step.
    ///
    /// Consumes the cached intermediates, accumulates parameter gradients in
    /// all six units and returns the gradients flowing out of the step.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - Gradient with respect to the step's output h', shape (batch, n_units)
    ///
    /// # Returns
    ///
    /// - `Result<(Array2<f32>, Array2<f32>), ModelError>` - Gradients with respect to
    ///   the previous hidden state and to the input, in that order
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If no forward step has been run since the last backward
    /// - `ModelError::InputValidationError` - If `grad_output` does not match the hidden width
    pub fn backward(
        &mut self,
        grad_output: &Array2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>), ModelError> {
        validate_feature_width(grad_output, self.n_units, "gradient")?;

        let error_msg = "Forward pass has not been run";
        let input = take_cache(&mut self.input_cache, error_msg)?;
        let hidden = take_cache(&mut self.hidden_cache, error_msg)?;
        let r = take_cache(&mut self.r_cache, error_msg)?;
        let z = take_cache(&mut self.z_cache, error_msg)?;
        let h_bar = take_cache(&mut self.h_bar_cache, error_msg)?;
        let r_h = take_cache(&mut self.rh_cache, error_msg)?;

        let batch = input.nrows();
        let use_parallel = batch * self.n_units >= GRU_PARALLEL_THRESHOLD;

        // Gradient through h' = (1 - z) ⊙ h + z ⊙ h̄
        let grad_z = grad_output * &(&h_bar - &hidden);
        let grad_h_bar = grad_output * &z;
        let grad_hidden_from_update = grad_output * &(1.0 - &z);

        // Gradient through h̄ = tanh(...)
        let grad_h_bar_raw = &grad_h_bar * &(1.0 - &h_bar * &h_bar); // tanh derivative

        // Gradient through r ⊙ h
        let grad_rh = self.candidate_recurrent.backward_input(&grad_h_bar_raw);
        let grad_r = &grad_rh * &hidden;
        let grad_hidden_from_reset = &grad_rh * &r;

        // Gradient through the gate sigmoids (parallel or sequential)
        let (grad_z_raw, grad_r_raw) = if use_parallel {
            rayon::join(
                || &grad_z * &z * &(1.0 - &z), // sigmoid derivative
                || &grad_r * &r * &(1.0 - &r), // sigmoid derivative
            )
        } else {
            (
                &grad_z * &z * &(1.0 - &z), // sigmoid derivative
                &grad_r * &r * &(1.0 - &r), // sigmoid derivative
            )
        };

        // Accumulate parameter gradients for all six units
        self.candidate_input.accumulate_gradients(&input, &grad_h_bar_raw);
        self.candidate_recurrent.accumulate_gradients(&r_h, &grad_h_bar_raw);
        self.update_input.accumulate_gradients(&input, &grad_z_raw);
        self.update_recurrent.accumulate_gradients(&hidden, &grad_z_raw);
        self.reset_input.accumulate_gradients(&input, &grad_r_raw);
        self.reset_recurrent.accumulate_gradients(&hidden, &grad_r_raw);

        // Gradient with respect to the input
        let grad_input = self.reset_input.backward_input(&grad_r_raw)
            + self.update_input.backward_input(&grad_z_raw)
            + self.candidate_input.backward_input(&grad_h_bar_raw);

        // Gradient with respect to the previous hidden state
        let grad_hidden = self.reset_recurrent.backward_input(&grad_r_raw)
            + self.update_recurrent.backward_input(&grad_z_raw)
            + grad_hidden_from_reset
            + grad_hidden_from_update;

        Ok((grad_hidden, grad_input))
    }

    /// Sets the weights of all six projection units.
    ///
    /// # Parameters
    ///
    /// - `reset_kernel` - Kernel of W_r with shape (n_inputs, n_units)
    /// - `reset_bias` - Bias of W_r with shape (1, n_units)
    /// - `reset_recurrent_kernel` - Kernel of U_r with shape (n_units, n_units)
    /// - `reset_recurrent_bias` - Bias of U_r with shape (1, n_units)
    /// - `update_kernel` - Kernel of W_z with shape (n_inputs, n_units)
    /// - `update_bias` - Bias of W_z with shape (1, n_units)
    /// - `update_recurrent_kernel` - Kernel of U_z with shape (n_units, n_units)
    /// - `update_recurrent_bias` - Bias of U_z with shape (1, n_units)
    /// - `candidate_kernel` - Kernel of W with shape (n_inputs, n_units)
    /// - `candidate_bias` - Bias of W with shape (1, n_units)
    /// - `candidate_recurrent_kernel` - Kernel of U with shape (n_units, n_units)
    /// - `candidate_recurrent_bias` - Bias of U with shape (1, n_units)
    #[allow(clippy::too_many_arguments)]
    pub fn set_weights(
        &mut self,
        reset_kernel: Array2<f32>,
        reset_bias: Array2<f32>,
        reset_recurrent_kernel: Array2<f32>,
        reset_recurrent_bias: Array2<f32>,
        update_kernel: Array2<f32>,
        update_bias: Array2<f32>,
        update_recurrent_kernel: Array2<f32>,
        update_recurrent_bias: Array2<f32>,
        candidate_kernel: Array2<f32>,
        candidate_bias: Array2<f32>,
        candidate_recurrent_kernel: Array2<f32>,
        candidate_recurrent_bias: Array2<f32>,
    ) {
        self.reset_input.kernel = reset_kernel;
        self.reset_input.bias = Some(reset_bias);
        self.reset_recurrent.kernel = reset_recurrent_kernel;
        self.reset_recurrent.bias = Some(reset_recurrent_bias);

        self.update_input.kernel = update_kernel;
        self.update_input.bias = Some(update_bias);
        self.update_recurrent.kernel = update_recurrent_kernel;
        self.update_recurrent.bias = Some(update_recurrent_bias);

        self.candidate_input.kernel = candidate_kernel;
        self.candidate_input.bias = Some(candidate_bias);
        self.candidate_recurrent.kernel = candidate_recurrent_kernel;
        self.candidate_recurrent.bias = Some(candidate_recurrent_bias);
    }

    /// Returns a borrowed view of all six units' weights
    pub fn get_weights(&self) -> GRUWeight<'_> {
        GRUWeight {
            reset_input: self.reset_input.get_weight(),
            reset_recurrent: self.reset_recurrent.get_weight(),
            update_input: self.update_input.get_weight(),
            update_recurrent: self.update_recurrent.get_weight(),
            candidate_input: self.candidate_input.get_weight(),
            candidate_recurrent: self.candidate_recurrent.get_weight(),
        }
    }

    /// Updates all six units' parameters using SGD.
    ///
    /// # Parameters
    ///
    /// - `lr` - Learning rate
    pub fn update_parameters_sgd(&mut self, lr: f32) {
        for unit in self.units_mut() {
            unit.update_parameters_sgd(lr);
        }
    }

    /// Clears the accumulated gradients of all six units
    pub fn zero_gradients(&mut self) {
        for unit in self.units_mut() {
            unit.zero_gradients();
        }
    }

    /// Moves the cell and all six units to the given device
    pub fn to_device(&mut self, device: Device) {
        for unit in self.units_mut() {
            unit.to_device(device);
        }
        self.device = device;
    }

    /// Moves the cell to the host CPU
    pub fn to_cpu(&mut self) {
        self.to_device(Device::Cpu);
    }

    /// Moves the cell to the given GPU device.
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If the crate was built without the `gpu` feature
    pub fn to_gpu(&mut self, device_id: usize) -> Result<(), ModelError> {
        let device = Device::try_gpu(device_id)?;
        self.to_device(device);
        Ok(())
    }

    /// Returns the device the cell's buffers are placed on
    pub fn get_device(&self) -> Device {
        self.device
    }

    /// Returns the input dimension of the cell
    pub fn get_input_dim(&self) -> usize {
        self.n_inputs
    }

    /// Returns the hidden dimension of the cell
    pub fn get_units(&self) -> usize {
        self.n_units
    }

    /// Returns the total number of trainable parameters in the cell
    pub fn param_count(&self) -> usize {
        [
            &self.reset_input,
            &self.reset_recurrent,
            &self.update_input,
            &self.update_recurrent,
            &self.candidate_input,
            &self.candidate_recurrent,
        ]
        .iter()
        .map(|unit| unit.param_count())
        .sum()
    }

    fn units_mut(&mut self) -> [&mut LinearUnit; 6] {
        [
            &mut self.reset_input,
            &mut self.reset_recurrent,
            &mut self.update_input,
            &mut self.update_recurrent,
            &mut self.candidate_input,
            &mut self.candidate_recurrent,
        ]
    }
}
