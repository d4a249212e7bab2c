use super::*;

/// Gradient clipping value to prevent exploding gradients in recurrent cells
const GRADIENT_CLIP_VALUE: f32 = 5.0;

/// A single affine projection with optional bias.
///
/// Maps an input batch of shape (batch, input_dim) to an output batch of
/// shape (batch, units) via `x · kernel + bias`. The GRU cells own six of
/// these units: three projecting the input and three projecting the previous
/// hidden state.
///
/// # Fields
///
/// - `kernel` - Weight matrix with shape (input_dim, units)
/// - `bias` - Optional bias with shape (1, units)
/// - `grad_kernel` - Optional kernel gradient, accumulated during backward passes
/// - `grad_bias` - Optional bias gradient, accumulated during backward passes
pub struct LinearUnit {
    input_dim: usize,
    units: usize,
    pub kernel: Array2<f32>,
    pub bias: Option<Array2<f32>>,
    pub grad_kernel: Option<Array2<f32>>,
    pub grad_bias: Option<Array2<f32>>,
    device: Device,
}

impl LinearUnit {
    /// Creates a linear unit with initialized weights.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Dimensionality of the input features
    /// - `units` - Number of output units
    /// - `init` - Initializer for the kernel
    /// - `bias_init` - Initializer for the bias, or `None` for a unit without bias
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new linear unit instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `input_dim` or `units` is 0
    pub fn new(
        input_dim: usize,
        units: usize,
        init: &dyn Initializer,
        bias_init: Option<&dyn Initializer>,
    ) -> Result<Self, ModelError> {
        validate_recurrent_dimensions(input_dim, units)?;

        let kernel = init_matrix(init, input_dim, units)?;
        let bias = match bias_init {
            Some(bias_init) => Some(init_matrix(bias_init, 1, units)?),
            None => None,
        };

        Ok(Self {
            input_dim,
            units,
            kernel,
            bias,
            grad_kernel: None,
            grad_bias: None,
            device: Device::default(),
        })
    }

    /// Applies the affine map to an input batch.
    ///
    /// # Parameters
    ///
    /// - `input` - Input batch with shape (batch, input_dim)
    ///
    /// # Returns
    ///
    /// - `Array2<f32>` - Output batch with shape (batch, units)
    pub fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        let z = input.dot(&self.kernel);
        match &self.bias {
            Some(bias) => z + bias,
            None => z,
        }
    }

    /// Propagates an output gradient back to the unit's input.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - Gradient with respect to the unit's output, shape (batch, units)
    ///
    /// # Returns
    ///
    /// - `Array2<f32>` - Gradient with respect to the unit's input, shape (batch, input_dim)
    pub fn backward_input(&self, grad_output: &Array2<f32>) -> Array2<f32> {
        grad_output.dot(&self.kernel.t())
    }

    /// Accumulates parameter gradients for one step.
    ///
    /// A step cell is invoked once per timestep, so gradients add up across
    /// calls until [`zero_gradients`](Self::zero_gradients) resets them.
    ///
    /// # Parameters
    ///
    /// - `input` - The input batch the unit saw during forward, shape (batch, input_dim)
    /// - `grad_output` - Gradient with respect to the unit's pre-activation output, shape (batch, units)
    pub fn accumulate_gradients(&mut self, input: &Array2<f32>, grad_output: &Array2<f32>) {
        let grad_kernel = input.t().dot(grad_output);
        self.grad_kernel = Some(match self.grad_kernel.take() {
            Some(existing) => existing + grad_kernel,
            None => grad_kernel,
        });

        if self.bias.is_some() {
            let grad_bias = grad_output.sum_axis(Axis(0)).insert_axis(Axis(0));
            self.grad_bias = Some(match self.grad_bias.take() {
                Some(existing) => existing + grad_bias,
                None => grad_bias,
            });
        }
    }

    /// Clears the accumulated gradients
    pub fn zero_gradients(&mut self) {
        self.grad_kernel = None;
        self.grad_bias = None;
    }

    /// Updates the unit's parameters using SGD with gradient clipping.
    ///
    /// Does nothing when no gradients have been accumulated.
    ///
    /// # Parameters
    ///
    /// - `lr` - Learning rate
    pub fn update_parameters_sgd(&mut self, lr: f32) {
        if let Some(grad_kernel) = &self.grad_kernel {
            // Apply gradient clipping to prevent exploding gradients
            let clipped =
                grad_kernel.mapv(|x| x.clamp(-GRADIENT_CLIP_VALUE, GRADIENT_CLIP_VALUE));
            self.kernel = &self.kernel - &(lr * &clipped);
        }
        if let (Some(bias), Some(grad_bias)) = (&self.bias, &self.grad_bias) {
            let clipped = grad_bias.mapv(|x| x.clamp(-GRADIENT_CLIP_VALUE, GRADIENT_CLIP_VALUE));
            let updated = bias - &(lr * &clipped);
            self.bias = Some(updated);
        }
    }

    /// Moves the unit's buffers to the given device
    pub fn to_device(&mut self, device: Device) {
        self.device = device;
    }

    /// Returns the device the unit's buffers are placed on
    pub fn get_device(&self) -> Device {
        self.device
    }

    /// Returns the input dimension of the unit
    pub fn get_input_dim(&self) -> usize {
        self.input_dim
    }

    /// Returns the number of output units
    pub fn get_units(&self) -> usize {
        self.units
    }

    /// Returns a borrowed view of the unit's weights
    pub fn get_weight(&self) -> LinearUnitWeight<'_> {
        LinearUnitWeight {
            kernel: &self.kernel,
            bias: self.bias.as_ref(),
        }
    }

    /// Returns the total number of trainable parameters in the unit
    pub fn param_count(&self) -> usize {
        self.input_dim * self.units + if self.bias.is_some() { self.units } else { 0 }
    }
}
