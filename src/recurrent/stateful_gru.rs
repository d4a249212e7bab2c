use super::*;

/// Stateful Gated Recurrent Unit (GRU) cell.
///
/// Wraps a stateless [`GRU`] and owns the recurrent hidden state across
/// calls: `forward` takes only the input batch, reads the retained state and
/// stores the step's result as the new state.
///
/// The state starts absent. On the first call (and on every call after
/// [`reset_state`](Self::reset_state)) the recurrence simplifies: the
/// recurrent projections U_r, U_z, U and the `(1 - z) ⊙ h` term are never
/// evaluated, so the step reduces to
///
/// ```text
/// z  = sigmoid(W_z x)
/// h̄  = tanh(W x)
/// h' = z ⊙ h̄
/// ```
///
/// which matches the full recurrence with a zero hidden vector without ever
/// materializing one.
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::StatefulGRU;
/// use ndarray::Array2;
///
/// let mut cell = StatefulGRU::new(4, 8).unwrap();
/// let x = Array2::<f32>::ones((1, 4));
///
/// let h1 = cell.forward(&x).unwrap();
/// assert_eq!(cell.get_state().unwrap(), &h1);
/// ```
pub struct StatefulGRU {
    cell: GRU,
    state: Option<Array2<f32>>,
    state_size: usize,
}

impl StatefulGRU {
    /// Creates a stateful GRU cell with default initialization and absent state.
    ///
    /// # Parameters
    ///
    /// - `in_size` - Dimension of the input vector x
    /// - `out_size` - Dimension of the hidden vector h
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new stateful GRU cell instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `in_size` or `out_size` is 0
    pub fn new(in_size: usize, out_size: usize) -> Result<Self, ModelError> {
        Ok(Self {
            cell: GRU::new(in_size, out_size)?,
            state: None,
            state_size: out_size,
        })
    }

    /// Creates a stateful GRU cell with custom initialization.
    ///
    /// # Parameters
    ///
    /// - `in_size` - Dimension of the input vector x
    /// - `out_size` - Dimension of the hidden vector h
    /// - `init` - Initializer for the input kernels W_r, W_z, W
    /// - `inner_init` - Initializer for the recurrent kernels U_r, U_z, U
    /// - `bias_init` - Initial value for all biases
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a dimension is 0 or an initializer
    ///   rejects the kernel shape
    pub fn with_initializers(
        in_size: usize,
        out_size: usize,
        init: &dyn Initializer,
        inner_init: &dyn Initializer,
        bias_init: f32,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            cell: GRU::with_initializers(in_size, out_size, init, inner_init, bias_init)?,
            state: None,
            state_size: out_size,
        })
    }

    /// Performs one forward step and retains the result as the new state.
    ///
    /// With a retained state the full GRU recurrence applies; with an absent
    /// state the first-call simplification is used (see the type-level
    /// documentation).
    ///
    /// # Parameters
    ///
    /// - `input` - Input batch with shape (batch, in_size)
    ///
    /// # Returns
    ///
    /// - `Result<Array2<f32>, ModelError>` - The next hidden batch, which is also the new retained state
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the input width or batch size does not match
    pub fn forward(&mut self, input: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        let h_new = match &self.state {
            Some(hidden) => self.cell.forward(hidden, input)?,
            None => {
                // First call: U_r, U_z, U and the (1 - z) ⊙ h term are skipped
                // entirely rather than evaluated against a zero vector
                validate_feature_width(input, self.cell.get_input_dim(), "input")?;
                let z = apply_sigmoid(self.cell.update_input.forward(input));
                let h_bar = apply_tanh(self.cell.candidate_input.forward(input));
                &z * &h_bar
            }
        };
        self.state = Some(h_new.clone());
        Ok(h_new)
    }

    /// Overrides the retained state with the given hidden batch.
    ///
    /// The batch is stored unchanged and can be read back bit-for-bit with
    /// [`get_state`](Self::get_state).
    ///
    /// # Parameters
    ///
    /// - `hidden` - Hidden batch with shape (batch, out_size)
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the hidden width does not match `out_size`
    pub fn set_state(&mut self, hidden: Array2<f32>) -> Result<(), ModelError> {
        validate_feature_width(&hidden, self.state_size, "hidden state")?;
        self.state = Some(hidden);
        Ok(())
    }

    /// Clears the retained state to absent
    pub fn reset_state(&mut self) {
        self.state = None;
    }

    /// Returns the retained state, if any
    pub fn get_state(&self) -> Option<&Array2<f32>> {
        self.state.as_ref()
    }

    /// Returns the dimension of the retained hidden vector
    pub fn get_state_size(&self) -> usize {
        self.state_size
    }

    /// Returns the input dimension of the cell
    pub fn get_input_dim(&self) -> usize {
        self.cell.get_input_dim()
    }

    /// Returns the hidden dimension of the cell
    pub fn get_units(&self) -> usize {
        self.cell.get_units()
    }

    /// Sets the weights of all six projection units; see [`GRU::set_weights`]
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
        self.cell.set_weights(
            reset_kernel,
            reset_bias,
            reset_recurrent_kernel,
            reset_recurrent_bias,
            update_kernel,
            update_bias,
            update_recurrent_kernel,
            update_recurrent_bias,
            candidate_kernel,
            candidate_bias,
            candidate_recurrent_kernel,
            candidate_recurrent_bias,
        );
    }

    /// Returns a borrowed view of all six units' weights
    pub fn get_weights(&self) -> GRUWeight<'_> {
        self.cell.get_weights()
    }

    /// Moves the cell's parameters and, when present, the retained hidden
    /// state to the given device. An absent state stays absent.
    pub fn to_device(&mut self, device: Device) {
        self.cell.to_device(device);
    }

    /// Moves the cell and its retained state to the host CPU
    pub fn to_cpu(&mut self) {
        self.to_device(Device::Cpu);
    }

    /// Moves the cell and its retained state to the given GPU device.
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
        self.cell.get_device()
    }

    /// Returns the total number of trainable parameters in the cell
    pub fn param_count(&self) -> usize {
        self.cell.param_count()
    }
}
