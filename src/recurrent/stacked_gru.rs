use super::*;
use ndarray::s;

/// Stacked stateless Gated Recurrent Unit cells.
///
/// An ordered sequence of [`GRU`] cells where layer 0 consumes the external
/// input and every further layer consumes the output of the layer below it.
/// All layers' previous hidden states travel in a single tensor of shape
/// (batch, num_layers × out_size), split into equal per-layer slices in layer
/// order; the output uses the same convention.
///
/// Layer 0 is sized (in_size → out_size), layers 1.. are sized
/// (out_size → out_size).
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::StackedGRU;
/// use ndarray::Array2;
///
/// let mut stack = StackedGRU::new(4, 3, 2).unwrap();
/// let hidden = Array2::<f32>::zeros((2, 6));
/// let x = Array2::<f32>::ones((2, 4));
///
/// let next = stack.forward(&hidden, &x).unwrap();
/// assert_eq!(next.shape(), &[2, 6]);
/// ```
pub struct StackedGRU {
    layers: Vec<GRU>,
    in_size: usize,
    out_size: usize,
    device: Device,
}

impl StackedGRU {
    /// Creates a stack of stateless GRU cells with default initialization.
    ///
    /// # Parameters
    ///
    /// - `in_size` - Dimension of the external input vector
    /// - `out_size` - Hidden dimension of every layer
    /// - `num_layers` - Number of stacked cells, at least 1
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new stack instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `num_layers` is 0, or if `in_size` or `out_size` is 0
    pub fn new(in_size: usize, out_size: usize, num_layers: usize) -> Result<Self, ModelError> {
        validate_num_layers(num_layers)?;

        let mut layers = Vec::with_capacity(num_layers);
        layers.push(GRU::new(in_size, out_size)?);
        for _ in 1..num_layers {
            layers.push(GRU::new(out_size, out_size)?);
        }

        Ok(Self {
            layers,
            in_size,
            out_size,
            device: Device::default(),
        })
    }

    /// Performs one forward step through every layer.
    ///
    /// # Parameters
    ///
    /// - `hidden` - All layers' previous hidden states concatenated along the
    ///   feature axis, shape (batch, num_layers × out_size)
    /// - `input` - External input batch with shape (batch, in_size)
    ///
    /// # Returns
    ///
    /// - `Result<Array2<f32>, ModelError>` - All layers' next hidden states
    ///   concatenated along the feature axis, same shape convention as `hidden`
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the feature widths or batch sizes do not match
    pub fn forward(
        &mut self,
        hidden: &Array2<f32>,
        input: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        let num_layers = self.layers.len();
        validate_feature_width(hidden, num_layers * self.out_size, "stacked hidden state")?;

        let mut outputs: Vec<Array2<f32>> = Vec::with_capacity(num_layers);
        let mut current = input.clone();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            let h_slice = hidden
                .slice(s![.., i * self.out_size..(i + 1) * self.out_size])
                .to_owned();
            current = layer.forward(&h_slice, &current)?;
            outputs.push(current.clone());
        }

        let views: Vec<_> = outputs.iter().map(|h| h.view()).collect();
        concatenate(Axis(1), &views).map_err(|_| {
            ModelError::ProcessingError("Failed to concatenate layer outputs".to_string())
        })
    }

    /// Propagates a gradient back through the most recent forward step.
    ///
    /// Walks the stack from the top layer down, adding each layer's
    /// input-gradient to the output slice of the layer below.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - Gradient with respect to the concatenated outputs,
    ///   shape (batch, num_layers × out_size)
    ///
    /// # Returns
    ///
    /// - `Result<(Array2<f32>, Array2<f32>), ModelError>` - Gradients with respect to
    ///   the concatenated previous hidden states and to the external input
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If no forward step has been run since the last backward
    /// - `ModelError::InputValidationError` - If `grad_output` does not match the stacked width
    pub fn backward(
        &mut self,
        grad_output: &Array2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>), ModelError> {
        let num_layers = self.layers.len();
        validate_feature_width(grad_output, num_layers * self.out_size, "gradient")?;

        let mut grad_hidden_rev: Vec<Array2<f32>> = Vec::with_capacity(num_layers);
        let mut carry: Option<Array2<f32>> = None;
        for i in (0..num_layers).rev() {
            let mut grad_out_i = grad_output
                .slice(s![.., i * self.out_size..(i + 1) * self.out_size])
                .to_owned();
            if let Some(from_above) = carry.take() {
                grad_out_i = grad_out_i + from_above;
            }
            let (grad_hidden_i, grad_input_i) = self.layers[i].backward(&grad_out_i)?;
            grad_hidden_rev.push(grad_hidden_i);
            carry = Some(grad_input_i);
        }
        grad_hidden_rev.reverse();

        let grad_input = match carry {
            Some(grad) => grad,
            None => {
                return Err(ModelError::ProcessingError(
                    "Stack contains no layers".to_string(),
                ));
            }
        };
        let views: Vec<_> = grad_hidden_rev.iter().map(|g| g.view()).collect();
        let grad_hidden = concatenate(Axis(1), &views).map_err(|_| {
            ModelError::ProcessingError("Failed to concatenate hidden gradients".to_string())
        })?;

        Ok((grad_hidden, grad_input))
    }

    /// Updates every layer's parameters using SGD.
    ///
    /// # Parameters
    ///
    /// - `lr` - Learning rate
    pub fn update_parameters_sgd(&mut self, lr: f32) {
        for layer in &mut self.layers {
            layer.update_parameters_sgd(lr);
        }
    }

    /// Clears the accumulated gradients of every layer
    pub fn zero_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.zero_gradients();
        }
    }

    /// Moves every layer to the given device
    pub fn to_device(&mut self, device: Device) {
        for layer in &mut self.layers {
            layer.to_device(device);
        }
        self.device = device;
    }

    /// Moves the stack to the host CPU
    pub fn to_cpu(&mut self) {
        self.to_device(Device::Cpu);
    }

    /// Moves the stack to the given GPU device.
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If the crate was built without the `gpu` feature
    pub fn to_gpu(&mut self, device_id: usize) -> Result<(), ModelError> {
        let device = Device::try_gpu(device_id)?;
        self.to_device(device);
        Ok(())
    }

    /// Returns the device the stack's buffers are placed on
    pub fn get_device(&self) -> Device {
        self.device
    }

    /// Returns the number of stacked layers
    pub fn get_num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the dimension of the external input vector
    pub fn get_in_size(&self) -> usize {
        self.in_size
    }

    /// Returns the hidden dimension of every layer
    pub fn get_out_size(&self) -> usize {
        self.out_size
    }

    /// Returns a reference to the layer at the given index
    pub fn layer(&self, index: usize) -> Option<&GRU> {
        self.layers.get(index)
    }

    /// Returns a mutable reference to the layer at the given index
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut GRU> {
        self.layers.get_mut(index)
    }

    /// Returns the total number of trainable parameters in the stack
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.param_count()).sum()
    }
}
