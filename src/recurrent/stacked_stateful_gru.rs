use super::*;
use ndarray::s;

/// Stacked stateful Gated Recurrent Unit cells.
///
/// An ordered sequence of [`StatefulGRU`] cells, each independently owning
/// its hidden state. Layer 0 consumes the external input and every further
/// layer consumes the output of the layer below it; every layer's state
/// updates on each call exactly as a single stateful cell does.
///
/// `forward` returns the concatenation of the outputs of the top `top_n`
/// layers (the layers closest to the output end), in layer order; by default
/// all layers are returned.
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::StackedStatefulGRU;
/// use ndarray::Array2;
///
/// let mut stack = StackedStatefulGRU::new(4, 3, 2).unwrap();
/// let x = Array2::<f32>::ones((2, 4));
///
/// let all = stack.forward(&x, None).unwrap();
/// assert_eq!(all.shape(), &[2, 6]);
///
/// let top = stack.forward(&x, Some(1)).unwrap();
/// assert_eq!(top.shape(), &[2, 3]);
/// ```
pub struct StackedStatefulGRU {
    layers: Vec<StatefulGRU>,
    in_size: usize,
    out_size: usize,
    device: Device,
}

impl StackedStatefulGRU {
    /// Creates a stack of stateful GRU cells with default initialization and
    /// absent states.
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
        layers.push(StatefulGRU::new(in_size, out_size)?);
        for _ in 1..num_layers {
            layers.push(StatefulGRU::new(out_size, out_size)?);
        }

        Ok(Self {
            layers,
            in_size,
            out_size,
            device: Device::default(),
        })
    }

    /// Performs one forward step through every layer, updating every layer's
    /// retained state.
    ///
    /// # Parameters
    ///
    /// - `input` - External input batch with shape (batch, in_size)
    /// - `top_n` - Number of layers from the top whose outputs are returned;
    ///   `None` returns all layers
    ///
    /// # Returns
    ///
    /// - `Result<Array2<f32>, ModelError>` - The top `top_n` layers' outputs
    ///   concatenated along the feature axis, in layer order
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the input width does not match,
    ///   or if `top_n` is 0 or exceeds the number of layers
    pub fn forward(
        &mut self,
        input: &Array2<f32>,
        top_n: Option<usize>,
    ) -> Result<Array2<f32>, ModelError> {
        let num_layers = self.layers.len();
        let top_n = top_n.unwrap_or(num_layers);
        if top_n < 1 || top_n > num_layers {
            return Err(ModelError::InputValidationError(format!(
                "top_n must be between 1 and the number of layers ({}), got {}",
                num_layers, top_n
            )));
        }

        let mut outputs: Vec<Array2<f32>> = Vec::with_capacity(num_layers);
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
            outputs.push(current.clone());
        }

        let views: Vec<_> = outputs[num_layers - top_n..]
            .iter()
            .map(|h| h.view())
            .collect();
        concatenate(Axis(1), &views).map_err(|_| {
            ModelError::ProcessingError("Failed to concatenate layer outputs".to_string())
        })
    }

    /// Overrides every layer's retained state from one concatenated tensor.
    ///
    /// The tensor is split into equal per-layer slices along the feature
    /// axis, in layer order.
    ///
    /// # Parameters
    ///
    /// - `hidden` - All layers' states concatenated, shape (batch, num_layers × out_size)
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the hidden width does not match the stacked width
    pub fn set_state(&mut self, hidden: Array2<f32>) -> Result<(), ModelError> {
        let num_layers = self.layers.len();
        validate_feature_width(&hidden, num_layers * self.out_size, "stacked hidden state")?;

        for (i, layer) in self.layers.iter_mut().enumerate() {
            let slice = hidden
                .slice(s![.., i * self.out_size..(i + 1) * self.out_size])
                .to_owned();
            layer.set_state(slice)?;
        }
        Ok(())
    }

    /// Clears every layer's retained state to absent
    pub fn reset_state(&mut self) {
        for layer in &mut self.layers {
            layer.reset_state();
        }
    }

    /// Moves every layer, including any retained states, to the given device
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
    pub fn layer(&self, index: usize) -> Option<&StatefulGRU> {
        self.layers.get(index)
    }

    /// Returns a mutable reference to the layer at the given index
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut StatefulGRU> {
        self.layers.get_mut(index)
    }

    /// Returns the total number of trainable parameters in the stack
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.param_count()).sum()
    }
}
