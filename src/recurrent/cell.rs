use super::*;

/// Tagged variant over the four GRU cell kinds.
///
/// Calling code that drives a mixture of single and stacked, stateless and
/// stateful cells can hold them behind this one type and use a uniform
/// forward/state-management contract instead of branching on the concrete
/// type.
///
/// # Variants
///
/// - `Stateless` - A single [`GRU`] cell
/// - `Stateful` - A single [`StatefulGRU`] cell
/// - `StackedStateless` - A [`StackedGRU`] stack
/// - `StackedStateful` - A [`StackedStatefulGRU`] stack
///
/// # Examples
/// ```rust
/// use rustyrnn::recurrent::{RecurrentCell, StatefulGRU};
/// use ndarray::Array2;
///
/// let mut cell = RecurrentCell::Stateful(StatefulGRU::new(4, 3).unwrap());
/// let x = Array2::<f32>::ones((2, 4));
///
/// let h = cell.forward(None, &x).unwrap();
/// assert_eq!(h.shape(), &[2, 3]);
/// assert_eq!(cell.cell_type(), "StatefulGRU");
/// ```
pub enum RecurrentCell {
    Stateless(GRU),
    Stateful(StatefulGRU),
    StackedStateless(StackedGRU),
    StackedStateful(StackedStatefulGRU),
}

impl RecurrentCell {
    /// Performs one forward step with a uniform signature.
    ///
    /// Stateless variants require `hidden` (for stacks: the concatenated
    /// per-layer states). Stateful variants use their retained state; a
    /// provided `hidden` overrides it before the step, as with `set_state`.
    ///
    /// # Parameters
    ///
    /// - `hidden` - Previous hidden batch, required for stateless variants
    /// - `input` - Input batch
    ///
    /// # Returns
    ///
    /// - `Result<Array2<f32>, ModelError>` - The variant's forward result
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a stateless variant is called
    ///   without `hidden`, or if shapes do not match
    pub fn forward(
        &mut self,
        hidden: Option<&Array2<f32>>,
        input: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        match self {
            RecurrentCell::Stateless(cell) => {
                let hidden = require_hidden(hidden)?;
                cell.forward(hidden, input)
            }
            RecurrentCell::StackedStateless(stack) => {
                let hidden = require_hidden(hidden)?;
                stack.forward(hidden, input)
            }
            RecurrentCell::Stateful(cell) => {
                if let Some(hidden) = hidden {
                    cell.set_state(hidden.clone())?;
                }
                cell.forward(input)
            }
            RecurrentCell::StackedStateful(stack) => {
                if let Some(hidden) = hidden {
                    stack.set_state(hidden.clone())?;
                }
                stack.forward(input, None)
            }
        }
    }

    /// Overrides the retained state of a stateful variant.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If called on a stateless variant,
    ///   or if the hidden width does not match
    pub fn set_state(&mut self, hidden: Array2<f32>) -> Result<(), ModelError> {
        match self {
            RecurrentCell::Stateless(_) | RecurrentCell::StackedStateless(_) => {
                Err(ModelError::InputValidationError(
                    "Stateless cells retain no hidden state".to_string(),
                ))
            }
            RecurrentCell::Stateful(cell) => cell.set_state(hidden),
            RecurrentCell::StackedStateful(stack) => stack.set_state(hidden),
        }
    }

    /// Clears the retained state of a stateful variant; does nothing on a
    /// stateless variant, which retains no state to clear
    pub fn reset_state(&mut self) {
        match self {
            RecurrentCell::Stateless(_) | RecurrentCell::StackedStateless(_) => {}
            RecurrentCell::Stateful(cell) => cell.reset_state(),
            RecurrentCell::StackedStateful(stack) => stack.reset_state(),
        }
    }

    /// Returns `true` for the variants that retain hidden state across calls
    pub fn is_stateful(&self) -> bool {
        matches!(
            self,
            RecurrentCell::Stateful(_) | RecurrentCell::StackedStateful(_)
        )
    }

    /// Returns `true` for the stacked variants
    pub fn is_stacked(&self) -> bool {
        matches!(
            self,
            RecurrentCell::StackedStateless(_) | RecurrentCell::StackedStateful(_)
        )
    }

    /// Returns the name of the wrapped cell kind
    pub fn cell_type(&self) -> &str {
        match self {
            RecurrentCell::Stateless(_) => "GRU",
            RecurrentCell::Stateful(_) => "StatefulGRU",
            RecurrentCell::StackedStateless(_) => "StackedGRU",
            RecurrentCell::StackedStateful(_) => "StackedStatefulGRU",
        }
    }

    /// Moves the wrapped cell, including any retained states, to the given device
    pub fn to_device(&mut self, device: Device) {
        match self {
            RecurrentCell::Stateless(cell) => cell.to_device(device),
            RecurrentCell::Stateful(cell) => cell.to_device(device),
            RecurrentCell::StackedStateless(stack) => stack.to_device(device),
            RecurrentCell::StackedStateful(stack) => stack.to_device(device),
        }
    }

    /// Moves the wrapped cell to the host CPU
    pub fn to_cpu(&mut self) {
        self.to_device(Device::Cpu);
    }

    /// Moves the wrapped cell to the given GPU device.
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If the crate was built without the `gpu` feature
    pub fn to_gpu(&mut self, device_id: usize) -> Result<(), ModelError> {
        let device = Device::try_gpu(device_id)?;
        self.to_device(device);
        Ok(())
    }

    /// Returns the device the wrapped cell's buffers are placed on
    pub fn get_device(&self) -> Device {
        match self {
            RecurrentCell::Stateless(cell) => cell.get_device(),
            RecurrentCell::Stateful(cell) => cell.get_device(),
            RecurrentCell::StackedStateless(stack) => stack.get_device(),
            RecurrentCell::StackedStateful(stack) => stack.get_device(),
        }
    }
}

fn require_hidden(hidden: Option<&Array2<f32>>) -> Result<&Array2<f32>, ModelError> {
    hidden.ok_or_else(|| {
        ModelError::InputValidationError(
            "A stateless cell requires the previous hidden state".to_string(),
        )
    })
}
