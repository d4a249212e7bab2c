use crate::error::ModelError;

/// Placement of a parameter-owning object's buffers.
///
/// Every linear unit, cell and stack in this crate carries a `Device` value
/// recording where its arrays live. Transfer operations on cells and stacks
/// move the whole object at once: parameters, gradient accumulators and any
/// retained hidden state.
///
/// The `Gpu` variant is only available when the crate is built with the
/// `gpu` cargo feature; without it every object stays on [`Device::Cpu`] and
/// `to_gpu` requests fail with [`ModelError::ProcessingError`].
///
/// # Examples
/// ```rust
/// use rustyrnn::device::Device;
///
/// let device = Device::default();
/// assert!(device.is_cpu());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    #[default]
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu(usize),
}

impl Device {
    /// Returns `true` if this placement is the host CPU
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Returns `true` if this placement is an accelerator device
    #[cfg(feature = "gpu")]
    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Gpu(_))
    }

    /// Returns the numeric id of the device (0 for the CPU)
    pub fn id(&self) -> usize {
        match self {
            Device::Cpu => 0,
            #[cfg(feature = "gpu")]
            Device::Gpu(id) => *id,
        }
    }

    /// Tries to create a GPU placement with the specified device id.
    ///
    /// # Parameters
    ///
    /// - `device_id` - Index of the accelerator device
    ///
    /// # Returns
    ///
    /// - `Ok(Device)` - A GPU placement when the crate is built with the `gpu` feature
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - If the crate was built without GPU support
    #[cfg(feature = "gpu")]
    pub fn try_gpu(device_id: usize) -> Result<Self, ModelError> {
        Ok(Device::Gpu(device_id))
    }

    /// Tries to create a GPU placement with the specified device id.
    ///
    /// This build carries no GPU support, so the request always fails.
    ///
    /// # Errors
    ///
    /// - `ModelError::ProcessingError` - Always; the crate was built without the `gpu` feature
    #[cfg(not(feature = "gpu"))]
    pub fn try_gpu(device_id: usize) -> Result<Self, ModelError> {
        Err(ModelError::ProcessingError(format!(
            "Cannot place on GPU {}: crate was built without the `gpu` feature",
            device_id
        )))
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            #[cfg(feature = "gpu")]
            Device::Gpu(id) => write!(f, "gpu:{}", id),
        }
    }
}
