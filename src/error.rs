/// Error types that can occur during initializer and cell operations
///
/// # Variants
///
/// - `InputValidationError` - indicates the input data or configuration provided does not meet the expected shape, range, or validation rules
/// - `ProcessingError` - indicates that an internal computation failed or was invoked in an invalid order
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InputValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

/// Implements the standard error trait for ModelError
impl std::error::Error for ModelError {}
