use super::*;

/// Validates that a dimension value is greater than 0
///
/// # Parameters
///
/// - `value` - The dimension value to validate
/// - `name` - The name of the dimension for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_dimension_greater_than_zero(
    value: usize,
    name: &str,
) -> Result<(), ModelError> {
    if value == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Validates input and hidden dimensions for recurrent cells
///
/// # Parameters
///
/// - `n_inputs` - The input dimension to validate
/// - `n_units` - The hidden dimension to validate
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_recurrent_dimensions(
    n_inputs: usize,
    n_units: usize,
) -> Result<(), ModelError> {
    validate_dimension_greater_than_zero(n_inputs, "n_inputs")?;
    validate_dimension_greater_than_zero(n_units, "n_units")?;
    Ok(())
}

/// Validates that a stack is built with at least one layer
///
/// # Parameters
///
/// - `num_layers` - The requested number of layers
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_num_layers(num_layers: usize) -> Result<(), ModelError> {
    if num_layers < 1 {
        return Err(ModelError::InputValidationError(format!(
            "num_layers must be at least 1, got {}",
            num_layers
        )));
    }
    Ok(())
}

/// Validates that a batch of vectors has the expected feature width
///
/// # Parameters
///
/// - `array` - The batch to validate, shape (batch, features)
/// - `expected` - The expected feature width
/// - `what` - Name of the batch for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_feature_width(
    array: &Array2<f32>,
    expected: usize,
    what: &str,
) -> Result<(), ModelError> {
    if array.ncols() != expected {
        return Err(ModelError::InputValidationError(format!(
            "Expected {} with {} features, got {}",
            what,
            expected,
            array.ncols()
        )));
    }
    Ok(())
}

/// Validates that the hidden state and the input carry the same batch size
///
/// # Parameters
///
/// - `hidden_batch` - Batch size of the hidden state
/// - `input_batch` - Batch size of the input
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_batch_match(
    hidden_batch: usize,
    input_batch: usize,
) -> Result<(), ModelError> {
    if hidden_batch != input_batch {
        return Err(ModelError::InputValidationError(format!(
            "Hidden state batch size ({}) does not match input batch size ({})",
            hidden_batch, input_batch
        )));
    }
    Ok(())
}
