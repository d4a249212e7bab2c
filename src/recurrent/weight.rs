use super::*;

/// Borrowed view of a single linear unit's weights
///
/// # Fields
///
/// - `kernel` - Weight matrix with shape (input_dim, units)
/// - `bias` - Optional bias with shape (1, units)
pub struct LinearUnitWeight<'a> {
    pub kernel: &'a Array2<f32>,
    pub bias: Option<&'a Array2<f32>>,
}

/// Borrowed view of all six projection units of a GRU cell.
///
/// The `*_input` units project the input vector x and the `*_recurrent`
/// units project the previous hidden vector h.
///
/// # Fields
///
/// - `reset_input` - W_r, input projection of the reset gate
/// - `reset_recurrent` - U_r, recurrent projection of the reset gate
/// - `update_input` - W_z, input projection of the update gate
/// - `update_recurrent` - U_z, recurrent projection of the update gate
/// - `candidate_input` - W, input projection of the candidate state
/// - `candidate_recurrent` - U, recurrent projection of the candidate state
pub struct GRUWeight<'a> {
    pub reset_input: LinearUnitWeight<'a>,
    pub reset_recurrent: LinearUnitWeight<'a>,
    pub update_input: LinearUnitWeight<'a>,
    pub update_recurrent: LinearUnitWeight<'a>,
    pub candidate_input: LinearUnitWeight<'a>,
    pub candidate_recurrent: LinearUnitWeight<'a>,
}
