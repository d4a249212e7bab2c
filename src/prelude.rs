pub use crate::ModelError;
pub use crate::Tensor;
pub use crate::device::Device;
pub use crate::initializer::{Constant, GlorotUniform, Initializer, Orthogonal};
pub use crate::recurrent::{
    GRU, GRUWeight, LinearUnit, LinearUnitWeight, RecurrentCell, StackedGRU, StackedStatefulGRU,
    StatefulGRU,
};
