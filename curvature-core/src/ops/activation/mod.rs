pub mod relu;
pub mod selu;

pub use relu::relu_op;
pub use selu::{selu_op, selu_with_op, SELU_ALPHA, SELU_SCALE};
