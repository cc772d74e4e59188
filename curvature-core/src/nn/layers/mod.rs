pub mod linear;
pub mod relu;
pub mod selu;
pub mod view;

pub use linear::Linear;
pub use relu::ReLU;
pub use selu::SELU;
pub use view::{Flatten, View};
