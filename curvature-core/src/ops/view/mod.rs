pub mod expand;
pub mod index_select;
pub mod reshape;
pub mod transpose;

pub use expand::expand_dim_op;
pub use index_select::{index_add_op, index_select_op};
pub use reshape::reshape_op;
pub use transpose::transpose_op;
