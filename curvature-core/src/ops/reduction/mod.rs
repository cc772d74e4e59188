pub mod sum;

pub use sum::{sum_all_op, sum_dim_op};
