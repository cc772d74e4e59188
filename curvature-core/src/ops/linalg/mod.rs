pub mod einsum;
pub mod matmul;

pub use einsum::einsum_op;
pub use matmul::matmul_op;
