pub mod gt;
pub mod where_op;

pub use gt::gt_op;
pub use where_op::where_op;
