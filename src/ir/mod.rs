//! Framework-neutral intermediate representation produced by the parser.

pub mod graph;
pub mod tensor;
pub mod weights;

pub use graph::{AttrValue, IrDataType, IrGraph, IrNode, OpKind, TensorShape};
pub use tensor::WeightTensor;
pub use weights::{WeightRole, WeightStore};
