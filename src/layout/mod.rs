pub mod padding;
pub mod tensor_layout;

pub use padding::{infer_auto_pad, symmetric_pads, tf_pads_to_onnx, AutoPad, AxisExtent};
pub use tensor_layout::{TensorLayout, OIHW_TO_HWIO};
