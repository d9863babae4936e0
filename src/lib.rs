pub mod error;
pub mod ir;
pub mod layout;
pub mod logger;
pub mod model;
pub mod ops;
pub mod parser;
pub mod proto;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ir::{AttrValue, IrDataType, IrGraph, IrNode, OpKind, TensorShape, WeightRole, WeightStore, WeightTensor};
pub use model::{LayerMeta, SourceGraph, SourceNode};
pub use ops::{ConversionContext, LayerKind};
pub use parser::{
    ConvDispatch, ConvertedModel, GraphBuilder, PaddleModelLoader, PaddleParser, ParameterStore,
    ParserOptions, SpecTable,
};
