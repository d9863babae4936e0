pub mod graph_builder;
pub mod model_loader;
pub mod options;
pub mod paddle_parser;
pub mod parameters;
pub mod spec_table;

// Re-export key types from the parser module
pub use graph_builder::GraphBuilder;
pub use model_loader::PaddleModelLoader;
pub use options::{ConvDispatch, ParserOptions};
pub use paddle_parser::{ConvertedModel, PaddleParser};
pub use parameters::ParameterStore;
pub use spec_table::SpecTable;
