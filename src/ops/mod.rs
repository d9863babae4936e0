//! Per-layer conversion routines and the state they share.

pub mod activations;
pub mod data;
pub mod merge;
pub mod registry;
pub mod unknown;

pub mod nn {
    pub mod batch_norm;
    pub mod conv;
    pub mod fc;
    pub mod pool;
}

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ir::{AttrValue, IrDataType, IrGraph, IrNode, TensorShape, WeightRole, WeightStore, WeightTensor};
use crate::model::SourceNode;
use crate::parser::{ParameterStore, ParserOptions, SpecTable};
use crate::proto::LayerConfig;

pub use activations::{defuse_activation, Activation};
pub use registry::{convert_node, LayerKind};

/// Mutable state threaded through one conversion run.
///
/// Inputs (spec table, parameters, options) are borrowed and never change; the IR graph,
/// weight store and output redirects grow as nodes are converted.
pub struct ConversionContext<'a> {
    specs: &'a SpecTable,
    parameters: &'a ParameterStore,
    options: &'a ParserOptions,
    graph: IrGraph,
    weights: WeightStore,
    /// Source layer name -> IR node that now carries its output
    redirects: HashMap<String, String>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(specs: &'a SpecTable, parameters: &'a ParameterStore, options: &'a ParserOptions) -> Self {
        Self {
            specs,
            parameters,
            options,
            graph: IrGraph::new(),
            weights: WeightStore::new(),
            redirects: HashMap::new(),
        }
    }

    /// Configuration record of a source node
    pub fn spec(&self, node: &SourceNode) -> Result<&'a LayerConfig> {
        let specs = self.specs;
        specs.get(&node.name)
    }

    pub fn lookup_spec(&self, node: &SourceNode) -> Option<&'a LayerConfig> {
        let specs = self.specs;
        specs.lookup(&node.name)
    }

    pub fn options(&self) -> &'a ParserOptions {
        self.options
    }

    pub fn weights_loaded(&self) -> bool {
        self.parameters.weights_loaded()
    }

    /// Trained parameter by its declared name
    pub fn parameter(&self, name: &str) -> Result<&'a WeightTensor> {
        let parameters = self.parameters;
        parameters.get(name)
    }

    pub fn set_weight(&mut self, node: &str, role: WeightRole, tensor: WeightTensor) {
        self.weights.set_weight(node, role, tensor);
    }

    /// Name of the IR node currently producing `source_name`'s output
    pub fn current_output(&self, source_name: &str) -> String {
        self.redirects
            .get(source_name)
            .cloned()
            .unwrap_or_else(|| normalize_name(source_name))
    }

    /// Route later consumers of `source_name` to `output`
    pub fn redirect(&mut self, source_name: &str, output: String) {
        self.redirects.insert(source_name.to_string(), output);
    }

    /// Wire the IR node's inputs to the current outputs of the source node's producers
    pub fn convert_inedge(&self, node: &SourceNode, ir_node: &mut IrNode) {
        ir_node
            .input
            .extend(node.in_edges.iter().map(|input| self.current_output(input)));
    }

    /// Append a finished node to the IR graph
    pub fn emit(&mut self, node: IrNode) -> Result<()> {
        self.graph.add_node(node)
    }

    pub fn graph(&self) -> &IrGraph {
        &self.graph
    }

    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    pub fn finish(self) -> (IrGraph, WeightStore) {
        (self.graph, self.weights)
    }
}

/// Strip leading and trailing `_` from a source layer name
pub fn normalize_name(name: &str) -> String {
    name.trim_matches('_').to_string()
}

/// Map a source data type name onto the IR enumeration
pub fn source_dtype(name: &str) -> Result<IrDataType> {
    match name {
        "float16" => Ok(IrDataType::Float16),
        "float32" => Ok(IrDataType::Float32),
        "float64" => Ok(IrDataType::Float64),
        "int16" => Ok(IrDataType::Int16),
        "int32" => Ok(IrDataType::Int32),
        "int64" => Ok(IrDataType::Int64),
        "uint8" => Ok(IrDataType::Uint8),
        "uint16" => Ok(IrDataType::Uint16),
        other => Err(Error::UnsupportedDataType(other.to_string())),
    }
}

/// Start an IR node for `node`, optionally replacing its op tag.
///
/// The layer's data type, when it has one, is copied through `source_dtype`.
pub fn copy_and_reop(node: &SourceNode, new_op: Option<&str>) -> Result<IrNode> {
    let op = new_op.unwrap_or(&node.layer_type);
    let mut ir_node = IrNode::new(normalize_name(&node.name), op);

    if let Some(dtype) = &node.layer.dtype {
        ir_node.set_attr("dtype", source_dtype(dtype)?);
    }

    Ok(ir_node)
}

/// Record the node's output shape under `_output_shapes`
pub fn set_output_shape(ir_node: &mut IrNode, dims: Vec<i64>) {
    ir_node.set_attr("_output_shapes", AttrValue::Shapes(vec![TensorShape::new(dims)]));
}

/// Record a static shape under `shape`
pub fn copy_shape(ir_node: &mut IrNode, dims: Vec<i64>) {
    ir_node.set_attr("shape", TensorShape::new(dims));
}

/// Run activation de-fusion when the layer declares a non-linear activation
pub(crate) fn defuse_declared_activation(
    ctx: &mut ConversionContext<'_>,
    node: &SourceNode,
    spec: &LayerConfig,
) -> Result<()> {
    if let Some(active_type) = spec.declared_activation() {
        defuse_activation(ctx, node, active_type)?;
    }
    Ok(())
}
