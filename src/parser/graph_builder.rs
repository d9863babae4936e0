use log::debug;

use crate::error::Result;
use crate::model::{SourceGraph, SourceNode};
use crate::proto::ModelConfig;

/// Graph builder responsible for constructing the source graph from a network config
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build the source graph; edges follow each layer's declared inputs
    pub fn build_graph(config: &ModelConfig) -> Result<SourceGraph> {
        let nodes = Self::create_nodes(config);
        let graph = SourceGraph::new(nodes)?;
        debug!("Built source graph with {} layers", graph.len());
        Ok(graph)
    }

    /// Create one node per configured layer, in declaration order.
    ///
    /// A layer may list the same producer in several input slots (batch norm binds its
    /// statistics that way); each producer becomes a single edge.
    pub fn create_nodes(config: &ModelConfig) -> Vec<SourceNode> {
        config
            .layers
            .iter()
            .map(|layer| {
                let mut producers: Vec<&str> = Vec::with_capacity(layer.inputs.len());
                for input in &layer.inputs {
                    if !producers.contains(&input.input_layer_name.as_str()) {
                        producers.push(&input.input_layer_name);
                    }
                }
                SourceNode::new(layer.name.clone(), Self::graph_type_tag(&layer.r#type))
                    .with_inputs(producers)
            })
            .collect()
    }

    /// Map a configured layer type to the tag that selects its conversion routine.
    ///
    /// All convolution flavours share the "conv" routine, which re-reads the exact type
    /// from the layer config to pick the op.
    pub fn graph_type_tag(config_type: &str) -> &str {
        match config_type {
            "exconv" | "cudnn_conv" | "exconvt" | "cudnn_convt" => "conv",
            "cudnn_batch_norm" => "batch_norm",
            other => other,
        }
    }
}
