use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};

/// Framework layer metadata carried on the lightweight graph node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerMeta {
    /// Data type name as reported by the layer object (e.g. "float32")
    pub dtype: Option<String>,
    /// Concatenation axis, for layers that expose one
    pub axis: Option<i64>,
}

/// One layer instance in the source network
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub name: String,
    /// Type tag used to select the conversion routine (e.g. "conv", "pool")
    pub layer_type: String,
    pub layer: LayerMeta,
    /// Names of the producing layers, in input-slot order
    pub in_edges: Vec<String>,
    /// Names of the consuming layers
    pub out_edges: Vec<String>,
}

impl SourceNode {
    pub fn new(name: impl Into<String>, layer_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer_type: layer_type.into(),
            layer: LayerMeta::default(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.in_edges = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dtype(mut self, dtype: impl Into<String>) -> Self {
        self.layer.dtype = Some(dtype.into());
        self
    }

    pub fn with_axis(mut self, axis: i64) -> Self {
        self.layer.axis = Some(axis);
        self
    }
}

/// Source network as a directed graph, edges pointing from producer to consumer
#[derive(Debug, Clone)]
pub struct SourceGraph {
    graph: DiGraph<SourceNode, ()>,
    index: HashMap<String, NodeIndex>,
}

impl SourceGraph {
    /// Build the graph from nodes whose `in_edges` name other nodes of the set.
    /// `out_edges` are recomputed from the in-edges.
    pub fn new(nodes: Vec<SourceNode>) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());

        for mut node in nodes {
            if index.contains_key(&node.name) {
                return Err(Error::InvalidGraph(format!(
                    "Duplicate layer name: {}",
                    node.name
                )));
            }
            node.out_edges.clear();
            let name = node.name.clone();
            let idx = graph.add_node(node);
            index.insert(name, idx);
        }

        let mut edges = Vec::new();
        for consumer in graph.node_indices() {
            for input in &graph[consumer].in_edges {
                let producer = index.get(input).ok_or_else(|| {
                    Error::InvalidGraph(format!(
                        "Layer {} consumes unknown layer {}",
                        graph[consumer].name, input
                    ))
                })?;
                edges.push((*producer, consumer));
            }
        }

        for (producer, consumer) in edges {
            let consumer_name = graph[consumer].name.clone();
            graph[producer].out_edges.push(consumer_name);
            graph.add_edge(producer, consumer, ());
        }

        Ok(Self { graph, index })
    }

    /// Look up a node by layer name
    pub fn get_node(&self, name: &str) -> Option<&SourceNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Nodes ordered so that every producer precedes its consumers
    pub fn topological_sort(&self) -> Result<Vec<&SourceNode>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            Error::InvalidGraph(format!(
                "Graph contains a cycle through layer {}",
                self.graph[cycle.node_id()].name
            ))
        })?;

        Ok(order.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &SourceNode> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
