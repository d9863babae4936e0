use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::ir::{IrGraph, WeightStore};
use crate::model::SourceGraph;
use crate::ops::{convert_node, ConversionContext};
use crate::parser::graph_builder::GraphBuilder;
use crate::parser::model_loader::PaddleModelLoader;
use crate::parser::options::ParserOptions;
use crate::parser::parameters::ParameterStore;
use crate::parser::spec_table::SpecTable;
use crate::proto::ModelConfig;

/// Result of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    pub graph: IrGraph,
    pub weights: WeightStore,
    /// False when the run had no trained parameters and `weights` is empty
    pub weights_loaded: bool,
}

impl ConvertedModel {
    pub fn to_json(&self) -> Result<String> {
        self.graph.to_json()
    }

    /// Write the IR graph as pretty-printed JSON
    pub fn save_graph(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Converts a source network into the IR.
///
/// The source graph, spec table and parameters are fixed at construction;
/// `gen_ir` can be called any number of times and always starts from an empty IR.
pub struct PaddleParser {
    graph: SourceGraph,
    specs: SpecTable,
    parameters: ParameterStore,
    options: ParserOptions,
}

impl PaddleParser {
    pub fn new(graph: SourceGraph, specs: SpecTable, parameters: ParameterStore) -> Self {
        Self {
            graph,
            specs,
            parameters,
            options: ParserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the source graph and spec table from a parsed network configuration
    pub fn from_model_config(config: &ModelConfig, parameters: ParameterStore) -> Result<Self> {
        let graph = GraphBuilder::build_graph(config)?;
        let specs = SpecTable::from_model_config(config)?;
        Ok(Self::new(graph, specs, parameters))
    }

    /// Load a configuration file and, optionally, a parameter directory or archive
    pub fn load(config_path: &Path, weights_path: Option<&Path>) -> Result<Self> {
        let config = PaddleModelLoader::load_config(config_path)?;
        let parameters = match weights_path {
            Some(path) => PaddleModelLoader::load_parameters(path)?,
            None => {
                warn!("No weights given, converting the network structure only");
                ParameterStore::not_loaded()
            }
        };
        Self::from_model_config(&config, parameters)
    }

    pub fn src_graph(&self) -> &SourceGraph {
        &self.graph
    }

    pub fn specs(&self) -> &SpecTable {
        &self.specs
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn weights_loaded(&self) -> bool {
        self.parameters.weights_loaded()
    }

    /// Convert every layer in dependency order
    pub fn gen_ir(&self) -> Result<ConvertedModel> {
        let mut ctx = ConversionContext::new(&self.specs, &self.parameters, &self.options);

        for node in self.graph.topological_sort()? {
            convert_node(&mut ctx, node)?;
        }

        let (graph, weights) = ctx.finish();
        info!(
            "Converted {} layers into {} IR nodes and {} weight tensors",
            self.graph.len(),
            graph.len(),
            weights.len()
        );

        Ok(ConvertedModel {
            graph,
            weights,
            weights_loaded: self.weights_loaded(),
        })
    }
}
