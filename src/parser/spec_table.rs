use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::proto::{LayerConfig, ModelConfig};

/// Immutable lookup from layer name to its configuration record.
///
/// Built once from the network configuration and shared by reference with every
/// conversion routine.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    specs: HashMap<String, LayerConfig>,
}

impl SpecTable {
    pub fn from_model_config(config: &ModelConfig) -> Result<Self> {
        Self::from_layers(config.layers.iter().cloned())
    }

    /// Build from layer records; duplicate layer names are rejected
    pub fn from_layers<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = LayerConfig>,
    {
        let mut specs = HashMap::new();
        for layer in layers {
            if specs.contains_key(&layer.name) {
                return Err(Error::InvalidConfig(format!(
                    "Layer {} is declared more than once",
                    layer.name
                )));
            }
            specs.insert(layer.name.clone(), layer);
        }
        Ok(Self { specs })
    }

    pub fn get(&self, name: &str) -> Result<&LayerConfig> {
        self.lookup(name)
            .ok_or_else(|| Error::MissingSpec(name.to_string()))
    }

    pub fn lookup(&self, name: &str) -> Option<&LayerConfig> {
        self.specs.get(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
