use std::collections::HashMap;

use strum_macros::{AsRefStr, Display, EnumString};

use crate::ir::tensor::WeightTensor;

/// Role a tensor plays for its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum WeightRole {
    Weights,
    Bias,
    Scale,
    Mean,
    Var,
}

/// Learned tensors keyed by (IR node name, role)
#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    weights: HashMap<String, HashMap<WeightRole, WeightTensor>>,
}

impl WeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a tensor with a node; a later call for the same key replaces it
    pub fn set_weight(&mut self, node: &str, role: WeightRole, tensor: WeightTensor) {
        self.weights
            .entry(node.to_string())
            .or_insert_with(HashMap::new)
            .insert(role, tensor);
    }

    pub fn get(&self, node: &str, role: WeightRole) -> Option<&WeightTensor> {
        self.weights.get(node).and_then(|roles| roles.get(&role))
    }

    pub fn contains(&self, node: &str, role: WeightRole) -> bool {
        self.get(node, role).is_some()
    }

    /// Roles stored for a node, sorted by name
    pub fn roles(&self, node: &str) -> Vec<WeightRole> {
        let mut roles: Vec<WeightRole> = self
            .weights
            .get(node)
            .map(|roles| roles.keys().copied().collect())
            .unwrap_or_default();
        roles.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        roles
    }

    /// Names of nodes that own at least one tensor
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// Total number of stored tensors
    pub fn len(&self) -> usize {
        self.weights.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
