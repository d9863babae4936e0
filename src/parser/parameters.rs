use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ir::WeightTensor;

/// Trained parameters addressed by their declared parameter name.
///
/// A store built without a weights file reports `weights_loaded() == false`; conversion
/// then emits nodes and attributes but no weight tensors.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    params: HashMap<String, WeightTensor>,
    loaded: bool,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// Empty store that counts as loaded; fill it with `insert`.
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            loaded: true,
        }
    }

    /// Store standing in for a weights file that could not be read
    pub fn not_loaded() -> Self {
        Self {
            params: HashMap::new(),
            loaded: false,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, tensor: WeightTensor) {
        self.params.insert(name.into(), tensor);
    }

    pub fn with_parameter(mut self, name: impl Into<String>, tensor: impl Into<WeightTensor>) -> Self {
        self.insert(name, tensor.into());
        self
    }

    pub fn get(&self, name: &str) -> Result<&WeightTensor> {
        self.params
            .get(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn weights_loaded(&self) -> bool {
        self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_lookup_by_name() {
        let store = ParameterStore::new()
            .with_parameter("_fc1.w0", ArrayD::<f32>::zeros(IxDyn(&[4, 2])));

        assert!(store.weights_loaded());
        assert_eq!(store.get("_fc1.w0").unwrap().shape(), &[4, 2]);
        assert!(matches!(store.get("_fc1.wbias"), Err(Error::MissingParameter(_))));
    }

    #[test]
    fn test_degraded_store() {
        let store = ParameterStore::not_loaded();
        assert!(!store.weights_loaded());
        assert!(store.is_empty());
    }
}
