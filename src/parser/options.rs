use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How convolution layers choose between `Conv` and `ConvTranspose`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvDispatch {
    /// Deconvolution type tags (`exconvt`, `cudnn_convt`) become `ConvTranspose`
    ByTypeTag,
    /// Every convolution becomes `Conv`, matching models converted by the legacy tool
    AlwaysConv,
}

impl Default for ConvDispatch {
    fn default() -> Self {
        ConvDispatch::ByTypeTag
    }
}

/// Options controlling IR generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Convolution op selection
    pub conv_dispatch: ConvDispatch,
    /// Shape recorded on data input nodes, channel-last
    pub data_input_shape: Vec<i64>,
    /// Derive the data input shape from the layer's declared height, width and size
    pub infer_data_shape: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            conv_dispatch: ConvDispatch::ByTypeTag,
            data_input_shape: vec![-1, 224, 224, 3],
            infer_data_shape: false,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the convolution dispatch rule
    pub fn set_conv_dispatch(mut self, dispatch: ConvDispatch) -> Self {
        self.conv_dispatch = dispatch;
        self
    }

    /// Set the fixed data input shape
    pub fn set_data_input_shape(mut self, shape: Vec<i64>) -> Self {
        self.data_input_shape = shape;
        self
    }

    /// Enable or disable data shape inference
    pub fn infer_data_shape(mut self, enable: bool) -> Self {
        self.infer_data_shape = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.conv_dispatch, ConvDispatch::ByTypeTag);
        assert_eq!(options.data_input_shape, vec![-1, 224, 224, 3]);
        assert!(!options.infer_data_shape);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = ParserOptions::from_json_str(r#"{ "conv_dispatch": "always_conv" }"#).unwrap();
        assert_eq!(options.conv_dispatch, ConvDispatch::AlwaysConv);
        assert_eq!(options.data_input_shape, vec![-1, 224, 224, 3]);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let options = ParserOptions::new()
            .set_data_input_shape(vec![-1, 32, 32, 1])
            .infer_data_shape(true);
        fs::write(&path, serde_json::to_string(&options).unwrap()).unwrap();

        assert_eq!(ParserOptions::from_json_file(&path).unwrap(), options);
    }
}
