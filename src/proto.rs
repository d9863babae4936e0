//! Protobuf messages of the network configuration export.
//!
//! These mirror the subset of the framework's `ModelConfig.proto` that the parser reads.
//! Proto2 optional fields decode to `Option<T>`, so "field present" is simply
//! `is_some()`; declared defaults are reachable through the accessor methods prost
//! generates (e.g. `ConvConfig::dilation()`).

/// Whole-network configuration: every layer plus its parameter declarations
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelConfig {
    #[prost(string, optional, tag = "1", default = "nn")]
    pub r#type: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub layers: Vec<LayerConfig>,
    #[prost(message, repeated, tag = "3")]
    pub parameters: Vec<ParameterConfig>,
    #[prost(string, repeated, tag = "4")]
    pub input_layer_names: Vec<String>,
    #[prost(string, repeated, tag = "5")]
    pub output_layer_names: Vec<String>,
}

/// Per-layer configuration record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LayerConfig {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(string, required, tag = "2")]
    pub r#type: String,
    #[prost(uint64, optional, tag = "3")]
    pub size: Option<u64>,
    #[prost(string, optional, tag = "4")]
    pub active_type: Option<String>,
    #[prost(message, repeated, tag = "5")]
    pub inputs: Vec<LayerInputConfig>,
    #[prost(string, optional, tag = "6")]
    pub bias_parameter_name: Option<String>,
    #[prost(uint32, optional, tag = "7")]
    pub num_filters: Option<u32>,
    #[prost(uint64, optional, tag = "50")]
    pub height: Option<u64>,
    #[prost(uint64, optional, tag = "51")]
    pub width: Option<u64>,
    #[prost(double, optional, tag = "58", default = "0.00001")]
    pub epsilon: Option<f64>,
}

/// One input slot of a layer: the producing layer, its parameter, and geometry blocks
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LayerInputConfig {
    #[prost(string, required, tag = "1")]
    pub input_layer_name: String,
    #[prost(string, optional, tag = "2")]
    pub input_parameter_name: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub conv_conf: Option<ConvConfig>,
    #[prost(message, optional, tag = "4")]
    pub pool_conf: Option<PoolConfig>,
}

/// Convolution geometry. `*_y` fields are absent for square kernels.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConvConfig {
    #[prost(uint32, required, tag = "1")]
    pub filter_size: u32,
    #[prost(uint32, required, tag = "2")]
    pub channels: u32,
    #[prost(uint32, required, tag = "3")]
    pub stride: u32,
    #[prost(uint32, required, tag = "4")]
    pub padding: u32,
    #[prost(uint32, required, tag = "5")]
    pub groups: u32,
    #[prost(uint32, required, tag = "6")]
    pub filter_channels: u32,
    #[prost(uint32, required, tag = "7")]
    pub output_x: u32,
    #[prost(uint32, required, tag = "8")]
    pub img_size: u32,
    #[prost(bool, optional, tag = "9", default = "true")]
    pub caffe_mode: Option<bool>,
    #[prost(uint32, optional, tag = "10")]
    pub filter_size_y: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub padding_y: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub stride_y: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub output_y: Option<u32>,
    #[prost(uint32, optional, tag = "14")]
    pub img_size_y: Option<u32>,
    #[prost(uint32, optional, tag = "15", default = "1")]
    pub dilation: Option<u32>,
    #[prost(uint32, optional, tag = "16", default = "1")]
    pub dilation_y: Option<u32>,
}

/// Pooling geometry
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PoolConfig {
    #[prost(string, required, tag = "1")]
    pub pool_type: String,
    #[prost(uint32, required, tag = "2")]
    pub channels: u32,
    #[prost(uint32, required, tag = "3")]
    pub size_x: u32,
    #[prost(uint32, optional, tag = "4")]
    pub start: Option<u32>,
    #[prost(uint32, required, tag = "5")]
    pub stride: u32,
    #[prost(uint32, required, tag = "6")]
    pub output_x: u32,
    #[prost(uint32, required, tag = "7")]
    pub img_size: u32,
    #[prost(uint32, optional, tag = "8", default = "0")]
    pub padding: Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub size_y: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub stride_y: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub output_y: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub img_size_y: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub padding_y: Option<u32>,
}

/// Parameter declaration; `dims` is empty when only the flat size is known
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ParameterConfig {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(uint64, required, tag = "2")]
    pub size: u64,
    #[prost(uint64, repeated, packed = "false", tag = "8")]
    pub dims: Vec<u64>,
}

impl LayerConfig {
    /// Activation declared on the layer, if any. The linear activation is the empty string.
    pub fn declared_activation(&self) -> Option<&str> {
        match self.active_type.as_deref() {
            Some(act) if !act.is_empty() => Some(act),
            _ => None,
        }
    }

    /// Parameter name bound to the `index`-th input
    pub fn input_parameter(&self, index: usize) -> Option<&str> {
        self.inputs
            .get(index)
            .and_then(|input| input.input_parameter_name.as_deref())
    }
}
