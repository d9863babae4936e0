use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::error::{Error, Result};

/// Element types of the IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum IrDataType {
    #[strum(serialize = "DT_FLOAT16")]
    Float16,
    #[strum(serialize = "DT_FLOAT32")]
    Float32,
    #[strum(serialize = "DT_FLOAT64")]
    Float64,
    #[strum(serialize = "DT_INT16")]
    Int16,
    #[strum(serialize = "DT_INT32")]
    Int32,
    #[strum(serialize = "DT_INT64")]
    Int64,
    #[strum(serialize = "DT_UINT8")]
    Uint8,
    #[strum(serialize = "DT_UINT16")]
    Uint16,
}

/// Operation tags emitted for the supported layer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum OpKind {
    Conv,
    ConvTranspose,
    BatchNorm,
    Pool,
    FullyConnected,
    Add,
    DataInput,
}

/// Tensor shape; `-1` marks an unknown (batch) dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorShape {
    pub dims: Vec<i64>,
}

impl TensorShape {
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims }
    }
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
    Type(IrDataType),
    Ints(Vec<i64>),
    Strings(Vec<String>),
    Shape(TensorShape),
    Shapes(Vec<TensorShape>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&TensorShape> {
        match self {
            AttrValue::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shapes(&self) -> Option<&[TensorShape]> {
        match self {
            AttrValue::Shapes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<IrDataType> {
        match self {
            AttrValue::Type(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<IrDataType> for AttrValue {
    fn from(v: IrDataType) -> Self {
        AttrValue::Type(v)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::Ints(v)
    }
}

impl From<TensorShape> for AttrValue {
    fn from(v: TensorShape) -> Self {
        AttrValue::Shape(v)
    }
}

/// Node of the IR graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNode {
    pub name: String,
    pub op: String,
    /// Names of the producing IR nodes
    pub input: Vec<String>,
    pub attr: BTreeMap<String, AttrValue>,
}

impl IrNode {
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
            input: Vec::new(),
            attr: BTreeMap::new(),
        }
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.attr.insert(key.to_string(), value.into());
    }

    pub fn get_attr(&self, key: &str) -> Option<&AttrValue> {
        self.attr.get(key)
    }
}

/// Ordered collection of IR nodes.
///
/// Names are unique and a node may only reference nodes added before it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrGraph {
    nodes: Vec<IrNode>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl IrGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, checking name uniqueness and that its inputs already exist
    pub fn add_node(&mut self, node: IrNode) -> Result<()> {
        if self.names.contains(&node.name) {
            return Err(Error::InvalidGraph(format!(
                "Duplicate IR node name: {}",
                node.name
            )));
        }
        if let Some(missing) = node.input.iter().find(|input| !self.names.contains(*input)) {
            return Err(Error::InvalidGraph(format!(
                "IR node {} references {} before it is emitted",
                node.name, missing
            )));
        }

        self.names.insert(node.name.clone());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&IrNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn nodes(&self) -> &[IrNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pretty-printed JSON of the node list
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
