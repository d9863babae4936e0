use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Error, Result};
use crate::ir::IrNode;
use crate::model::SourceNode;
use crate::ops::ConversionContext;

/// Activations a layer may carry in its `active_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Activation {
    Relu,
    Softmax,
    Sigmoid,
    Tanh,
    Elu,
    #[strum(serialize = "relu6")]
    Relu6,
    Softplus,
    Softsign,
    HardSigmoid,
}

impl Activation {
    /// Parse a declared activation name
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::UnsupportedActivation(name.to_string()))
    }

    /// Op tag of the standalone activation node
    pub fn ir_op(&self) -> &'static str {
        match self {
            Activation::Relu => "Relu",
            Activation::Softmax => "Softmax",
            Activation::Sigmoid => "Sigmoid",
            Activation::Tanh => "Tanh",
            Activation::Elu => "Elu",
            Activation::Relu6 => "Relu6",
            Activation::Softplus => "Softplus",
            Activation::Softsign => "Softsign",
            Activation::HardSigmoid => "HardSigmoid",
        }
    }
}

/// Split a fused activation off `node` into its own IR node.
///
/// The new node is named `<current output>_activation` and reads the current output of
/// `node`. Afterwards every consumer of `node` is wired to the activation instead.
/// Returns the name of the emitted node.
pub fn defuse_activation(
    ctx: &mut ConversionContext<'_>,
    node: &SourceNode,
    active_type: &str,
) -> Result<String> {
    let activation = Activation::from_name(active_type)?;
    let current = ctx.current_output(&node.name);
    let name = format!("{}_activation", current);

    let mut ir_node = IrNode::new(name.clone(), activation.ir_op());
    ir_node.input.push(current);
    ctx.emit(ir_node)?;
    ctx.redirect(&node.name, name.clone());

    Ok(name)
}
