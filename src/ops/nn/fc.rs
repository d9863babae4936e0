use crate::error::{Error, Result};
use crate::ir::{OpKind, WeightRole};
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, defuse_declared_activation, ConversionContext};

/// Fully-connected layer. Weights are stored exactly as loaded.
pub fn convert_fc(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let spec = ctx.spec(node)?;
    let mut ir_node = copy_and_reop(node, Some(OpKind::FullyConnected.as_ref()))?;
    ctx.convert_inedge(node, &mut ir_node);

    let units = spec
        .size
        .ok_or_else(|| Error::MissingField(format!("{}: size", node.name)))?;
    let bias_name = spec.bias_parameter_name.as_deref();

    ir_node.set_attr("units", units as i64);
    ir_node.set_attr("use_bias", bias_name.is_some());

    if ctx.weights_loaded() {
        let weight_name = spec
            .input_parameter(0)
            .ok_or_else(|| Error::MissingField(format!("{}: input_parameter_name", node.name)))?;
        let weights = ctx.parameter(weight_name)?.clone();
        let bias = bias_name.map(|name| ctx.parameter(name)).transpose()?.cloned();

        ctx.set_weight(&ir_node.name, WeightRole::Weights, weights);
        if let Some(bias) = bias {
            ctx.set_weight(&ir_node.name, WeightRole::Bias, bias);
        }
    }

    ctx.emit(ir_node)?;
    defuse_declared_activation(ctx, node, spec)
}
