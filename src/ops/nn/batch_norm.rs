use ndarray::{ArrayD, IxDyn, Zip};
use num_traits::Float;

use crate::error::{Error, Result};
use crate::ir::{OpKind, WeightRole, WeightTensor};
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, defuse_declared_activation, ConversionContext};

/// Variance written in place of the running variance once folded
pub const FOLDED_VARIANCE: f32 = 1.0 - 1e-5;

/// Fold the running statistics into the affine parameters.
///
/// With `f = 1 / sqrt(variance + epsilon)` returns `(gamma * f, beta - gamma * mean * f)`.
pub fn fold_batch_norm<T: Float>(
    gamma: &ArrayD<T>,
    beta: &ArrayD<T>,
    mean: &ArrayD<T>,
    variance: &ArrayD<T>,
    epsilon: T,
) -> Result<(ArrayD<T>, ArrayD<T>)> {
    for (label, other) in [("beta", beta), ("mean", mean), ("variance", variance)] {
        if other.shape() != gamma.shape() {
            return Err(Error::ShapeMismatch(format!(
                "batch norm {} has shape {:?}, gamma has {:?}",
                label,
                other.shape(),
                gamma.shape()
            )));
        }
    }

    let factor = variance.mapv(|v| T::one() / (v + epsilon).sqrt());
    let scale = gamma * &factor;
    let mut bias = beta.clone();
    Zip::from(&mut bias)
        .and(&scale)
        .and(mean)
        .for_each(|b, &s, &m| *b = *b - s * m);

    Ok((scale, bias))
}

pub fn convert_batch_norm(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let spec = ctx.spec(node)?;
    let mut ir_node = copy_and_reop(node, Some(OpKind::BatchNorm.as_ref()))?;
    ctx.convert_inedge(node, &mut ir_node);

    let use_scale = true;
    let use_bias = spec.bias_parameter_name.is_some();
    let epsilon = spec.epsilon();

    ir_node.set_attr("scale", use_scale);
    ir_node.set_attr("bias", use_bias);
    ir_node.set_attr("axis", -1i64);
    ir_node.set_attr("epsilon", epsilon as f32);

    if ctx.weights_loaded() {
        let gamma_tensor = input_tensor(ctx, node, 0)?;
        let mean_tensor = input_tensor(ctx, node, 1)?;
        let var_tensor = input_tensor(ctx, node, 2)?;
        let beta_tensor = spec
            .bias_parameter_name
            .as_deref()
            .map(|name| ctx.parameter(name))
            .transpose()?;

        let gamma = flatten(gamma_tensor)?;
        let beta = match beta_tensor {
            Some(tensor) => flatten(tensor)?,
            None => ArrayD::zeros(gamma.raw_dim()),
        };
        let (scale, bias) = fold_batch_norm(
            &gamma,
            &beta,
            &flatten(mean_tensor)?,
            &flatten(var_tensor)?,
            epsilon,
        )?;

        let name = ir_node.name.clone();
        let affine_shape = IxDyn(gamma_tensor.shape());
        if use_scale {
            let scale = scale.mapv(|v| v as f32).into_shape(affine_shape.clone())?;
            ctx.set_weight(&name, WeightRole::Scale, WeightTensor::Float32(scale));
        }
        if use_bias {
            let bias = bias.mapv(|v| v as f32).into_shape(affine_shape)?;
            ctx.set_weight(&name, WeightRole::Bias, WeightTensor::Float32(bias));
        }
        ctx.set_weight(
            &name,
            WeightRole::Mean,
            WeightTensor::Float32(ArrayD::zeros(IxDyn(mean_tensor.shape()))),
        );
        ctx.set_weight(
            &name,
            WeightRole::Var,
            WeightTensor::Float32(ArrayD::from_elem(IxDyn(var_tensor.shape()), FOLDED_VARIANCE)),
        );
    }

    ctx.emit(ir_node)?;
    defuse_declared_activation(ctx, node, spec)
}

/// Parameter bound to the `index`-th input: gamma, running mean, running variance
fn input_tensor<'a>(
    ctx: &ConversionContext<'a>,
    node: &SourceNode,
    index: usize,
) -> Result<&'a WeightTensor> {
    let spec = ctx.spec(node)?;
    let name = spec.input_parameter(index).ok_or_else(|| {
        Error::MissingField(format!("{}: input_parameter_name[{}]", node.name, index))
    })?;
    ctx.parameter(name)
}

/// Row-major 1-D copy of a parameter in f64
fn flatten(tensor: &WeightTensor) -> Result<ArrayD<f64>> {
    let values = tensor.to_f64();
    let len = values.len();
    Ok(values.as_standard_layout().into_owned().into_shape(IxDyn(&[len]))?)
}
