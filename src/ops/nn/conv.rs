//! # Convolution conversion
//!
//! Translates `exconv`, `cudnn_conv`, `exconvt` and `cudnn_convt` layers into `Conv` or
//! `ConvTranspose` IR nodes.
//!
//! Geometry comes from the first input's `ConvConfig`. The `_y` fields are optional and
//! fall back to their `_x` counterparts for square kernels. The kernel is stored as
//! `[height, width, in_channels, out_channels]`, transposed from the framework's
//! `[out_channels, in_channels, height, width]`.

use crate::error::{Error, Result};
use crate::ir::{OpKind, WeightRole};
use crate::layout::{symmetric_pads, tf_pads_to_onnx, AutoPad, OIHW_TO_HWIO};
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, defuse_declared_activation, set_output_shape, ConversionContext};
use crate::parser::ConvDispatch;
use crate::proto::ConvConfig;

/// Layer types that denote a transposed convolution
pub const DECONV_TYPES: [&str; 2] = ["exconvt", "cudnn_convt"];

/// Resolved convolution geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvGeometry {
    pub width: i64,
    pub height: i64,
    pub input_channels: i64,
    pub output_channels: i64,
    pub stride_x: i64,
    pub stride_y: i64,
    pub padding_x: i64,
    pub padding_y: i64,
    pub dilation_x: i64,
    pub dilation_y: i64,
    pub output_x: i64,
    pub output_y: i64,
    pub input_x: i64,
    pub input_y: i64,
    pub groups: i64,
}

impl ConvGeometry {
    pub fn from_spec(conf: &ConvConfig, num_filters: u32) -> Self {
        let width = conf.filter_size as i64;
        let stride_x = conf.stride as i64;
        let padding_x = conf.padding as i64;
        let dilation_x = conf.dilation() as i64;
        let output_x = conf.output_x as i64;
        let input_x = conf.img_size as i64;

        Self {
            width,
            height: conf.filter_size_y.map_or(width, i64::from),
            input_channels: conf.channels as i64,
            output_channels: num_filters as i64,
            stride_x,
            stride_y: conf.stride_y.map_or(stride_x, i64::from),
            padding_x,
            padding_y: conf.padding_y.map_or(padding_x, i64::from),
            dilation_x,
            dilation_y: conf.dilation_y.map_or(dilation_x, i64::from),
            output_x,
            output_y: conf.output_y.map_or(output_x, i64::from),
            input_x,
            input_y: conf.img_size_y.map_or(input_x, i64::from),
            groups: conf.groups as i64,
        }
    }

    /// Channel-first output shape with an unknown batch
    pub fn output_shape(&self) -> Vec<i64> {
        vec![-1, self.output_channels, self.output_y, self.output_x]
    }

    /// Native kernel layout `[out, in, h, w]`
    fn native_kernel_shape(&self) -> Vec<usize> {
        [self.output_channels, self.input_channels, self.height, self.width]
            .iter()
            .map(|&d| d as usize)
            .collect()
    }
}

/// Pick the IR op for a convolution layer type
pub fn conv_op(layer_type: &str, dispatch: ConvDispatch) -> OpKind {
    match dispatch {
        ConvDispatch::ByTypeTag if DECONV_TYPES.contains(&layer_type) => OpKind::ConvTranspose,
        _ => OpKind::Conv,
    }
}

pub fn convert_conv(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let spec = ctx.spec(node)?;
    let conf = spec
        .inputs
        .first()
        .and_then(|input| input.conv_conf.as_ref())
        .ok_or_else(|| Error::MissingField(format!("{}: conv_conf", node.name)))?;
    let num_filters = spec
        .num_filters
        .ok_or_else(|| Error::MissingField(format!("{}: num_filters", node.name)))?;
    let geometry = ConvGeometry::from_spec(conf, num_filters);

    let op = conv_op(&spec.r#type, ctx.options().conv_dispatch);
    let mut ir_node = copy_and_reop(node, Some(op.as_ref()))?;
    ctx.convert_inedge(node, &mut ir_node);
    set_output_shape(&mut ir_node, geometry.output_shape());

    if op == OpKind::ConvTranspose {
        ir_node.set_attr("isDeconvolution", true);
    }

    if ctx.weights_loaded() {
        let weight_name = spec
            .input_parameter(0)
            .ok_or_else(|| Error::MissingField(format!("{}: input_parameter_name", node.name)))?;
        let kernel = ctx
            .parameter(weight_name)?
            .reshape(&geometry.native_kernel_shape())?
            .transpose(&OIHW_TO_HWIO)?;
        ctx.set_weight(&ir_node.name, WeightRole::Weights, kernel);
    }

    ir_node.set_attr(
        "kernel_shape",
        vec![
            geometry.height,
            geometry.width,
            geometry.input_channels,
            geometry.output_channels,
        ],
    );
    ir_node.set_attr("use_bias", false);
    ir_node.set_attr(
        "pads",
        tf_pads_to_onnx(&symmetric_pads(geometry.padding_x, geometry.padding_y))?,
    );
    // Both size relations map to SAME for convolutions.
    ir_node.set_attr("auto_pad", AutoPad::Same.as_ref());
    ir_node.set_attr("group", geometry.groups);
    ir_node.set_attr("dilation", vec![1, geometry.dilation_x, geometry.dilation_y, 1]);
    ir_node.set_attr("strides", vec![1, geometry.stride_x, geometry.stride_y, 1]);

    ctx.emit(ir_node)?;
    defuse_declared_activation(ctx, node, spec)
}
