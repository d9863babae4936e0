use strum_macros::{AsRefStr, Display};

use crate::error::{Error, Result};
use crate::ir::OpKind;
use crate::layout::{infer_auto_pad, symmetric_pads, tf_pads_to_onnx, AutoPad, AxisExtent};
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, defuse_declared_activation, set_output_shape, ConversionContext};
use crate::proto::PoolConfig;

/// Pool type tag selecting average pooling; every other tag pools by maximum
pub const AVG_POOL_TYPE: &str = "avg-projection";

/// Pooling type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum PoolingType {
    #[strum(serialize = "MAX")]
    Max,
    #[strum(serialize = "AVG")]
    Avg,
}

impl PoolingType {
    pub fn from_pool_type(pool_type: &str) -> Self {
        if pool_type == AVG_POOL_TYPE {
            PoolingType::Avg
        } else {
            PoolingType::Max
        }
    }
}

/// Resolved pooling geometry; `_y` values default to their `_x` counterparts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolGeometry {
    pub width: i64,
    pub height: i64,
    pub channels: i64,
    pub stride_x: i64,
    pub stride_y: i64,
    pub padding_x: i64,
    pub padding_y: i64,
    pub output_x: i64,
    pub output_y: i64,
    pub input_x: i64,
    pub input_y: i64,
}

impl PoolGeometry {
    pub fn from_spec(conf: &PoolConfig) -> Self {
        let width = conf.size_x as i64;
        let stride_x = conf.stride as i64;
        let padding_x = conf.padding() as i64;
        let output_x = conf.output_x as i64;
        let input_x = conf.img_size as i64;

        Self {
            width,
            height: conf.size_y.map_or(width, i64::from),
            channels: conf.channels as i64,
            stride_x,
            stride_y: conf.stride_y.map_or(stride_x, i64::from),
            padding_x,
            padding_y: conf.padding_y.map_or(padding_x, i64::from),
            output_x,
            output_y: conf.output_y.map_or(output_x, i64::from),
            input_x,
            input_y: conf.img_size_y.map_or(input_x, i64::from),
        }
    }

    pub fn output_shape(&self) -> Vec<i64> {
        vec![-1, self.channels, self.output_y, self.output_x]
    }
}

/// Padding mode implied by the input, output, stride and window extents
pub fn infer_pool_auto_pad(geometry: &PoolGeometry) -> Option<AutoPad> {
    infer_auto_pad(&[
        AxisExtent {
            input: geometry.input_x,
            output: geometry.output_x,
            stride: geometry.stride_x,
            kernel: geometry.width,
        },
        AxisExtent {
            input: geometry.input_y,
            output: geometry.output_y,
            stride: geometry.stride_y,
            kernel: geometry.height,
        },
    ])
}

pub fn convert_pool(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let spec = ctx.spec(node)?;
    let conf = spec
        .inputs
        .first()
        .and_then(|input| input.pool_conf.as_ref())
        .ok_or_else(|| Error::MissingField(format!("{}: pool_conf", node.name)))?;
    let geometry = PoolGeometry::from_spec(conf);

    let mut ir_node = copy_and_reop(node, Some(OpKind::Pool.as_ref()))?;
    ctx.convert_inedge(node, &mut ir_node);
    set_output_shape(&mut ir_node, geometry.output_shape());

    ir_node.set_attr("pooling_type", PoolingType::from_pool_type(&conf.pool_type).as_ref());
    ir_node.set_attr("global_pooling", false);
    ir_node.set_attr("strides", vec![1, geometry.stride_x, geometry.stride_y, 1]);
    ir_node.set_attr("kernel_shape", vec![1, geometry.width, geometry.height, 1]);

    if let Some(auto_pad) = infer_pool_auto_pad(&geometry) {
        ir_node.set_attr("auto_pad", auto_pad.as_ref());
    }
    ir_node.set_attr(
        "pads",
        tf_pads_to_onnx(&symmetric_pads(geometry.padding_x, geometry.padding_y))?,
    );

    ctx.emit(ir_node)?;
    defuse_declared_activation(ctx, node, spec)
}
