use log::debug;

use crate::error::Result;
use crate::ir::OpKind;
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, copy_shape, ConversionContext};
use crate::proto::LayerConfig;

/// Graph input. The recorded shape is the configured fixed shape unless inference is
/// enabled and the layer declares its geometry.
pub fn convert_data(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let mut ir_node = copy_and_reop(node, Some(OpKind::DataInput.as_ref()))?;
    ctx.convert_inedge(node, &mut ir_node);

    let options = ctx.options();
    let declared = if options.infer_data_shape {
        ctx.lookup_spec(node).and_then(declared_shape)
    } else {
        None
    };
    let shape = declared.unwrap_or_else(|| {
        if options.infer_data_shape {
            debug!("Data layer {} declares no geometry, using the fixed shape", node.name);
        }
        options.data_input_shape.clone()
    });
    copy_shape(&mut ir_node, shape);

    ctx.emit(ir_node)
}

/// `[-1, height, width, channels]` from the declared size and spatial extents
fn declared_shape(spec: &LayerConfig) -> Option<Vec<i64>> {
    let height = spec.height.filter(|&h| h > 0)?;
    let width = spec.width.filter(|&w| w > 0)?;
    let size = spec.size?;
    let plane = height * width;
    if size % plane != 0 {
        return None;
    }
    Some(vec![-1, height as i64, width as i64, (size / plane) as i64])
}
