use log::{debug, warn};

use crate::error::Result;
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, ConversionContext};

/// Passthrough for layer types without a dedicated routine: name, op and edges are
/// copied unchanged and no attributes are translated.
pub fn convert_unknown(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    warn!("PaddleParser has not supported operator [{}]", node.layer_type);
    if let Some(spec) = ctx.lookup_spec(node) {
        debug!("Unsupported layer {}: {:?}", node.name, spec);
    }

    let mut ir_node = copy_and_reop(node, None)?;
    ctx.convert_inedge(node, &mut ir_node);
    ctx.emit(ir_node)
}
