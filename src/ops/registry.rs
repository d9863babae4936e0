use log::debug;
use strum_macros::EnumString;

use crate::error::Result;
use crate::model::SourceNode;
use crate::ops::nn::{batch_norm, conv, fc, pool};
use crate::ops::{data, merge, unknown, ConversionContext};

/// Source layer kinds with a dedicated conversion routine.
///
/// Parsed from the graph type tag; anything else lands in `Unknown` and is passed
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    Conv,
    BatchNorm,
    Pool,
    Fc,
    Addto,
    Data,
    #[strum(disabled)]
    Unknown(String),
}

impl LayerKind {
    pub fn from_type_tag(tag: &str) -> Self {
        tag.parse()
            .unwrap_or_else(|_| LayerKind::Unknown(tag.to_string()))
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, LayerKind::Unknown(_))
    }
}

/// Convert one source node with the routine selected by its type tag
pub fn convert_node(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let kind = LayerKind::from_type_tag(&node.layer_type);
    debug!("Converting {} as {:?}", node.name, kind);

    match kind {
        LayerKind::Conv => conv::convert_conv(ctx, node),
        LayerKind::BatchNorm => batch_norm::convert_batch_norm(ctx, node),
        LayerKind::Pool => pool::convert_pool(ctx, node),
        LayerKind::Fc => fc::convert_fc(ctx, node),
        LayerKind::Addto => merge::convert_addto(ctx, node),
        LayerKind::Data => data::convert_data(ctx, node),
        LayerKind::Unknown(_) => unknown::convert_unknown(ctx, node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(LayerKind::from_type_tag("conv"), LayerKind::Conv);
        assert_eq!(LayerKind::from_type_tag("batch_norm"), LayerKind::BatchNorm);
        assert_eq!(LayerKind::from_type_tag("addto"), LayerKind::Addto);
        assert_eq!(LayerKind::from_type_tag("data"), LayerKind::Data);
        assert_eq!(
            LayerKind::from_type_tag("frobnicate"),
            LayerKind::Unknown("frobnicate".to_string())
        );
        assert!(!LayerKind::from_type_tag("exconv").is_supported());
        assert!(LayerKind::Fc.is_supported());
    }
}
