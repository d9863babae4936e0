use crate::error::Result;
use crate::ir::OpKind;
use crate::model::SourceNode;
use crate::ops::{copy_and_reop, defuse_declared_activation, ConversionContext};

/// Elementwise merge of every input under `new_op`.
///
/// Layers that expose an axis get `axis = -1` regardless of their own value.
pub fn convert_merge(ctx: &mut ConversionContext<'_>, node: &SourceNode, new_op: Option<&str>) -> Result<()> {
    let mut ir_node = copy_and_reop(node, new_op)?;
    ctx.convert_inedge(node, &mut ir_node);

    if node.layer.axis.is_some() {
        ir_node.set_attr("axis", -1i64);
    }

    ctx.emit(ir_node)
}

pub fn convert_addto(ctx: &mut ConversionContext<'_>, node: &SourceNode) -> Result<()> {
    let spec = ctx.spec(node)?;
    convert_merge(ctx, node, Some(OpKind::Add.as_ref()))?;
    defuse_declared_activation(ctx, node, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AttrValue, IrNode};
    use crate::parser::{ParameterStore, ParserOptions, SpecTable};
    use crate::proto::LayerConfig;

    fn prepared_context<'a>(
        specs: &'a SpecTable,
        parameters: &'a ParameterStore,
        options: &'a ParserOptions,
    ) -> ConversionContext<'a> {
        let mut ctx = ConversionContext::new(specs, parameters, options);
        ctx.emit(IrNode::new("branch_a", "Conv")).unwrap();
        ctx.emit(IrNode::new("branch_b", "Conv")).unwrap();
        ctx
    }

    #[test]
    fn test_convert_addto() {
        let specs = SpecTable::from_layers(vec![LayerConfig {
            name: "sum".to_string(),
            r#type: "addto".to_string(),
            active_type: Some("relu".to_string()),
            ..Default::default()
        }])
        .unwrap();
        let parameters = ParameterStore::not_loaded();
        let options = ParserOptions::default();
        let mut ctx = prepared_context(&specs, &parameters, &options);

        let node = SourceNode::new("sum", "addto").with_inputs(["branch_a", "branch_b"]);
        convert_addto(&mut ctx, &node).unwrap();

        let sum = ctx.graph().get("sum").unwrap();
        assert_eq!(sum.op, "Add");
        assert_eq!(sum.input, vec!["branch_a".to_string(), "branch_b".to_string()]);
        assert!(sum.get_attr("axis").is_none());
        assert_eq!(ctx.graph().get("sum_activation").unwrap().op, "Relu");
    }

    #[test]
    fn test_merge_with_axis() {
        let specs = SpecTable::default();
        let parameters = ParameterStore::not_loaded();
        let options = ParserOptions::default();
        let mut ctx = prepared_context(&specs, &parameters, &options);

        let node = SourceNode::new("cat", "concat")
            .with_inputs(["branch_a", "branch_b"])
            .with_axis(1);
        convert_merge(&mut ctx, &node, Some("Concat")).unwrap();

        let cat = ctx.graph().get("cat").unwrap();
        assert_eq!(cat.op, "Concat");
        assert_eq!(cat.get_attr("axis").and_then(AttrValue::as_int), Some(-1));
    }
}
