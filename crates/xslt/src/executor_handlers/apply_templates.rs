use crate::context::TransformContext;
use crate::diagnostics::Diagnostic;
use crate::error::TransformError;
use crate::evaluator::EvalContext;
use crate::executor::{default_process_one_node, process_one_node};
use std::mem;
use trellis_tree::{NodeId, NodeKind};

/// Runs `xsl:apply-templates` element `inst` for source node `node`, with
/// the `select` expression it was classified with.
///
/// Without `select` the built-in rule is applied to `node`. With `select` the
/// configured evaluator picks the nodes, which become the current node-set
/// and are processed in order.
pub(crate) fn handle_apply_templates(
    ctx: &mut TransformContext<'_>,
    node: NodeId,
    inst: NodeId,
    select: Option<&str>,
) -> Result<(), TransformError> {
    let stylesheet = ctx.stylesheet;
    let tdoc = stylesheet.document();
    if tdoc.kind(inst) != NodeKind::Element {
        return Ok(());
    }
    log::debug!("apply-templates on node {}", node);

    let Some(select) = select else {
        return default_process_one_node(ctx, node);
    };
    let Some(evaluator) = ctx.evaluator else {
        ctx.report(Diagnostic::UnsupportedSelect {
            select: select.to_string(),
        });
        return Ok(());
    };

    let selected = evaluator
        .evaluate(select, ctx.source, &ctx.expr_context)
        .map_err(|e| TransformError::Evaluation {
            select: select.to_string(),
            message: e.message,
        })?;
    log::debug!("select '{}' yielded {} node(s)", select, selected.len());

    let saved_set = mem::replace(&mut ctx.current_node_set, selected);
    let saved_expr = ctx.expr_context;
    let size = ctx.current_node_set.len();
    let mut result = Ok(());
    for position in 0..size {
        let Some(child) = ctx.current_node_set.get(position) else {
            break;
        };
        ctx.expr_context = EvalContext {
            node: child,
            position: position + 1,
            size,
        };
        let processed = process_one_node(ctx, child);
        result = ctx.recover(processed);
        if result.is_err() {
            break;
        }
    }
    ctx.current_node_set = saved_set;
    ctx.expr_context = saved_expr;
    result
}
