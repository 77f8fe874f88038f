//! Node dispatch, the template body walker and the built-in template rule.
//!
//! A matched template body is mirrored into the output without recursion:
//! the walker moves a `(cur, insert)` pair along the template tree with
//! child, sibling and parent links, keeping `insert` on the output node that
//! mirrors the parent of `cur`.
use crate::context::TransformContext;
use crate::diagnostics::Diagnostic;
use crate::error::TransformError;
use crate::executor_handlers::apply_templates::handle_apply_templates;
use crate::instruction::Instruction;
use std::mem;
use trellis_tree::{Document, NodeId, NodeKind, TreeError};

/// Processes one source node: instantiates the best matching template, or
/// applies the built-in rule when none matches.
///
/// A failed node copy abandons this call with [`TransformError::NodeCopy`],
/// leaving whatever was already attached in place.
pub fn process_one_node(ctx: &mut TransformContext<'_>, node: NodeId) -> Result<(), TransformError> {
    let saved_node = mem::replace(&mut ctx.current_node, node);
    let saved_expr = ctx.expr_context;
    ctx.expr_context.node = node;

    let matcher = ctx.matcher;
    let result = match matcher.match_template(ctx.source, node) {
        Some(template) => {
            log::debug!("Instantiating template #{} for node {}", template.index, node);
            instantiate_template(ctx, node, template.content)
        }
        None => {
            log::debug!("No template for node {}, applying built-in rule", node);
            default_process_one_node(ctx, node)
        }
    };

    ctx.current_node = saved_node;
    ctx.expr_context = saved_expr;
    result
}

/// Mirrors the children of `root`, a template element in the stylesheet
/// document, under the current insertion point.
fn instantiate_template(
    ctx: &mut TransformContext<'_>,
    node: NodeId,
    root: NodeId,
) -> Result<(), TransformError> {
    let stylesheet = ctx.stylesheet;
    let tdoc = stylesheet.document();
    let Some(mut cur) = tdoc.first_child(root) else {
        return Ok(());
    };
    let mut insert = ctx.insert;

    loop {
        let mut copy = None;
        match Instruction::classify(tdoc, cur) {
            Some(Instruction::ApplyTemplates { select }) => {
                let saved_insert = mem::replace(&mut ctx.insert, insert);
                let result = handle_apply_templates(ctx, node, cur, select);
                ctx.insert = saved_insert;
                result?;
            }
            Some(Instruction::Unsupported { name }) => {
                ctx.report(Diagnostic::UnhandledInstruction {
                    name: name.to_string(),
                });
            }
            None if tdoc.is_blank_node(cur) => {}
            None => copy = Some(copy_node(ctx, tdoc, cur, insert)?),
        }

        // Children of nodes that produced no copy are not visited.
        if let Some(copy) = copy {
            let child = tdoc
                .first_child(cur)
                .filter(|&c| tdoc.kind(c) != NodeKind::EntityDecl);
            if let Some(child) = child {
                cur = child;
                insert = copy;
                continue;
            }
        }
        if let Some(next) = tdoc.next_sibling(cur) {
            cur = next;
            continue;
        }

        loop {
            let Some(parent) = tdoc.parent(cur) else {
                return Ok(());
            };
            if parent == root {
                return Ok(());
            }
            cur = parent;
            insert = ctx
                .output
                .parent(insert)
                .ok_or_else(|| TransformError::Tree(TreeError::ForeignNode(insert)))?;
            if let Some(next) = tdoc.next_sibling(cur) {
                cur = next;
                break;
            }
        }
    }
}

/// The built-in template rule: recurse into element children, copy
/// non-blank text.
pub fn default_process_one_node(
    ctx: &mut TransformContext<'_>,
    node: NodeId,
) -> Result<(), TransformError> {
    let source = ctx.source;
    if !matches!(
        source.kind(node),
        NodeKind::Document | NodeKind::HtmlDocument | NodeKind::Element
    ) {
        return Ok(());
    }

    for child in source.children(node) {
        match source.kind(child) {
            NodeKind::Document | NodeKind::HtmlDocument | NodeKind::Element => {
                let result = process_one_node(ctx, child);
                ctx.recover(result)?;
            }
            NodeKind::Text if source.is_blank_node(child) => {}
            NodeKind::Text | NodeKind::CData => {
                let insert = ctx.insert;
                let result = copy_node(ctx, source, child, insert).map(|_| ());
                ctx.recover(result)?;
            }
            kind => ctx.report(Diagnostic::UnhandledNodeKind { kind }),
        }
    }
    Ok(())
}

/// Shallow-copies `node` of `from` and appends the copy under `parent` in
/// the output document.
fn copy_node(
    ctx: &mut TransformContext<'_>,
    from: &Document,
    node: NodeId,
    parent: NodeId,
) -> Result<NodeId, TransformError> {
    let copy = ctx
        .output
        .shallow_copy(from, node)
        .and_then(|copy| ctx.output.append_child(parent, copy).map(|_| copy))
        .map_err(|err| TransformError::from_copy(describe(from, node), err))?;
    log::trace!("Copied {} as {} under {}", describe(from, node), copy, parent);
    Ok(copy)
}

fn describe(doc: &Document, node: NodeId) -> String {
    match doc.name(node) {
        Some(name) => format!("{:?} node '{}'", doc.kind(node), name),
        None => format!("{:?} node", doc.kind(node)),
    }
}
