use crate::ast::{Stylesheet, Template};
use trellis_tree::{Document, NodeId};

/// Resolves the template rule that applies to a source node.
pub trait TemplateMatcher {
    /// Returns the best matching template for `node`, or `None` when the
    /// built-in rule applies. Must be deterministic and free of side effects.
    fn match_template(&self, source: &Document, node: NodeId) -> Option<&Template>;
}

impl TemplateMatcher for Stylesheet {
    fn match_template(&self, source: &Document, node: NodeId) -> Option<&Template> {
        let mut best: Option<(f64, &Template)> = None;
        for template in self.templates.iter().filter(|t| t.mode.is_none()) {
            let Some(pattern) = &template.pattern else {
                continue;
            };
            let Some(default_priority) = pattern.match_priority(source, node) else {
                continue;
            };
            let priority = template.priority.unwrap_or(default_priority);
            // Later templates win ties.
            if best.is_none_or(|(p, _)| priority >= p) {
                best = Some((priority, template));
            }
        }
        if let Some((priority, template)) = best {
            log::trace!(
                "Node {} matched template #{} with priority {}",
                node,
                template.index,
                priority
            );
        }
        best.map(|(_, t)| t)
    }
}
