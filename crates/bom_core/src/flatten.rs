use std::collections::HashSet;

use crate::node::BomNode;

/// One visible row of the flattened tree, as consumed by a fixed-row
/// virtualized list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedRow {
    pub id: String,
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
    /// A row is visible iff it is a root or every ancestor is expanded.
    /// [`flatten`] only emits visible rows, so this is true on every row it
    /// returns; kept so a row can be carried around independently of the
    /// sequence it came from.
    pub is_visible: bool,
    /// Position among the node's siblings, for stable re-insertion.
    pub original_index: usize,
    pub parent_id: Option<String>,
}

/// Flatten the forest into its visible rows, depth-first pre-order.
///
/// Collapsed subtrees are not traversed into; the collapsed node itself is
/// still emitted. Pure over `(roots, expanded)`: the caller re-runs this on
/// every expand/collapse toggle or tree replacement rather than patching the
/// previous output.
pub fn flatten(roots: &[BomNode], expanded: &HashSet<String>) -> Vec<FlattenedRow> {
    fn walk(
        nodes: &[BomNode],
        depth: usize,
        parent_id: Option<&str>,
        expanded: &HashSet<String>,
        out: &mut Vec<FlattenedRow>,
    ) {
        for (index, node) in nodes.iter().enumerate() {
            let is_expanded = expanded.contains(&node.id);
            out.push(FlattenedRow {
                id: node.id.clone(),
                depth,
                has_children: node.has_children(),
                is_expanded,
                is_visible: true,
                original_index: index,
                parent_id: parent_id.map(str::to_string),
            });

            if is_expanded {
                walk(&node.children, depth + 1, Some(&node.id), expanded, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(roots, 0, None, expanded, &mut out);
    out
}
