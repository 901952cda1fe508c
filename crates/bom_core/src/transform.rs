use crate::node::{BomNode, find_node, subtree_contains};

/// Remove the node with `id` from wherever it sits in the forest.
///
/// Consumes the forest and returns the new forest plus the removed node (with
/// its subtree intact). The first match wins; if `id` is absent the forest
/// comes back unchanged.
pub fn remove_by_id(nodes: Vec<BomNode>, id: &str) -> (Vec<BomNode>, Option<BomNode>) {
    let mut removed = None;
    let mut kept = Vec::with_capacity(nodes.len());

    for mut node in nodes {
        if removed.is_none() && node.id == id {
            removed = Some(node);
            continue;
        }
        if removed.is_none() {
            let (children, found) = remove_by_id(std::mem::take(&mut node.children), id);
            node.children = children;
            removed = found;
        }
        kept.push(node);
    }

    (kept, removed)
}

/// Append `child` to the children of the node with `parent_id`, setting the
/// child's back-reference.
///
/// Returns the new forest and, if no node has `parent_id`, the child handed
/// back so the caller can restore it. The node is never silently dropped.
pub fn insert_as_child(
    nodes: Vec<BomNode>,
    parent_id: &str,
    mut child: BomNode,
) -> (Vec<BomNode>, Option<BomNode>) {
    child.parent_id = Some(parent_id.to_string());

    let mut pending = Some(child);
    let nodes = nodes
        .into_iter()
        .map(|node| insert_into(node, parent_id, &mut pending))
        .collect();
    (nodes, pending)
}

fn insert_into(mut node: BomNode, parent_id: &str, pending: &mut Option<BomNode>) -> BomNode {
    if pending.is_none() {
        return node;
    }
    if node.id == parent_id {
        if let Some(child) = pending.take() {
            node.children.push(child);
        }
        return node;
    }
    node.children = node
        .children
        .into_iter()
        .map(|child| insert_into(child, parent_id, pending))
        .collect();
    node
}

/// Move the node with `source_id` to become the last child of `target_id`,
/// as a remove-then-insert of two pure transforms.
///
/// Returns the new forest and whether the move happened. A move that would
/// break the forest invariant (missing endpoint, self-move, target inside the
/// source's subtree) leaves the forest untouched and returns false, so this
/// is safe to call even when [`crate::validate_move`] was skipped.
pub fn move_node(roots: Vec<BomNode>, source_id: &str, target_id: &str) -> (Vec<BomNode>, bool) {
    if source_id == target_id || find_node(&roots, target_id).is_none() {
        return (roots, false);
    }
    let Some(source) = find_node(&roots, source_id) else {
        return (roots, false);
    };
    if subtree_contains(source, target_id) {
        return (roots, false);
    }

    let (roots, removed) = remove_by_id(roots, source_id);
    let Some(node) = removed else {
        return (roots, false);
    };

    let (mut roots, leftover) = insert_as_child(roots, target_id, node);
    match leftover {
        None => (roots, true),
        Some(mut node) => {
            node.parent_id = None;
            roots.push(node);
            (roots, false)
        }
    }
}
