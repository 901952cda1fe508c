use bom_core::{BomNode, NodeKind, find_node, insert_as_child, move_node, remove_by_id};

fn assembly(id: &str, children: Vec<BomNode>) -> BomNode {
    BomNode::new(id, id, NodeKind::Assembly).children(children)
}

fn component(id: &str) -> BomNode {
    BomNode::new(id, id, NodeKind::Component)
}

fn dump(nodes: &[BomNode], depth: usize, out: &mut String) {
    for node in nodes {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.id);
        out.push('\n');
        dump(&node.children, depth + 1, out);
    }
}

fn shape(nodes: &[BomNode]) -> String {
    let mut out = String::new();
    dump(nodes, 0, &mut out);
    out
}

#[test]
fn remove_detaches_the_whole_subtree() {
    let roots = vec![assembly(
        "A",
        vec![assembly("B", vec![component("D")]), component("C")],
    )];

    let (roots, removed) = remove_by_id(roots, "B");

    let removed = removed.unwrap();
    assert_eq!(removed.id, "B");
    assert_eq!(removed.children.len(), 1);
    assert_eq!(removed.children[0].id, "D");
    assert_eq!(shape(&roots), "A\n  C\n");
}

#[test]
fn remove_of_absent_id_returns_the_forest_unchanged() {
    let roots = vec![assembly("A", vec![component("B")])];
    let before = shape(&roots);

    let (roots, removed) = remove_by_id(roots, "ghost");

    assert!(removed.is_none());
    assert_eq!(shape(&roots), before);
}

#[test]
fn insert_appends_and_sets_the_back_reference() {
    let roots = vec![assembly("A", vec![component("B")])];

    let (roots, leftover) = insert_as_child(roots, "A", component("C"));

    assert!(leftover.is_none());
    assert_eq!(shape(&roots), "A\n  B\n  C\n");
    let inserted = find_node(&roots, "C").unwrap();
    assert_eq!(inserted.parent_id.as_deref(), Some("A"));
}

#[test]
fn insert_with_unknown_parent_hands_the_node_back() {
    let roots = vec![assembly("A", vec![])];

    let (roots, leftover) = insert_as_child(roots, "ghost", component("C"));

    assert_eq!(leftover.unwrap().id, "C");
    assert_eq!(shape(&roots), "A\n");
}

#[test]
fn move_reparents_a_leaf_across_branches() {
    // A -> [B, C], B -> [D]; dragging D onto C is legal and leaves B empty.
    let roots = vec![assembly(
        "A",
        vec![assembly("B", vec![component("D")]), component("C")],
    )];

    let (roots, moved) = move_node(roots, "D", "C");

    assert!(moved);
    assert_eq!(shape(&roots), "A\n  B\n  C\n    D\n");
    assert_eq!(
        find_node(&roots, "D").unwrap().parent_id.as_deref(),
        Some("C")
    );
    assert!(find_node(&roots, "B").unwrap().children.is_empty());
}

#[test]
fn move_appends_after_existing_children() {
    let roots = vec![
        assembly("A", vec![component("X"), component("Y")]),
        component("B"),
    ];

    let (roots, moved) = move_node(roots, "B", "A");

    assert!(moved);
    assert_eq!(shape(&roots), "A\n  X\n  Y\n  B\n");
}

#[test]
fn move_into_own_descendant_is_refused() {
    let roots = vec![assembly(
        "A",
        vec![assembly("B", vec![component("D")]), component("C")],
    )];
    let before = shape(&roots);

    let (roots, moved) = move_node(roots, "A", "D");

    assert!(!moved);
    assert_eq!(shape(&roots), before);
}

#[test]
fn move_onto_itself_is_refused() {
    let roots = vec![assembly("A", vec![component("B")])];
    let before = shape(&roots);

    let (roots, moved) = move_node(roots, "B", "B");

    assert!(!moved);
    assert_eq!(shape(&roots), before);
}

#[test]
fn move_to_missing_target_is_refused_without_side_effects() {
    let roots = vec![assembly("A", vec![component("B")])];
    let before = shape(&roots);

    let (roots, moved) = move_node(roots, "B", "ghost");

    assert!(!moved);
    assert_eq!(shape(&roots), before);
}

#[test]
fn move_there_and_back_restores_the_original_forest() {
    let roots = vec![
        assembly("P", vec![component("D")]),
        assembly("Q", vec![]),
    ];
    let original = roots.clone();

    let (roots, moved) = move_node(roots, "D", "Q");
    assert!(moved);
    assert_eq!(shape(&roots), "P\nQ\n  D\n");

    let (roots, moved) = move_node(roots, "D", "P");
    assert!(moved);
    assert_eq!(roots, original);
}
