use std::collections::HashSet;

use bom_core::{BomNode, NodeKind, flatten};

fn assembly(id: &str, children: Vec<BomNode>) -> BomNode {
    BomNode::new(id, id, NodeKind::Assembly).children(children)
}

fn component(id: &str) -> BomNode {
    BomNode::new(id, id, NodeKind::Component)
}

fn expanded(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn row_ids(rows: &[bom_core::FlattenedRow]) -> Vec<&str> {
    rows.iter().map(|row| row.id.as_str()).collect()
}

#[test]
fn collapsed_root_emits_exactly_one_row() {
    let roots = vec![assembly("A", vec![component("B")])];

    let rows = flatten(&roots, &expanded(&[]));

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, "A");
    assert_eq!(row.depth, 0);
    assert!(row.has_children);
    assert!(!row.is_expanded);
    assert!(row.is_visible);
    assert_eq!(row.original_index, 0);
    assert_eq!(row.parent_id, None);
}

#[test]
fn row_appears_iff_every_ancestor_is_expanded() {
    let roots = vec![assembly(
        "A",
        vec![
            assembly("B", vec![component("D")]),
            component("C"),
        ],
    )];

    assert_eq!(row_ids(&flatten(&roots, &expanded(&["A"]))), ["A", "B", "C"]);
    assert_eq!(
        row_ids(&flatten(&roots, &expanded(&["A", "B"]))),
        ["A", "B", "D", "C"]
    );

    // Expanding a hidden node must not reveal its children while an ancestor
    // stays collapsed.
    assert_eq!(row_ids(&flatten(&roots, &expanded(&["B"]))), ["A"]);
}

#[test]
fn output_is_pre_order_with_sibling_order_preserved() {
    let roots = vec![
        assembly(
            "A",
            vec![
                assembly("B", vec![component("D"), component("E")]),
                component("C"),
            ],
        ),
        component("F"),
    ];

    let rows = flatten(&roots, &expanded(&["A", "B"]));

    assert_eq!(row_ids(&rows), ["A", "B", "D", "E", "C", "F"]);
    let depths: Vec<usize> = rows.iter().map(|row| row.depth).collect();
    assert_eq!(depths, [0, 1, 2, 2, 1, 0]);

    // A parent row always precedes its descendants.
    for row in &rows {
        if let Some(parent_id) = &row.parent_id {
            let parent_pos = rows.iter().position(|r| &r.id == parent_id).unwrap();
            let row_pos = rows.iter().position(|r| r.id == row.id).unwrap();
            assert!(parent_pos < row_pos);
        }
    }
}

#[test]
fn original_index_tracks_sibling_position() {
    let roots = vec![assembly(
        "A",
        vec![component("B"), component("C"), component("D")],
    )];

    let rows = flatten(&roots, &expanded(&["A"]));

    let indices: Vec<usize> = rows.iter().map(|row| row.original_index).collect();
    assert_eq!(indices, [0, 0, 1, 2]);
    assert_eq!(rows[2].parent_id.as_deref(), Some("A"));
}

#[test]
fn leaves_report_no_children_and_expansion_state_is_carried() {
    let roots = vec![assembly("A", vec![assembly("B", vec![component("C")])])];

    let rows = flatten(&roots, &expanded(&["A", "B"]));

    assert!(rows.iter().find(|r| r.id == "B").unwrap().is_expanded);
    let leaf = rows.iter().find(|r| r.id == "C").unwrap();
    assert!(!leaf.has_children);
    assert!(!leaf.is_expanded);
}

#[test]
fn flatten_is_deterministic() {
    let roots = vec![assembly(
        "A",
        vec![assembly("B", vec![component("D")]), component("C")],
    )];
    let expanded = expanded(&["A", "B"]);

    assert_eq!(flatten(&roots, &expanded), flatten(&roots, &expanded));
}
