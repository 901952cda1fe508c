use bom_core::{BomNode, MovePolicy, NodeKind, partition_drop_targets, validate_move};

fn sample_tree() -> Vec<BomNode> {
    vec![
        BomNode::new("frame", "Frame", NodeKind::Assembly)
            .child(
                BomNode::new("fork", "Fork", NodeKind::Subassembly)
                    .child(BomNode::new("steel", "Steel tube", NodeKind::Material)),
            )
            .child(BomNode::new("bolt", "Bolt", NodeKind::Component)),
        BomNode::new("wheel", "Wheel", NodeKind::Assembly),
    ]
}

#[test]
fn self_move_is_invalid_for_every_node() {
    let tree = sample_tree();
    for id in ["frame", "fork", "steel", "bolt", "wheel"] {
        let result = validate_move(id, id, &tree, &MovePolicy::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors, ["cannot move an item into itself"]);
        assert!(result.warnings.is_empty());
    }
}

#[test]
fn moving_into_own_subtree_is_invalid() {
    let tree = sample_tree();

    for target in ["fork", "steel"] {
        let result = validate_move("frame", target, &tree, &MovePolicy::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors, ["cannot move an item into its own subtree"]);
    }

    // The immediate child case as well as the deep one.
    let result = validate_move("fork", "steel", &tree, &MovePolicy::default());
    assert!(!result.is_valid);
}

#[test]
fn missing_endpoints_are_reported() {
    let tree = sample_tree();

    let result = validate_move("bolt", "ghost", &tree, &MovePolicy::default());
    assert!(!result.is_valid);
    assert_eq!(result.errors, ["target item not found"]);

    let result = validate_move("ghost", "frame", &tree, &MovePolicy::default());
    assert!(!result.is_valid);
    assert_eq!(result.errors, ["source item not found"]);
}

#[test]
fn legal_move_has_no_errors() {
    let tree = sample_tree();

    let result = validate_move("bolt", "wheel", &tree, &MovePolicy::default());
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

#[test]
fn default_policy_warns_on_material_under_assembly() {
    let tree = sample_tree();

    let result = validate_move("steel", "wheel", &tree, &MovePolicy::default());
    assert!(result.is_valid, "warnings never block a move");
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("material"));
}

#[test]
fn permissive_policy_is_silent() {
    let tree = sample_tree();

    let result = validate_move("steel", "wheel", &tree, &MovePolicy::permissive());
    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
}

#[test]
fn custom_rules_extend_the_matrix() {
    let tree = sample_tree();
    let policy = MovePolicy::permissive().rule(
        NodeKind::Component,
        NodeKind::Assembly,
        "loose component at assembly level",
    );

    let result = validate_move("bolt", "wheel", &tree, &policy);
    assert!(result.is_valid);
    assert_eq!(result.warnings, ["loose component at assembly level"]);
}

#[test]
fn partition_covers_every_node_exactly_once() {
    let tree = sample_tree();
    let targets = partition_drop_targets("fork", &tree, &MovePolicy::default());

    assert_eq!(targets.valid.len() + targets.invalid.len(), 5);
    assert!(targets.valid.is_disjoint(&targets.invalid));

    // Itself and its descendant are out; everything else is in.
    assert!(targets.invalid.contains("fork"));
    assert!(targets.invalid.contains("steel"));
    assert!(targets.valid.contains("frame"));
    assert!(targets.valid.contains("bolt"));
    assert!(targets.valid.contains("wheel"));
}
