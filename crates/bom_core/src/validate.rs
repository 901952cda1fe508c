use std::collections::HashSet;

use crate::node::{BomNode, NodeKind, collect_ids, find_node, subtree_contains};

/// Outcome of checking a prospective move.
///
/// `errors` is non-empty iff the move is structurally illegal; `warnings` may
/// be non-empty on a legal move and never blocks it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    fn valid(warnings: Vec<String>) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings,
        }
    }
}

/// One kind-compatibility rule: moving a `source` of this kind under a
/// `target` of that kind produces `message` as a warning.
#[derive(Debug, Clone)]
pub struct CompatibilityRule {
    pub source: NodeKind,
    pub target: NodeKind,
    pub message: String,
}

/// Advisory policy applied to structurally legal moves.
///
/// The rule set is configuration, not a fixed algorithm: the defaults cover
/// the common hierarchy-inversion cases, and hosts with a stricter (or
/// looser) compatibility matrix replace or extend them.
#[derive(Debug, Clone)]
pub struct MovePolicy {
    rules: Vec<CompatibilityRule>,
}

impl MovePolicy {
    /// No advisory rules; every legal move is silent.
    pub fn permissive() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule(
        mut self,
        source: NodeKind,
        target: NodeKind,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(CompatibilityRule {
            source,
            target,
            message: message.into(),
        });
        self
    }

    fn warnings_for(&self, source: &BomNode, target: &BomNode) -> Vec<String> {
        let mut warnings = Vec::new();
        for rule in &self.rules {
            if rule.source == source.kind && rule.target == target.kind {
                warnings.push(rule.message.clone());
            }
        }
        warnings
    }
}

impl Default for MovePolicy {
    fn default() -> Self {
        Self::permissive()
            .rule(
                NodeKind::Material,
                NodeKind::Assembly,
                "material placed directly under an assembly; consider grouping it in a subassembly",
            )
            .rule(
                NodeKind::Assembly,
                NodeKind::Component,
                "assembly nested under a component inverts the usual hierarchy",
            )
            .rule(
                NodeKind::Assembly,
                NodeKind::Material,
                "assembly nested under a material inverts the usual hierarchy",
            )
            .rule(
                NodeKind::Subassembly,
                NodeKind::Material,
                "subassembly nested under a material inverts the usual hierarchy",
            )
            .rule(
                NodeKind::Component,
                NodeKind::Material,
                "component nested under a material inverts the usual hierarchy",
            )
    }
}

/// Decide whether moving `source_id` under `target_id` is legal.
///
/// Checks run in order and the first failure wins; warnings are only computed
/// for legal moves. Pure over the forest snapshot passed in, so it is safe to
/// call for every node during drag-start prevalidation.
pub fn validate_move(
    source_id: &str,
    target_id: &str,
    roots: &[BomNode],
    policy: &MovePolicy,
) -> ValidationResult {
    if source_id == target_id {
        return ValidationResult::invalid("cannot move an item into itself");
    }

    let Some(source) = find_node(roots, source_id) else {
        return ValidationResult::invalid("source item not found");
    };

    // The forest-protecting invariant: a node may never land inside its own
    // subtree.
    if subtree_contains(source, target_id) {
        return ValidationResult::invalid("cannot move an item into its own subtree");
    }

    let Some(target) = find_node(roots, target_id) else {
        return ValidationResult::invalid("target item not found");
    };

    ValidationResult::valid(policy.warnings_for(source, target))
}

/// Every node id in the forest, partitioned by move legality for `source_id`.
#[derive(Debug, Clone, Default)]
pub struct DropTargets {
    pub valid: HashSet<String>,
    pub invalid: HashSet<String>,
}

/// Eager prevalidation: run [`validate_move`] against every node in the
/// forest and split the ids by outcome. Computed once per drag-start so that
/// per-hover legality checks are set lookups.
pub fn partition_drop_targets(
    source_id: &str,
    roots: &[BomNode],
    policy: &MovePolicy,
) -> DropTargets {
    let mut targets = DropTargets::default();
    for id in collect_ids(roots) {
        if validate_move(source_id, &id, roots, policy).is_valid {
            targets.valid.insert(id);
        } else {
            targets.invalid.insert(id);
        }
    }
    targets
}
