use serde::{Deserialize, Serialize};

/// Classification of a BOM item. The tags are domain labels; apart from the
/// move warning policy they carry no behavior of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Assembly,
    Subassembly,
    Component,
    Material,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Assembly => "assembly",
            NodeKind::Subassembly => "subassembly",
            NodeKind::Component => "component",
            NodeKind::Material => "material",
        }
    }
}

/// A node of the bill-of-materials forest.
///
/// `children` are exclusively owned by their parent and `parent_id` must equal
/// the containing node's id. The tree is a strict forest: no node appears
/// under two parents and no node is its own ancestor. The move transforms in
/// [`crate::move_node`] preserve both invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<BomNode>,
}

impl BomNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            quantity: 1.0,
            unit: "pcs".to_string(),
            parent_id: None,
            children: Vec::new(),
        }
    }

    pub fn quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = quantity;
        self.unit = unit.into();
        self
    }

    pub fn child(mut self, mut child: BomNode) -> Self {
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl Into<Vec<BomNode>>) -> Self {
        for mut child in children.into() {
            child.parent_id = Some(self.id.clone());
            self.children.push(child);
        }
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Depth-first lookup of a node by id.
pub fn find_node<'a>(nodes: &'a [BomNode], id: &str) -> Option<&'a BomNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Whether `id` names `node` itself or any node in its subtree.
pub fn subtree_contains(node: &BomNode, id: &str) -> bool {
    if node.id == id {
        return true;
    }
    node.children
        .iter()
        .any(|child| subtree_contains(child, id))
}

/// All ids in the forest, in pre-order.
pub fn collect_ids(nodes: &[BomNode]) -> Vec<String> {
    fn walk(nodes: &[BomNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.id.clone());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}
