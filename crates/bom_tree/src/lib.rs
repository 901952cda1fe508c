mod tree;

pub use tree::{
    BomTree, BomTreeEntry, BomTreeEvent, BomTreeRowState, BomTreeState, DropCandidate, bom_tree,
};
