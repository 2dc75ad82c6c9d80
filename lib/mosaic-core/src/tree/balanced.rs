use crate::tree::{MosaicDirection, MosaicNode, MosaicTree};
use std::sync::Arc;

/// Builds a tree of minimal height holding `leaves` in order.
///
/// The sequence is halved recursively (the first half takes the odd element)
/// and each level alternates direction, starting with a row at the root. Every
/// split is 50/50. Flattening any tree with [`get_leaves`](crate::tree::get_leaves)
/// and rebuilding it yields the same shape for the same leaves.
pub fn create_balanced_tree_from_leaves<T>(leaves: impl IntoIterator<Item = T>) -> MosaicTree<T> {
    let mut leaves: Vec<Arc<MosaicNode<T>>> = leaves.into_iter().map(MosaicNode::leaf).collect();
    if leaves.is_empty() {
        return None;
    }
    Some(build_balanced(&mut leaves, MosaicDirection::Row))
}

fn build_balanced<T>(leaves: &mut [Arc<MosaicNode<T>>], direction: MosaicDirection) -> Arc<MosaicNode<T>> {
    if leaves.len() == 1 {
        return leaves[0].clone();
    }

    let mid = leaves.len().div_ceil(2);
    let (first, second) = leaves.split_at_mut(mid);
    MosaicNode::parent(
        direction,
        build_balanced(first, direction.opposite()),
        build_balanced(second, direction.opposite()),
    )
}
