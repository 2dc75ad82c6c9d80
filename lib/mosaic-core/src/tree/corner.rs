use crate::tree::{
    get_and_assert_node_at_path_exists, get_node_at_path, parent_path, update_tree, LayoutResult,
    MosaicBranch, MosaicDirection, MosaicNode, MosaicParent, MosaicPatch, MosaicPath, MosaicUpdate,
    DEFAULT_SPLIT_PERCENTAGE,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn is_left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// The child of a split in `direction` that lies nearest this corner.
    pub fn nearest_branch(&self, direction: MosaicDirection) -> MosaicBranch {
        let before = match direction {
            MosaicDirection::Row => self.is_left(),
            MosaicDirection::Column => self.is_top(),
        };
        if before {
            MosaicBranch::First
        } else {
            MosaicBranch::Second
        }
    }
}

/// Path to the leaf occupying `corner` of the layout.
///
/// Each split is descended towards the corner along its own axis, so a row
/// picks by left/right and a column by top/bottom.
pub fn get_path_to_corner<T>(tree: &MosaicNode<T>, corner: Corner) -> MosaicPath {
    let mut path = Vec::new();
    let mut current = tree;
    while let MosaicNode::Parent(parent) = current {
        let branch = corner.nearest_branch(parent.direction);
        path.push(branch);
        current = parent.child(branch);
    }
    path
}

/// Inserts a new pane into `corner`.
///
/// The leaf currently in the corner is split perpendicular to its parent
/// (a row when it is the root) and the new pane takes the half nearest the
/// corner. On an empty tree the new pane becomes the whole layout.
/// `create_node` is called exactly once.
pub fn add_to_corner<T>(
    tree: Option<&Arc<MosaicNode<T>>>,
    corner: Corner,
    root_direction: MosaicDirection,
    create_node: impl FnOnce() -> T,
) -> LayoutResult<Arc<MosaicNode<T>>> {
    let Some(tree) = tree else {
        return Ok(MosaicNode::leaf(create_node()));
    };

    let update = create_corner_update(tree, corner, root_direction, create_node)?;
    update_tree(tree, &[update])
}

/// The single update that [`add_to_corner`] applies to a non-empty tree.
pub fn create_corner_update<T>(
    tree: &Arc<MosaicNode<T>>,
    corner: Corner,
    root_direction: MosaicDirection,
    create_node: impl FnOnce() -> T,
) -> LayoutResult<MosaicUpdate<T>> {
    let path = get_path_to_corner(tree, corner);
    let destination = get_and_assert_node_at_path_exists(tree, &path)?.clone();
    let direction = parent_path(&path)
        .and_then(|parent| get_node_at_path(tree, parent))
        .and_then(|parent| parent.as_parent())
        .map(|parent| parent.direction.opposite())
        .unwrap_or(root_direction);

    let new_pane = MosaicNode::leaf(create_node());
    let (first, second) = match corner.nearest_branch(direction) {
        MosaicBranch::First => (new_pane, destination),
        MosaicBranch::Second => (destination, new_pane),
    };

    Ok(MosaicUpdate {
        path,
        patch: MosaicPatch::Set(Arc::new(MosaicNode::Parent(MosaicParent {
            direction,
            first,
            second,
            split_percentage: DEFAULT_SPLIT_PERCENTAGE,
        }))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::{assert_leaf, assert_parent, scenario_tree};
    use crate::tree::{create_balanced_tree_from_leaves, get_leaves};
    use MosaicBranch::{First, Second};

    #[test]
    fn test_path_to_corner_scenario() {
        let tree = scenario_tree();
        let path = get_path_to_corner(&tree, Corner::TopRight);
        assert_eq!(path, vec![Second, First]);
        assert_leaf(get_node_at_path(&tree, &path).unwrap(), 2);
    }

    #[test]
    fn test_path_to_each_corner() {
        let tree = scenario_tree();
        assert_eq!(get_path_to_corner(&tree, Corner::TopLeft), vec![First]);
        assert_eq!(get_path_to_corner(&tree, Corner::BottomLeft), vec![First]);
        assert_eq!(get_path_to_corner(&tree, Corner::BottomRight), vec![Second, Second]);
    }

    #[test]
    fn test_path_to_corner_on_leaf_is_root() {
        let leaf = MosaicNode::Leaf(1);
        assert!(get_path_to_corner(&leaf, Corner::BottomRight).is_empty());
    }

    #[test]
    fn test_path_to_corner_is_deterministic_and_ends_at_leaf() {
        let tree = create_balanced_tree_from_leaves(0..13).unwrap();
        for corner in Corner::ALL {
            let path = get_path_to_corner(&tree, corner);
            assert_eq!(path, get_path_to_corner(&tree, corner));
            assert!(get_node_at_path(&tree, &path).unwrap().is_leaf());
        }
    }

    #[test]
    fn test_add_to_top_right_scenario() {
        let tree = scenario_tree();
        let updated = add_to_corner(Some(&tree), Corner::TopRight, MosaicDirection::Row, || 4).unwrap();

        let split = assert_parent(get_node_at_path(&updated, &[Second, First]).unwrap());
        assert_eq!(split.direction, MosaicDirection::Row);
        assert_leaf(&split.first, 2);
        assert_leaf(&split.second, 4);
        assert_eq!(get_leaves(Some(updated.as_ref())), vec![1, 2, 4, 3]);

        // The untouched siblings are shared with the original tree
        let original_root = assert_parent(&tree);
        let updated_root = assert_parent(&updated);
        assert!(Arc::ptr_eq(&original_root.first, &updated_root.first));
        assert_eq!(updated_root.split_percentage, 40.0);
    }

    #[test]
    fn test_add_to_bottom_left_places_new_pane_below() {
        let tree = scenario_tree();
        let updated = add_to_corner(Some(&tree), Corner::BottomLeft, MosaicDirection::Row, || 9).unwrap();

        let split = assert_parent(get_node_at_path(&updated, &[First]).unwrap());
        assert_eq!(split.direction, MosaicDirection::Column);
        assert_leaf(&split.first, 1);
        assert_leaf(&split.second, 9);
    }

    #[test]
    fn test_add_to_corner_of_single_leaf_uses_root_direction() {
        let tree = MosaicNode::leaf(1);
        let updated = add_to_corner(Some(&tree), Corner::TopLeft, MosaicDirection::Row, || 2).unwrap();
        let root = assert_parent(&updated);
        assert_eq!(root.direction, MosaicDirection::Row);
        assert_leaf(&root.first, 2);
        assert_leaf(&root.second, 1);

        let updated = add_to_corner(Some(&tree), Corner::BottomRight, MosaicDirection::Column, || 2).unwrap();
        let root = assert_parent(&updated);
        assert_eq!(root.direction, MosaicDirection::Column);
        assert_leaf(&root.first, 1);
        assert_leaf(&root.second, 2);
    }

    #[test]
    fn test_add_to_corner_of_empty_tree() {
        let mut calls = 0;
        let tree = add_to_corner::<u32>(None, Corner::TopRight, MosaicDirection::Row, || {
            calls += 1;
            1
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_leaf(&tree, 1);
    }

    #[test]
    fn test_repeated_insertion_keeps_new_pane_in_corner() {
        let mut tree = MosaicNode::leaf(0);
        let mut next = 0;
        for _ in 0..6 {
            tree = add_to_corner(Some(&tree), Corner::TopRight, MosaicDirection::Row, || {
                next += 1;
                next
            })
            .unwrap();
            let path = get_path_to_corner(&tree, Corner::TopRight);
            assert_leaf(get_node_at_path(&tree, &path).unwrap(), next);
        }
    }
}
