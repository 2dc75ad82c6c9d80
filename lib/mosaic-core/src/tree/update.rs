use crate::tree::{
    format_path, get_and_assert_node_at_path_exists, get_other_branch, LayoutError, LayoutResult, MosaicBranch,
    MosaicDirection, MosaicNode, MosaicParent, MosaicPath, Side, DEFAULT_SPLIT_PERCENTAGE,
};
use log::trace;
use std::sync::Arc;

/// Field level overwrite of a split. `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MosaicMerge {
    pub direction: Option<MosaicDirection>,
    pub split_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MosaicPatch<T> {
    /// Replace the subtree at the path
    Set(Arc<MosaicNode<T>>),
    /// Overwrite fields of the split at the path
    Merge(MosaicMerge),
    /// Remove the node at the path; its sibling takes the parent's place
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MosaicUpdate<T> {
    pub path: MosaicPath,
    pub patch: MosaicPatch<T>,
}

impl<T> MosaicUpdate<T> {
    pub fn set(path: MosaicPath, node: Arc<MosaicNode<T>>) -> Self {
        Self {
            path,
            patch: MosaicPatch::Set(node),
        }
    }

    pub fn split_percentage(path: MosaicPath, split_percentage: f64) -> Self {
        Self {
            path,
            patch: MosaicPatch::Merge(MosaicMerge {
                split_percentage: Some(split_percentage),
                ..MosaicMerge::default()
            }),
        }
    }

    pub fn remove(path: MosaicPath) -> Self {
        Self {
            path,
            patch: MosaicPatch::Remove,
        }
    }
}

/// An update rewritten against the original tree: removals become a `Set`
/// of the sibling at the parent path.
struct ResolvedUpdate<'a, T> {
    path: &'a [MosaicBranch],
    patch: ResolvedPatch<'a, T>,
}

enum ResolvedPatch<'a, T> {
    Set(Arc<MosaicNode<T>>),
    Merge(&'a MosaicMerge),
}

impl<T> ResolvedUpdate<'_, T> {
    fn apply(&self, node: &Arc<MosaicNode<T>>) -> LayoutResult<Arc<MosaicNode<T>>> {
        match &self.patch {
            ResolvedPatch::Set(replacement) => Ok(replacement.clone()),
            ResolvedPatch::Merge(merge) => match node.as_ref() {
                MosaicNode::Parent(parent) => Ok(Arc::new(MosaicNode::Parent(MosaicParent {
                    direction: merge.direction.unwrap_or(parent.direction),
                    first: parent.first.clone(),
                    second: parent.second.clone(),
                    split_percentage: merge.split_percentage.unwrap_or(parent.split_percentage),
                }))),
                MosaicNode::Leaf(_) => Err(LayoutError::NotAParent(self.path.to_vec())),
            },
        }
    }
}

/// Applies `updates` to `tree` and returns the new root.
///
/// All updates address the original tree; they are not applied one after the
/// other. Only nodes between a patched node and the root are reallocated,
/// every other subtree is the same `Arc` in the result. Updates whose paths
/// overlap (one is a prefix of the other, a removal counting as its parent's
/// path) are rejected.
pub fn update_tree<T>(
    tree: &Arc<MosaicNode<T>>,
    updates: &[MosaicUpdate<T>],
) -> LayoutResult<Arc<MosaicNode<T>>> {
    if updates.is_empty() {
        return Ok(tree.clone());
    }

    let resolved = updates
        .iter()
        .map(|update| resolve_update(tree, update))
        .collect::<LayoutResult<Vec<_>>>()?;
    check_overlaps(&resolved)?;

    trace!(
        "Applying {} update(s) at [{}]",
        resolved.len(),
        resolved
            .iter()
            .map(|update| format_path(update.path))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let refs: Vec<&ResolvedUpdate<T>> = resolved.iter().collect();
    apply_resolved(tree, &refs, 0)
}

fn resolve_update<'a, T>(
    tree: &Arc<MosaicNode<T>>,
    update: &'a MosaicUpdate<T>,
) -> LayoutResult<ResolvedUpdate<'a, T>> {
    match &update.patch {
        MosaicPatch::Set(node) => Ok(ResolvedUpdate {
            path: &update.path,
            patch: ResolvedPatch::Set(node.clone()),
        }),
        MosaicPatch::Merge(merge) => {
            if let Some(percentage) = merge.split_percentage {
                if !(0.0..=100.0).contains(&percentage) {
                    return Err(LayoutError::InvalidSplitPercentage(percentage));
                }
            }
            Ok(ResolvedUpdate {
                path: &update.path,
                patch: ResolvedPatch::Merge(merge),
            })
        }
        MosaicPatch::Remove => {
            let (parent, sibling) = resolve_removal(tree, &update.path)?;
            Ok(ResolvedUpdate {
                path: parent,
                patch: ResolvedPatch::Set(sibling),
            })
        }
    }
}

fn check_overlaps<T>(updates: &[ResolvedUpdate<T>]) -> LayoutResult<()> {
    for (i, a) in updates.iter().enumerate() {
        for b in &updates[i + 1..] {
            if a.path.starts_with(b.path) || b.path.starts_with(a.path) {
                return Err(LayoutError::OverlappingUpdates(a.path.to_vec(), b.path.to_vec()));
            }
        }
    }
    Ok(())
}

fn apply_resolved<T>(
    node: &Arc<MosaicNode<T>>,
    updates: &[&ResolvedUpdate<T>],
    depth: usize,
) -> LayoutResult<Arc<MosaicNode<T>>> {
    if updates.is_empty() {
        return Ok(node.clone());
    }

    // Overlaps were rejected, so an update ending here is the only one in this subtree
    if let Some(update) = updates.iter().find(|update| update.path.len() == depth) {
        return update.apply(node);
    }

    let MosaicNode::Parent(parent) = node.as_ref() else {
        return Err(LayoutError::StalePath(updates[0].path.to_vec()));
    };

    let (first, second): (Vec<&ResolvedUpdate<T>>, Vec<&ResolvedUpdate<T>>) = updates
        .iter()
        .copied()
        .partition(|update| update.path[depth] == MosaicBranch::First);

    Ok(Arc::new(MosaicNode::Parent(MosaicParent {
        direction: parent.direction,
        first: apply_resolved(&parent.first, &first, depth + 1)?,
        second: apply_resolved(&parent.second, &second, depth + 1)?,
        split_percentage: parent.split_percentage,
    })))
}

/// Update that removes the node at `path` by putting its sibling in the
/// parent's place.
pub fn create_remove_update<T>(
    tree: &Arc<MosaicNode<T>>,
    path: &[MosaicBranch],
) -> LayoutResult<MosaicUpdate<T>> {
    let (parent, sibling) = resolve_removal(tree, path)?;
    Ok(MosaicUpdate::set(parent.to_vec(), sibling))
}

/// The parent path of `path` and the sibling that replaces it.
fn resolve_removal<'p, T>(
    tree: &Arc<MosaicNode<T>>,
    path: &'p [MosaicBranch],
) -> LayoutResult<(&'p [MosaicBranch], Arc<MosaicNode<T>>)> {
    let Some((&branch, parent)) = path.split_last() else {
        return Err(LayoutError::CannotRemoveRoot);
    };
    get_and_assert_node_at_path_exists(tree, path)?;
    let mut sibling_path = parent.to_vec();
    sibling_path.push(get_other_branch(branch));
    let sibling = get_and_assert_node_at_path_exists(tree, &sibling_path)?;
    Ok((parent, sibling.clone()))
}

/// Update that splits the node at `path`, keeping it first and adding a
/// new pane second.
pub fn create_split_update<T>(
    tree: &Arc<MosaicNode<T>>,
    path: &[MosaicBranch],
    direction: MosaicDirection,
    create_node: impl FnOnce() -> T,
) -> LayoutResult<MosaicUpdate<T>> {
    let existing = get_and_assert_node_at_path_exists(tree, path)?.clone();
    Ok(MosaicUpdate::set(
        path.to_vec(),
        MosaicNode::parent(direction, existing, MosaicNode::leaf(create_node())),
    ))
}

fn drop_split<T>(
    side: Side,
    source: Arc<MosaicNode<T>>,
    destination: Arc<MosaicNode<T>>,
    split_percentage: f64,
) -> Arc<MosaicNode<T>> {
    let (first, second) = if side.is_before() {
        (source, destination)
    } else {
        (destination, source)
    };
    Arc::new(MosaicNode::Parent(MosaicParent {
        direction: side.direction(),
        first,
        second,
        split_percentage,
    }))
}

/// Updates that move the node at `source` against `side` of the node at
/// `destination`.
///
/// The result never contains overlapping paths: when the destination sits in
/// the source's sibling subtree, or above the source, the removal and the
/// insertion are folded into a single `Set`.
pub fn create_drag_to_updates<T>(
    tree: &Arc<MosaicNode<T>>,
    source: &[MosaicBranch],
    destination: &[MosaicBranch],
    side: Side,
) -> LayoutResult<Vec<MosaicUpdate<T>>> {
    create_drag_to_updates_with_split(tree, source, destination, side, DEFAULT_SPLIT_PERCENTAGE)
}

/// Same as [`create_drag_to_updates`], giving the split created at the drop
/// site `split_percentage`.
pub fn create_drag_to_updates_with_split<T>(
    tree: &Arc<MosaicNode<T>>,
    source: &[MosaicBranch],
    destination: &[MosaicBranch],
    side: Side,
    split_percentage: f64,
) -> LayoutResult<Vec<MosaicUpdate<T>>> {
    let Some((&source_branch, source_parent)) = source.split_last() else {
        return Err(LayoutError::CannotRemoveRoot);
    };
    if destination.starts_with(source) {
        return Err(LayoutError::InvalidDrop {
            from: source.to_vec(),
            onto: destination.to_vec(),
        });
    }

    let source_node = get_and_assert_node_at_path_exists(tree, source)?.clone();
    let destination_node = get_and_assert_node_at_path_exists(tree, destination)?;

    if source.starts_with(destination) {
        // Destination is an ancestor: take the source out of it first
        let removal = create_remove_update(destination_node, &source[destination.len()..])?;
        let remaining = update_tree(destination_node, &[removal])?;
        return Ok(vec![MosaicUpdate::set(
            destination.to_vec(),
            drop_split(side, source_node, remaining, split_percentage),
        )]);
    }

    let insertion = drop_split(side, source_node, destination_node.clone(), split_percentage);

    let mut sibling_path = source_parent.to_vec();
    sibling_path.push(source_branch.other());
    if destination.starts_with(&sibling_path) {
        // The sibling replaces the parent, so insert into it and move it up in one step
        let sibling = get_and_assert_node_at_path_exists(tree, &sibling_path)?;
        let relative = destination[sibling_path.len()..].to_vec();
        let folded = update_tree(sibling, &[MosaicUpdate::set(relative, insertion)])?;
        return Ok(vec![MosaicUpdate::set(source_parent.to_vec(), folded)]);
    }

    Ok(vec![
        create_remove_update(tree, source)?,
        MosaicUpdate::set(destination.to_vec(), insertion),
    ])
}

/// Where the node at `path` lives after the updates from
/// [`create_drag_to_updates`] with the same arguments are applied.
pub fn rebase_path_after_drag(
    path: &[MosaicBranch],
    source: &[MosaicBranch],
    destination: &[MosaicBranch],
    side: Side,
) -> MosaicPath {
    let Some((&source_branch, source_parent)) = source.split_last() else {
        return path.to_vec();
    };

    // Removing the source lifts its sibling's subtree into the parent's place
    let collapse = |p: &[MosaicBranch]| -> MosaicPath {
        let depth = source_parent.len();
        if p.len() > depth && p.starts_with(source_parent) && p[depth] == source_branch.other() {
            let mut collapsed = source_parent.to_vec();
            collapsed.extend_from_slice(&p[depth + 1..]);
            collapsed
        } else {
            p.to_vec()
        }
    };

    let target = collapse(destination);
    if path.starts_with(source) {
        let mut moved = target;
        moved.push(side.branch());
        moved.extend_from_slice(&path[source.len()..]);
        return moved;
    }

    let collapsed = collapse(path);
    if collapsed.starts_with(&target) {
        let mut pushed = target.clone();
        pushed.push(side.branch().other());
        pushed.extend_from_slice(&collapsed[target.len()..]);
        return pushed;
    }
    collapsed
}
