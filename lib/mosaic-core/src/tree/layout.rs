use crate::geometry::{Bounds, Position, Size};
use crate::tree::{MosaicBranch, MosaicDirection, MosaicNode, MosaicPath, Side, DEFAULT_SPLIT_PERCENTAGE};

/// Divides `bounds` between the two children of a split. The first child
/// gets `split_percentage` of the extent along `direction`, rounded, and the
/// second child the remainder, so the halves always tile the input exactly.
pub fn split_bounds(bounds: &Bounds, direction: MosaicDirection, split_percentage: f64) -> (Bounds, Bounds) {
    let ratio = split_percentage.clamp(0.0, 100.0) / 100.0;
    match direction {
        MosaicDirection::Row => {
            let first_width = (bounds.size.width as f64 * ratio).round() as u32;
            (
                Bounds::from_position(bounds.position.clone(), Size::new(first_width, bounds.size.height)),
                Bounds::new(
                    bounds.position.x + first_width as i32,
                    bounds.position.y,
                    bounds.size.width - first_width,
                    bounds.size.height,
                ),
            )
        }
        MosaicDirection::Column => {
            let first_height = (bounds.size.height as f64 * ratio).round() as u32;
            (
                Bounds::from_position(bounds.position.clone(), Size::new(bounds.size.width, first_height)),
                Bounds::new(
                    bounds.position.x,
                    bounds.position.y + first_height as i32,
                    bounds.size.width,
                    bounds.size.height - first_height,
                ),
            )
        }
    }
}

/// Screen rectangle of every leaf, in first-before-second order.
pub fn compute_leaf_bounds<'a, T>(node: &'a MosaicNode<T>, bounds: &Bounds) -> Vec<(MosaicPath, &'a T, Bounds)> {
    let mut out = Vec::new();
    collect_leaf_bounds(node, bounds.clone(), &mut Vec::new(), &mut out);
    out
}

fn collect_leaf_bounds<'a, T>(
    node: &'a MosaicNode<T>,
    bounds: Bounds,
    path: &mut MosaicPath,
    out: &mut Vec<(MosaicPath, &'a T, Bounds)>,
) {
    match node {
        MosaicNode::Leaf(value) => out.push((path.clone(), value, bounds)),
        MosaicNode::Parent(parent) => {
            let (first, second) = split_bounds(&bounds, parent.direction, parent.split_percentage);

            path.push(MosaicBranch::First);
            collect_leaf_bounds(&parent.first, first, path, out);
            path.pop();

            path.push(MosaicBranch::Second);
            collect_leaf_bounds(&parent.second, second, path, out);
            path.pop();
        }
    }
}

/// Bounds the node at `path` occupies, or `None` if the path is stale.
pub fn get_bounds_at_path<T>(node: &MosaicNode<T>, bounds: &Bounds, path: &[MosaicBranch]) -> Option<Bounds> {
    let mut current = node;
    let mut bounds = bounds.clone();
    for branch in path {
        let parent = current.as_parent()?;
        let (first, second) = split_bounds(&bounds, parent.direction, parent.split_percentage);
        bounds = match branch {
            MosaicBranch::First => first,
            MosaicBranch::Second => second,
        };
        current = parent.child(*branch);
    }
    Some(bounds)
}

/// The leaf under `position` with its bounds.
pub fn find_leaf_at<T>(node: &MosaicNode<T>, bounds: &Bounds, position: &Position) -> Option<(MosaicPath, Bounds)> {
    if !bounds.contains(position) {
        return None;
    }

    let mut current = node;
    let mut bounds = bounds.clone();
    let mut path = Vec::new();
    while let MosaicNode::Parent(parent) = current {
        let (first, second) = split_bounds(&bounds, parent.direction, parent.split_percentage);
        let branch = if first.contains(position) {
            bounds = first;
            MosaicBranch::First
        } else {
            bounds = second;
            MosaicBranch::Second
        };
        path.push(branch);
        current = parent.child(branch);
    }

    Some((path, bounds))
}

/// A split bar near the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitHit {
    pub path: MosaicPath,
    pub direction: MosaicDirection,
    /// Bounds of the whole split, both children included
    pub bounds: Bounds,
    pub distance: i32,
}

/// Finds the split bar closest to `position`, if one lies within `threshold`
/// pixels. Ties go to the shallower split.
pub fn find_split_at<T>(node: &MosaicNode<T>, bounds: &Bounds, position: &Position, threshold: u32) -> Option<SplitHit> {
    let mut best = None;
    find_split_recursive(node, bounds.clone(), position, threshold as i32, &mut Vec::new(), &mut best);
    best
}

fn find_split_recursive<T>(
    node: &MosaicNode<T>,
    bounds: Bounds,
    position: &Position,
    threshold: i32,
    path: &mut MosaicPath,
    best: &mut Option<SplitHit>,
) {
    let MosaicNode::Parent(parent) = node else {
        return;
    };

    let (first, second) = split_bounds(&bounds, parent.direction, parent.split_percentage);

    let (distance, in_range) = match parent.direction {
        MosaicDirection::Row => (
            (position.x - second.position.x).abs(),
            position.y >= bounds.position.y && position.y < bounds.bottom(),
        ),
        MosaicDirection::Column => (
            (position.y - second.position.y).abs(),
            position.x >= bounds.position.x && position.x < bounds.right(),
        ),
    };

    if in_range && distance <= threshold && best.as_ref().map_or(true, |hit| distance < hit.distance) {
        *best = Some(SplitHit {
            path: path.clone(),
            direction: parent.direction,
            bounds: bounds.clone(),
            distance,
        });
    }

    path.push(MosaicBranch::First);
    find_split_recursive(&parent.first, first, position, threshold, path, best);
    path.pop();

    path.push(MosaicBranch::Second);
    find_split_recursive(&parent.second, second, position, threshold, path, best);
    path.pop();
}

/// Split percentage that puts the bar of a split occupying `bounds` under
/// `position`, clamped to `[min_percentage, 100 - min_percentage]`.
pub fn split_percentage_at(bounds: &Bounds, direction: MosaicDirection, position: &Position, min_percentage: f64) -> f64 {
    let (offset, extent) = match direction {
        MosaicDirection::Row => (position.x - bounds.position.x, bounds.size.width),
        MosaicDirection::Column => (position.y - bounds.position.y, bounds.size.height),
    };
    if extent == 0 {
        return DEFAULT_SPLIT_PERCENTAGE;
    }

    let percentage = offset as f64 / extent as f64 * 100.0;
    percentage.clamp(min_percentage, 100.0 - min_percentage)
}

/// The edge of `bounds` nearest `position` and its distance. Ties prefer
/// left, then right, then top.
pub fn get_closest_distance_from_side(bounds: &Bounds, position: &Position) -> (i32, Side) {
    let distances = [
        ((position.x - bounds.position.x).abs(), Side::Left),
        ((position.x - bounds.right()).abs(), Side::Right),
        ((position.y - bounds.position.y).abs(), Side::Top),
        ((position.y - bounds.bottom()).abs(), Side::Bottom),
    ];

    let mut closest = distances[0];
    for candidate in &distances[1..] {
        if candidate.0 < closest.0 {
            closest = *candidate;
        }
    }
    closest
}

/// Region of `bounds` a pane dropped against `side` would take, `size_ratio`
/// of the extent along that side's axis.
pub fn get_preview_for_side(bounds: &Bounds, side: Side, size_ratio: f32) -> Bounds {
    let mut preview = bounds.clone();
    let ratio = size_ratio.clamp(0.0, 1.0);
    match side {
        Side::Left => {
            preview.size.width = (bounds.size.width as f32 * ratio) as u32;
        }
        Side::Right => {
            preview.size.width = (bounds.size.width as f32 * ratio) as u32;
            preview.position.x = bounds.right() - preview.size.width as i32;
        }
        Side::Top => {
            preview.size.height = (bounds.size.height as f32 * ratio) as u32;
        }
        Side::Bottom => {
            preview.size.height = (bounds.size.height as f32 * ratio) as u32;
            preview.position.y = bounds.bottom() - preview.size.height as i32;
        }
    }
    preview
}
