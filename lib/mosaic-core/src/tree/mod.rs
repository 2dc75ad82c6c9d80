pub use balanced::*;
pub use corner::*;
pub use layout::*;
pub use leaf_iterator::LeafIterator;
pub use update::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

mod balanced;
mod corner;
mod layout;
mod leaf_iterator;
pub mod serialization;
mod update;

pub const DEFAULT_SPLIT_PERCENTAGE: f64 = 50.0;

fn default_split_percentage() -> f64 {
    DEFAULT_SPLIT_PERCENTAGE
}

/// Axis a parent splits its space along. `Row` places children side by side,
/// `Column` stacks them.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MosaicDirection {
    Row,
    Column,
}

impl MosaicDirection {
    pub fn opposite(&self) -> Self {
        match self {
            MosaicDirection::Row => MosaicDirection::Column,
            MosaicDirection::Column => MosaicDirection::Row,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MosaicBranch {
    First,
    Second,
}

impl MosaicBranch {
    pub fn other(&self) -> Self {
        match self {
            MosaicBranch::First => MosaicBranch::Second,
            MosaicBranch::Second => MosaicBranch::First,
        }
    }
}

/// Sequence of branches leading from the root to a node. Empty is the root.
pub type MosaicPath = Vec<MosaicBranch>;

/// Edge of a pane that another pane is placed against.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn direction(&self) -> MosaicDirection {
        match self {
            Side::Left | Side::Right => MosaicDirection::Row,
            Side::Top | Side::Bottom => MosaicDirection::Column,
        }
    }

    pub fn is_before(&self) -> bool {
        matches!(self, Side::Left | Side::Top)
    }

    /// Branch a node placed against this side occupies in the new split.
    pub fn branch(&self) -> MosaicBranch {
        if self.is_before() {
            MosaicBranch::First
        } else {
            MosaicBranch::Second
        }
    }
}

/// A node of the layout tree. Leaves carry a caller supplied pane identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MosaicNode<T> {
    Parent(MosaicParent<T>),
    Leaf(T),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicParent<T> {
    pub direction: MosaicDirection,
    pub first: Arc<MosaicNode<T>>,
    pub second: Arc<MosaicNode<T>>,
    #[serde(default = "default_split_percentage")]
    pub split_percentage: f64,
}

/// A whole layout. `None` is the empty layout with zero panes.
pub type MosaicTree<T> = Option<Arc<MosaicNode<T>>>;

impl<T> MosaicParent<T> {
    pub fn new(direction: MosaicDirection, first: Arc<MosaicNode<T>>, second: Arc<MosaicNode<T>>) -> Self {
        Self {
            direction,
            first,
            second,
            split_percentage: DEFAULT_SPLIT_PERCENTAGE,
        }
    }

    pub fn child(&self, branch: MosaicBranch) -> &Arc<MosaicNode<T>> {
        match branch {
            MosaicBranch::First => &self.first,
            MosaicBranch::Second => &self.second,
        }
    }
}

impl<T> MosaicNode<T> {
    pub fn leaf(value: T) -> Arc<Self> {
        Arc::new(MosaicNode::Leaf(value))
    }

    pub fn parent(direction: MosaicDirection, first: Arc<Self>, second: Arc<Self>) -> Arc<Self> {
        Arc::new(MosaicNode::Parent(MosaicParent::new(direction, first, second)))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MosaicNode::Leaf(_))
    }

    pub fn as_parent(&self) -> Option<&MosaicParent<T>> {
        match self {
            MosaicNode::Parent(parent) => Some(parent),
            MosaicNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            MosaicNode::Leaf(value) => Some(value),
            MosaicNode::Parent(_) => None,
        }
    }

    /// Iterates leaf values first-before-second.
    pub fn leaves(&self) -> LeafIterator<'_, T> {
        LeafIterator::new(self)
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            MosaicNode::Leaf(_) => 0,
            MosaicNode::Parent(parent) => 1 + parent.first.depth().max(parent.second.depth()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Path does not address a node in the current tree: {}", format_path(.0))]
    StalePath(MosaicPath),

    #[error("Updates overlap at paths {} and {}", format_path(.0), format_path(.1))]
    OverlappingUpdates(MosaicPath, MosaicPath),

    #[error("Node at {} is a leaf, expected a split", format_path(.0))]
    NotAParent(MosaicPath),

    #[error("The root node cannot be removed")]
    CannotRemoveRoot,

    #[error("Split percentage {0} is outside [0, 100]")]
    InvalidSplitPercentage(f64),

    #[error("Cannot drop {} onto {}", format_path(.from), format_path(.onto))]
    InvalidDrop { from: MosaicPath, onto: MosaicPath },

    #[error("Invalid path segment: {0}")]
    InvalidPathSegment(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

pub fn get_other_direction(direction: MosaicDirection) -> MosaicDirection {
    direction.opposite()
}

pub fn get_other_branch(branch: MosaicBranch) -> MosaicBranch {
    branch.other()
}

/// All leaf values, first-before-second. An empty tree has no leaves.
pub fn get_leaves<T: Clone>(tree: Option<&MosaicNode<T>>) -> Vec<T> {
    tree.map(|node| node.leaves().cloned().collect())
        .unwrap_or_default()
}

/// Walks `path` from `tree`. Returns `None` when the path no longer matches
/// the tree's structure; callers should recompute the path.
pub fn get_node_at_path<'a, T>(
    tree: &'a Arc<MosaicNode<T>>,
    path: &[MosaicBranch],
) -> Option<&'a Arc<MosaicNode<T>>> {
    let mut current = tree;
    for branch in path {
        current = current.as_parent()?.child(*branch);
    }
    Some(current)
}

pub fn get_and_assert_node_at_path_exists<'a, T>(
    tree: &'a Arc<MosaicNode<T>>,
    path: &[MosaicBranch],
) -> LayoutResult<&'a Arc<MosaicNode<T>>> {
    get_node_at_path(tree, path).ok_or_else(|| LayoutError::StalePath(path.to_vec()))
}

/// The path without its last branch. The root has no parent.
pub fn parent_path(path: &[MosaicBranch]) -> Option<&[MosaicBranch]> {
    path.split_last().map(|(_, parent)| parent)
}

pub fn is_path_prefix(prefix: &[MosaicBranch], path: &[MosaicBranch]) -> bool {
    path.starts_with(prefix)
}

pub fn format_path(path: &[MosaicBranch]) -> String {
    if path.is_empty() {
        return "root".to_owned();
    }
    path.iter()
        .map(|branch| match branch {
            MosaicBranch::First => "first",
            MosaicBranch::Second => "second",
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Parses `first.second`, `0.1` or mixed forms. `""` and `root` are the root.
pub fn parse_path(text: &str) -> LayoutResult<MosaicPath> {
    let text = text.trim();
    if text.is_empty() || text == "root" {
        return Ok(Vec::new());
    }
    text.split('.')
        .map(|segment| match segment.trim() {
            "first" | "0" => Ok(MosaicBranch::First),
            "second" | "1" => Ok(MosaicBranch::Second),
            other => Err(LayoutError::InvalidPathSegment(other.to_owned())),
        })
        .collect()
}

impl fmt::Display for MosaicDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MosaicDirection::Row => write!(f, "row"),
            MosaicDirection::Column => write!(f, "column"),
        }
    }
}
