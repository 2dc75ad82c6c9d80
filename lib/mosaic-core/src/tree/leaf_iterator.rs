use crate::tree::MosaicNode;

/// Depth-first walk over a tree's leaves, first child before second.
pub struct LeafIterator<'a, T> {
    stack: Vec<&'a MosaicNode<T>>,
}

impl<'a, T> LeafIterator<'a, T> {
    pub fn new(root: &'a MosaicNode<T>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a, T> Iterator for LeafIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                MosaicNode::Leaf(value) => return Some(value),
                MosaicNode::Parent(parent) => {
                    // Second is pushed first so that first is visited first
                    self.stack.push(&parent.second);
                    self.stack.push(&parent.first);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::scenario_tree;
    use crate::tree::MosaicDirection;

    #[test]
    fn test_iterator() {
        let tree = scenario_tree();
        let mut iterator = LeafIterator::new(&tree);
        assert_eq!(iterator.next(), Some(&1));
        assert_eq!(iterator.next(), Some(&2));
        assert_eq!(iterator.next(), Some(&3));
        assert!(iterator.next().is_none());
    }

    #[test]
    fn test_iterator_deep_first_branch() {
        let mut node = MosaicNode::leaf(0);
        for i in 1..10 {
            node = MosaicNode::parent(MosaicDirection::Row, node, MosaicNode::leaf(i));
        }
        let leaves: Vec<_> = LeafIterator::new(&node).copied().collect();
        assert_eq!(leaves, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_iterator_single_leaf() {
        let leaf = MosaicNode::Leaf("only");
        assert_eq!(LeafIterator::new(&leaf).collect::<Vec<_>>(), vec![&"only"]);
    }
}
