//! Dynamic AABB tree for segment lookups.
//!
//! This module provides a balanced bounding-volume hierarchy that supports
//! incremental updates:
//! - Insertion with a perimeter-based cost heuristic
//! - O(1) leaf lookup for removal through [`LeafId`] handles
//! - Range queries returning every leaf whose box overlaps a query box
//!
//! # Algorithm
//!
//! Inserting descends from the root, at each inner node comparing the cost of
//! pairing the new leaf with the whole subtree against the cost of pushing it
//! into either child. A new inner node joins the chosen sibling and the new
//! leaf, then every ancestor is rebalanced and refitted on the way back up.
//!
//! Rebalancing is a single AVL-style rotation: when one child is more than
//! one level taller than the other, it is promoted, and the shorter of its
//! own children is handed down to the demoted node.
//!
//! Nodes live in a flat arena and refer to each other by index, so rotations
//! are index swaps. Freed slots are recycled.

use super::BoundingBox;
use std::fmt;

/// Handle of a leaf, returned by [`AabbTree::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(usize);

impl LeafId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
enum NodeKind<T> {
    Leaf(T),
    Inner { child1: usize, child2: usize },
    Free { next_free: Option<usize> },
}

#[derive(Clone, Debug)]
struct AabbNode<T> {
    bbox: BoundingBox,
    parent: Option<usize>,
    height: usize,
    kind: NodeKind<T>,
}

/// A dynamic, self-balancing tree of axis-aligned boxes.
///
/// Each leaf stores one item of type `T` with its box. Queries only test
/// boxes; callers re-test exact predicates on the returned items.
///
/// # Example
/// ```
/// use bitpaver::geometry::{AabbTree, BoundingBox, Point};
///
/// let mut tree = AabbTree::new();
/// let a = tree.insert(BoundingBox::from_corners(Point::new(0.0, 0.0), Point::new(1.0, 1.0)), "a");
/// tree.insert(BoundingBox::from_corners(Point::new(5.0, 5.0), Point::new(6.0, 6.0)), "b");
///
/// let hits: Vec<_> = tree.query(&BoundingBox::from_point(Point::new(0.5, 0.5))).collect();
/// assert_eq!(hits, vec![(a, &"a")]);
/// ```
#[derive(Clone)]
pub struct AabbTree<T> {
    nodes: Vec<AabbNode<T>>,
    root: Option<usize>,
    free_list: Option<usize>,
    leaf_count: usize,
}

impl<T> AabbTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            free_list: None,
            leaf_count: 0,
        }
    }

    /// Number of leaves.
    #[inline]
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 for a single leaf or an empty tree).
    #[inline]
    pub fn height(&self) -> usize {
        self.root.map_or(0, |r| self.nodes[r].height)
    }

    /// Box enclosing every leaf.
    pub fn bounding_box(&self) -> BoundingBox {
        self.root.map_or_else(BoundingBox::new, |r| self.nodes[r].bbox)
    }

    /// Item stored at a leaf, if the handle is live.
    pub fn get(&self, leaf: LeafId) -> Option<&T> {
        match self.nodes.get(leaf.0).map(|n| &n.kind) {
            Some(NodeKind::Leaf(item)) => Some(item),
            _ => None,
        }
    }

    /// Box of a leaf, if the handle is live.
    pub fn leaf_box(&self, leaf: LeafId) -> Option<BoundingBox> {
        match self.nodes.get(leaf.0) {
            Some(node @ AabbNode { kind: NodeKind::Leaf(_), .. }) => Some(node.bbox),
            _ => None,
        }
    }

    /// Insert an item with its box and return the new leaf's handle.
    pub fn insert(&mut self, bbox: BoundingBox, item: T) -> LeafId {
        let leaf = self.allocate(AabbNode {
            bbox,
            parent: None,
            height: 0,
            kind: NodeKind::Leaf(item),
        });
        self.leaf_count += 1;

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return LeafId(leaf);
        };

        let sibling = self.find_sibling(root, &bbox);
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.allocate(AabbNode {
            bbox: self.nodes[sibling].bbox.union(&bbox),
            parent: old_parent,
            height: self.nodes[sibling].height + 1,
            kind: NodeKind::Inner {
                child1: sibling,
                child2: leaf,
            },
        });
        match old_parent {
            Some(p) => self.replace_child(p, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        self.refit_upwards(Some(new_parent));
        LeafId(leaf)
    }

    /// Remove a leaf and return its item.
    ///
    /// # Panics
    /// If `leaf` is not a live leaf of this tree.
    pub fn remove(&mut self, leaf: LeafId) -> T {
        let index = leaf.0;
        assert!(
            matches!(self.nodes.get(index).map(|n| &n.kind), Some(NodeKind::Leaf(_))),
            "{leaf:?} is not a live leaf"
        );

        if self.root == Some(index) {
            self.root = None;
        } else {
            let Some(parent) = self.nodes[index].parent else {
                panic!("non-root leaf {index} has no parent");
            };
            let (child1, child2) = self.children(parent);
            let sibling = if child1 == index { child2 } else { child1 };
            match self.nodes[parent].parent {
                Some(grandparent) => {
                    self.replace_child(grandparent, parent, sibling);
                    self.nodes[sibling].parent = Some(grandparent);
                    self.release(parent);
                    self.refit_upwards(Some(grandparent));
                }
                None => {
                    self.root = Some(sibling);
                    self.nodes[sibling].parent = None;
                    self.release(parent);
                }
            }
        }

        self.leaf_count -= 1;
        match self.release(index) {
            NodeKind::Leaf(item) => item,
            _ => unreachable!("checked to be a leaf above"),
        }
    }

    /// Iterate over leaves whose box overlaps `bbox`.
    pub fn query(&self, bbox: &BoundingBox) -> Query<'_, T> {
        Query {
            tree: self,
            stack: self.root.into_iter().collect(),
            bbox: *bbox,
        }
    }

    /// Iterate over every leaf.
    pub fn iter(&self) -> impl Iterator<Item = (LeafId, &T)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match &n.kind {
            NodeKind::Leaf(item) => Some((LeafId(i), item)),
            _ => None,
        })
    }

    /// Assert every structural invariant of the tree.
    ///
    /// # Panics
    /// On the first broken parent link, stale height or box, or leaf count
    /// mismatch.
    pub fn validate(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.leaf_count, 0, "empty tree reports leaves");
            return;
        };
        assert!(self.nodes[root].parent.is_none(), "root {root} has a parent");
        let leaves = self.validate_node(root);
        assert_eq!(leaves, self.leaf_count, "leaf count mismatch");
    }

    fn validate_node(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        match node.kind {
            NodeKind::Leaf(_) => {
                assert_eq!(node.height, 0, "leaf {index} has non-zero height");
                1
            }
            NodeKind::Inner { child1, child2 } => {
                for child in [child1, child2] {
                    assert_eq!(
                        self.nodes[child].parent,
                        Some(index),
                        "child {child} does not point back to {index}"
                    );
                    assert!(
                        node.bbox.contains(&self.nodes[child].bbox),
                        "node {index} does not enclose child {child}"
                    );
                }
                let expected = 1 + self.nodes[child1].height.max(self.nodes[child2].height);
                assert_eq!(node.height, expected, "stale height at node {index}");
                self.validate_node(child1) + self.validate_node(child2)
            }
            NodeKind::Free { .. } => panic!("free node {index} reachable from root"),
        }
    }

    /// Walk down from `root` to the node the new box should be paired with.
    fn find_sibling(&self, root: usize, bbox: &BoundingBox) -> usize {
        let mut index = root;
        while let NodeKind::Inner { child1, child2 } = self.nodes[index].kind {
            let area = self.nodes[index].bbox.perimeter();
            let combined = self.nodes[index].bbox.union(bbox).perimeter();

            // Cost of creating a new parent for this node and the new leaf.
            let cost = 2.0 * combined;
            // Minimum cost of pushing the leaf further down the tree.
            let inheritance = 2.0 * (combined - area);

            let cost1 = self.descend_cost(child1, bbox) + inheritance;
            let cost2 = self.descend_cost(child2, bbox) + inheritance;

            if cost < cost1 && cost < cost2 {
                break;
            }
            index = if cost1 < cost2 { child1 } else { child2 };
        }
        index
    }

    fn descend_cost(&self, child: usize, bbox: &BoundingBox) -> f64 {
        let node = &self.nodes[child];
        let union = node.bbox.union(bbox).perimeter();
        match node.kind {
            NodeKind::Leaf(_) => union,
            _ => union - node.bbox.perimeter(),
        }
    }

    /// Rebalance and refit every node from `start` to the root.
    fn refit_upwards(&mut self, start: Option<usize>) {
        let mut current = start;
        while let Some(index) = current {
            let index = self.balance(index);
            self.refit(index);
            current = self.nodes[index].parent;
        }
    }

    /// Rotate `a` if its children differ in height by more than one.
    ///
    /// Returns the node now occupying `a`'s position.
    fn balance(&mut self, a: usize) -> usize {
        let NodeKind::Inner { child1: b, child2: c } = self.nodes[a].kind else {
            return a;
        };
        if self.nodes[a].height < 2 {
            return a;
        }

        let balance = self.nodes[c].height as isize - self.nodes[b].height as isize;
        if balance > 1 {
            self.rotate_up(a, c)
        } else if balance < -1 {
            self.rotate_up(a, b)
        } else {
            a
        }
    }

    /// Promote child `up` of `a` into `a`'s position.
    fn rotate_up(&mut self, a: usize, up: usize) -> usize {
        let (f, g) = self.children(up);

        let a_parent = self.nodes[a].parent;
        self.nodes[up].parent = a_parent;
        self.nodes[a].parent = Some(up);
        match a_parent {
            Some(p) => self.replace_child(p, a, up),
            None => self.root = Some(up),
        }

        // The taller grandchild stays with the promoted node.
        let (keep, moved) = if self.nodes[f].height > self.nodes[g].height {
            (f, g)
        } else {
            (g, f)
        };
        self.nodes[up].kind = NodeKind::Inner {
            child1: a,
            child2: keep,
        };
        self.replace_child(a, up, moved);
        self.nodes[moved].parent = Some(a);

        self.refit(a);
        self.refit(up);
        up
    }

    /// Recompute height and box of an inner node from its children.
    fn refit(&mut self, index: usize) {
        let (child1, child2) = self.children(index);
        let (n1, n2) = (&self.nodes[child1], &self.nodes[child2]);
        let height = 1 + n1.height.max(n2.height);
        let bbox = n1.bbox.union(&n2.bbox);
        let node = &mut self.nodes[index];
        node.height = height;
        node.bbox = bbox;
    }

    fn children(&self, index: usize) -> (usize, usize) {
        match self.nodes[index].kind {
            NodeKind::Inner { child1, child2 } => (child1, child2),
            _ => panic!("node {index} is not an inner node"),
        }
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        match &mut self.nodes[parent].kind {
            NodeKind::Inner { child1, .. } if *child1 == old => *child1 = new,
            NodeKind::Inner { child2, .. } if *child2 == old => *child2 = new,
            _ => panic!("node {old} is not a child of {parent}"),
        }
    }

    fn allocate(&mut self, node: AabbNode<T>) -> usize {
        match self.free_list {
            Some(index) => {
                let NodeKind::Free { next_free } = self.nodes[index].kind else {
                    panic!("free list points at live node {index}");
                };
                self.free_list = next_free;
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> NodeKind<T> {
        let node = &mut self.nodes[index];
        node.parent = None;
        node.height = 0;
        node.bbox = BoundingBox::new();
        let kind = std::mem::replace(
            &mut node.kind,
            NodeKind::Free {
                next_free: self.free_list,
            },
        );
        self.free_list = Some(index);
        kind
    }
}

impl<T> Default for AabbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AabbTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AabbTree")
            .field("leaves", &self.leaf_count)
            .field("height", &self.height())
            .field("bbox", &self.bounding_box())
            .finish()
    }
}

/// Stack-based traversal returned by [`AabbTree::query`].
pub struct Query<'a, T> {
    tree: &'a AabbTree<T>,
    stack: Vec<usize>,
    bbox: BoundingBox,
}

impl<'a, T> Iterator for Query<'a, T> {
    type Item = (LeafId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.stack.pop() {
            let node = &self.tree.nodes[index];
            if !node.bbox.overlaps(&self.bbox) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(item) => return Some((LeafId(index), item)),
                NodeKind::Inner { child1, child2 } => {
                    self.stack.push(*child1);
                    self.stack.push(*child2);
                }
                NodeKind::Free { .. } => panic!("query reached free node {index}"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn unit_box(x: f64, y: f64) -> BoundingBox {
        BoundingBox::from_corners(Point::new(x, y), Point::new(x + 1.0, y + 1.0))
    }

    #[test]
    fn test_empty_tree() {
        let tree: AabbTree<u32> = AabbTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.query(&unit_box(0.0, 0.0)).count(), 0);
        tree.validate();
    }

    #[test]
    fn test_insert_single_and_remove() {
        let mut tree = AabbTree::new();
        let id = tree.insert(unit_box(0.0, 0.0), 7);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(id), Some(&7));
        assert_eq!(tree.remove(id), 7);
        assert!(tree.is_empty());
        assert_eq!(tree.get(id), None);
        tree.validate();
    }

    #[test]
    fn test_query_returns_only_overlapping() {
        let mut tree = AabbTree::new();
        for i in 0..20 {
            tree.insert(unit_box(i as f64 * 3.0, 0.0), i);
        }
        tree.validate();

        let query = BoundingBox::from_corners(Point::new(5.5, 0.5), Point::new(9.5, 0.5));
        let mut hits: Vec<i32> = tree.query(&query).map(|(_, v)| *v).collect();
        hits.sort();
        assert_eq!(hits, vec![2, 3]);
    }

    #[test]
    fn test_sorted_inserts_stay_shallow() {
        let mut tree = AabbTree::new();
        for i in 0..256 {
            tree.insert(unit_box(i as f64 * 2.0, 0.0), i);
        }
        tree.validate();
        assert_eq!(tree.len(), 256);
        assert!(tree.height() <= 16, "height {} too large", tree.height());
    }

    #[test]
    fn test_remove_rebalances_and_reuses_slots() {
        let mut tree = AabbTree::new();
        let ids: Vec<LeafId> = (0..64)
            .map(|i| tree.insert(unit_box((i % 8) as f64 * 2.0, (i / 8) as f64 * 2.0), i))
            .collect();
        let node_count = tree.nodes.len();

        for id in ids.iter().step_by(2) {
            tree.remove(*id);
            tree.validate();
        }
        assert_eq!(tree.len(), 32);

        for i in 0..10 {
            tree.insert(unit_box(i as f64, 50.0), 100 + i);
        }
        tree.validate();
        assert_eq!(tree.nodes.len(), node_count);
    }

    #[test]
    #[should_panic(expected = "not a live leaf")]
    fn test_remove_twice_panics() {
        let mut tree = AabbTree::new();
        let a = tree.insert(unit_box(0.0, 0.0), 1);
        tree.insert(unit_box(3.0, 0.0), 2);
        tree.remove(a);
        tree.remove(a);
    }

    #[test]
    fn test_leaf_box_and_iter() {
        let mut tree = AabbTree::new();
        let a = tree.insert(unit_box(0.0, 0.0), 'a');
        tree.insert(unit_box(4.0, 4.0), 'b');
        assert_eq!(tree.leaf_box(a), Some(unit_box(0.0, 0.0)));
        assert_eq!(tree.iter().count(), 2);
        assert!(tree.bounding_box().contains(&unit_box(4.0, 4.0)));
    }
}
