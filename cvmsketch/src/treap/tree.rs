// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The treap itself: bounded search, insert with bubble-up, delete with
//! successor splice and sift-down.

use crate::error::Error;
use crate::fixed::Q31;
use crate::treap::arena::NodeArena;
use crate::treap::arena::NodeId;

/// Hard cap on the configurable height bound.
///
/// The insert path records up to this many nodes in a stack-local scratch
/// array, so the cap keeps every operation free of heap allocation. 64 leaves
/// a wide margin over the expected depth of any random-priority treap whose
/// size fits a `u32`.
pub const MAX_HEIGHT_LIMIT: usize = 64;

/// A key/priority pair resident in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample<K> {
    key: K,
    priority: Q31,
}

impl<K: Copy> Sample<K> {
    /// Returns the key.
    pub fn key(&self) -> K {
        self.key
    }

    /// Returns the priority drawn for this occurrence.
    pub fn priority(&self) -> Q31 {
        self.priority
    }
}

/// The storage location currently holding the reference to a subtree root:
/// the tree's root link, or a child link of a named node.
///
/// Rotations and splices write through a `Link`, so the root and every
/// interior edge go through the same code path and nodes carry no parent
/// references.
#[derive(Debug, Clone, Copy)]
enum Link {
    Root,
    Left(NodeId),
    Right(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    Left,
    Right,
}

/// A capacity-bounded treap: a binary search tree on keys kept as a max-heap
/// on per-node priorities, with every traversal capped at a fixed height.
///
/// Keys equal to a node's key are ordered to its right; the tree itself never
/// rejects duplicates. Callers that need set semantics must delete before
/// inserting, which is exactly what the CVM estimator does.
#[derive(Debug)]
pub struct Treap<K> {
    arena: NodeArena<K>,
    root: Option<NodeId>,
    max_height: usize,
}

impl<K: Copy + Ord> Treap<K> {
    /// Creates a treap with room for `capacity` samples and every traversal
    /// capped at `max_height` steps.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit a `u32` index, or if
    /// `max_height` is not in `[1, MAX_HEIGHT_LIMIT]`.
    pub fn new(capacity: usize, max_height: usize) -> Self {
        assert!(
            (1..=MAX_HEIGHT_LIMIT).contains(&max_height),
            "max_height must be in [1, {MAX_HEIGHT_LIMIT}], got {max_height}"
        );
        Self {
            arena: NodeArena::new(capacity),
            root: None,
            max_height,
        }
    }

    /// Number of resident samples.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true when no sample is resident.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the configured height bound.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Returns true while at least one free slot remains.
    pub fn has_space(&self) -> bool {
        self.arena.has_space()
    }

    /// Returns the sample with the maximal priority, held by the root.
    pub fn top(&self) -> Option<Sample<K>> {
        self.root.map(|id| self.sample(id))
    }

    /// Looks up `key`.
    ///
    /// Fails with [`crate::error::ErrorKind::KeyNotFound`] when an empty
    /// link proves the key absent, and with
    /// [`crate::error::ErrorKind::HeightExceeded`] when the search path hit
    /// the height bound without resolving. The latter signals a corrupted or
    /// pathologically shaped tree, not ordinary absence.
    pub fn find(&self, key: K) -> Result<Sample<K>, Error> {
        let (id, _) = self.locate(key)?;
        Ok(self.sample(id))
    }

    /// Inserts `key` with `priority`, restoring heap order by rotating the
    /// new node up the recorded search path.
    ///
    /// Fails with `NoSpace` when the arena is exhausted and with
    /// `HeightExceeded` when no empty link exists within the height bound;
    /// on the latter the reserved slot is released again and the tree is
    /// unchanged.
    pub fn insert(&mut self, key: K, priority: Q31) -> Result<(), Error> {
        let id = self.arena.allocate(key, priority)?;

        // Descend to an empty link, recording the path for the bubble-up
        // pass. Equal keys go right.
        let mut path = [NodeId(0); MAX_HEIGHT_LIMIT]; // entries past `depth` are never read
        let mut depth = 0;
        let mut link = Link::Root;
        let mut cursor = self.root;
        while depth < self.max_height {
            let Some(current) = cursor else { break };
            path[depth] = current;
            depth += 1;
            let node = self.arena.node(current);
            if key < node.key {
                link = Link::Left(current);
                cursor = node.left;
            } else {
                link = Link::Right(current);
                cursor = node.right;
            }
        }
        if depth >= self.max_height {
            // No empty link within the bound; give the reserved slot back.
            self.arena.release(id);
            return Err(Error::height_exceeded("insert", self.max_height));
        }
        self.set_child(link, Some(id));

        // Bubble the new node up while it outranks its parent, rotating
        // through the link that currently points at the parent. Ancestors on
        // the recorded path are unaffected by rotations below them.
        let mut index = depth;
        while index > 0 {
            index -= 1;
            let parent = path[index];
            if self.arena.node(id).priority <= self.arena.node(parent).priority {
                break;
            }
            let above = if index > 0 {
                self.parent_link(path[index - 1], parent)
            } else {
                Link::Root
            };
            let direction = if self.arena.node(parent).left == Some(id) {
                Rotation::Right
            } else {
                Rotation::Left
            };
            self.rotate(above, direction);
        }
        Ok(())
    }

    /// Deletes the sample holding `key` and releases its slot.
    ///
    /// Fails with `KeyNotFound` when the key is absent (routine for the
    /// estimator) and with `HeightExceeded` when the successor search or the
    /// sift-down hits the height bound. A sift-down failure still releases
    /// the removed node before propagating.
    pub fn delete(&mut self, key: K) -> Result<(), Error> {
        let (id, link) = self.locate(key)?;
        let node = self.arena.node(id);
        match (node.left, node.right) {
            (None, None) => self.set_child(link, None),
            (None, Some(child)) | (Some(child), None) => self.set_child(link, Some(child)),
            (Some(_), Some(right)) => {
                // Two children: move the in-order successor (leftmost node
                // of the right subtree) into the vacated position.
                let (successor, successor_link) = self.leftmost(id, right)?;

                // Detach the successor, promoting its right child. When the
                // successor is the right child itself this rewrites `id`'s
                // right link, so both links are re-read afterwards.
                let promoted = self.arena.node(successor).right;
                self.set_child(successor_link, promoted);
                let node = self.arena.node(id);
                let (left, right) = (node.left, node.right);
                let successor_node = self.arena.node_mut(successor);
                successor_node.left = left;
                successor_node.right = right;
                self.set_child(link, Some(successor));

                // The move may leave the successor outranked by its new
                // children.
                let sifted = self.sift_down(link);
                self.arena.release(id);
                return sifted;
            }
        }
        self.arena.release(id);
        Ok(())
    }

    /// Removes every sample at once.
    pub fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
    }

    fn sample(&self, id: NodeId) -> Sample<K> {
        let node = self.arena.node(id);
        Sample {
            key: node.key,
            priority: node.priority,
        }
    }

    /// Walks from the root to the node holding `key`, returning it together
    /// with the link that points at it.
    fn locate(&self, key: K) -> Result<(NodeId, Link), Error> {
        let mut link = Link::Root;
        let mut cursor = self.root;
        for _ in 0..self.max_height {
            let Some(id) = cursor else {
                return Err(Error::key_not_found());
            };
            let node = self.arena.node(id);
            if key < node.key {
                link = Link::Left(id);
                cursor = node.left;
            } else if key == node.key {
                return Ok((id, link));
            } else {
                link = Link::Right(id);
                cursor = node.right;
            }
        }
        // The walk consumed the whole budget. An empty cursor still proves
        // the key absent; a live one means the path outgrew the bound.
        if cursor.is_none() {
            Err(Error::key_not_found())
        } else {
            Err(Error::height_exceeded("find", self.max_height))
        }
    }

    /// Finds the leftmost node of the right subtree of `id` (the in-order
    /// successor) and the link pointing at it.
    fn leftmost(&self, id: NodeId, right: NodeId) -> Result<(NodeId, Link), Error> {
        let mut link = Link::Right(id);
        let mut cursor = right;
        for _ in 0..self.max_height {
            match self.arena.node(cursor).left {
                None => return Ok((cursor, link)),
                Some(next) => {
                    link = Link::Left(cursor);
                    cursor = next;
                }
            }
        }
        Err(Error::height_exceeded("delete", self.max_height))
    }

    /// Sifts the node at `link` down until neither child outranks it,
    /// rotating the higher-priority child up at each step; ties go left.
    fn sift_down(&mut self, mut link: Link) -> Result<(), Error> {
        let Some(id) = self.child(link) else {
            return Ok(());
        };
        let priority = self.arena.node(id).priority;
        for _ in 0..self.max_height {
            let node = self.arena.node(id);
            let left = node.left.map(|child| self.arena.node(child).priority);
            let right = node.right.map(|child| self.arena.node(child).priority);
            let direction = match (left, right) {
                (None, None) => return Ok(()),
                (Some(l), None) if priority >= l => return Ok(()),
                (Some(_), None) => Rotation::Right,
                (None, Some(r)) if priority >= r => return Ok(()),
                (None, Some(_)) => Rotation::Left,
                (Some(l), Some(r)) if priority >= l && priority >= r => return Ok(()),
                (Some(l), Some(r)) => {
                    if l <= r {
                        Rotation::Left
                    } else {
                        Rotation::Right
                    }
                }
            };
            self.rotate(link, direction);
            // The node now hangs under the child that was promoted past it.
            let Some(top) = self.child(link) else {
                return Ok(());
            };
            link = match direction {
                Rotation::Left => Link::Left(top),
                Rotation::Right => Link::Right(top),
            };
        }
        Err(Error::height_exceeded("delete", self.max_height))
    }

    /// Rotates the subtree reachable through `link` one step in `direction`,
    /// exchanging the roles of the subtree root and the promoted child and
    /// reattaching the subtree that crosses over. O(1); no other nodes are
    /// visited.
    fn rotate(&mut self, link: Link, direction: Rotation) {
        let Some(parent) = self.child(link) else {
            return;
        };
        let child = match direction {
            Rotation::Right => self.arena.node(parent).left,
            Rotation::Left => self.arena.node(parent).right,
        };
        let Some(child) = child else { return };
        self.set_child(link, Some(child));
        match direction {
            Rotation::Right => {
                let crossing = self.arena.node(child).right;
                self.arena.node_mut(child).right = Some(parent);
                self.arena.node_mut(parent).left = crossing;
            }
            Rotation::Left => {
                let crossing = self.arena.node(child).left;
                self.arena.node_mut(child).left = Some(parent);
                self.arena.node_mut(parent).right = crossing;
            }
        }
    }

    /// Returns the link through which `parent` points at `child`.
    fn parent_link(&self, parent: NodeId, child: NodeId) -> Link {
        if self.arena.node(parent).left == Some(child) {
            Link::Left(parent)
        } else {
            Link::Right(parent)
        }
    }

    fn child(&self, link: Link) -> Option<NodeId> {
        match link {
            Link::Root => self.root,
            Link::Left(parent) => self.arena.node(parent).left,
            Link::Right(parent) => self.arena.node(parent).right,
        }
    }

    fn set_child(&mut self, link: Link, target: Option<NodeId>) {
        match link {
            Link::Root => self.root = target,
            Link::Left(parent) => self.arena.node_mut(parent).left = target,
            Link::Right(parent) => self.arena.node_mut(parent).right = target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::treap::arena::Node;

    fn prio(raw: u32) -> Q31 {
        Q31::from_raw(raw)
    }

    fn node<'a>(treap: &'a Treap<u32>, id: NodeId) -> &'a Node<u32> {
        treap.arena.node(id)
    }

    /// Depth-first sweep checking BST order (right side permits equals),
    /// heap order, the height bound, and arena conservation.
    fn check_invariants(treap: &Treap<u32>) {
        assert_eq!(
            treap.arena.len() + treap.arena.free_len(),
            treap.arena.capacity(),
            "arena conservation violated"
        );
        let mut visited = 0;
        let mut stack: Vec<(NodeId, usize, Option<u32>, Option<u32>)> = Vec::new();
        if let Some(root) = treap.root {
            stack.push((root, 1, None, None));
        }
        while let Some((id, depth, lower, upper)) = stack.pop() {
            visited += 1;
            assert!(depth <= treap.max_height(), "node deeper than the bound");
            let n = node(treap, id);
            if let Some(lower) = lower {
                assert!(n.key >= lower, "BST order violated on a right spine");
            }
            if let Some(upper) = upper {
                assert!(n.key < upper, "BST order violated on a left spine");
            }
            if let Some(left) = n.left {
                assert!(
                    node(treap, left).priority <= n.priority,
                    "heap order violated"
                );
                stack.push((left, depth + 1, lower, Some(n.key)));
            }
            if let Some(right) = n.right {
                assert!(
                    node(treap, right).priority <= n.priority,
                    "heap order violated"
                );
                stack.push((right, depth + 1, Some(n.key), upper));
            }
        }
        assert_eq!(visited, treap.len(), "reachable nodes disagree with len");
    }

    /// Iterative in-order walk reporting raw priorities, key order.
    fn priorities_in_order(treap: &Treap<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut cursor = treap.root;
        while cursor.is_some() || !stack.is_empty() {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = node(treap, id).left;
            }
            let id = stack.pop().unwrap();
            out.push(node(treap, id).priority.raw());
            cursor = node(treap, id).right;
        }
        out
    }

    fn scenario_a() -> Treap<u32> {
        let mut treap = Treap::new(8, 16);
        treap.insert(123u32, prio(100)).unwrap();
        treap.insert(321, prio(50)).unwrap();
        treap.insert(200, prio(38)).unwrap();
        treap.insert(512, prio(120)).unwrap();
        treap
    }

    #[test]
    fn test_insert_rotates_to_the_expected_shape() {
        let treap = scenario_a();
        check_invariants(&treap);
        assert_eq!(treap.len(), 4);

        let root = treap.root.unwrap();
        assert_eq!(node(&treap, root).key, 512);
        assert_eq!(node(&treap, root).priority, prio(120));
        assert!(node(&treap, root).right.is_none());

        let left = node(&treap, root).left.unwrap();
        assert_eq!(node(&treap, left).key, 123);
        assert_eq!(node(&treap, left).priority, prio(100));

        assert_eq!(priorities_in_order(&treap), vec![100, 38, 50, 120]);
    }

    #[test]
    fn test_delete_with_two_children_moves_the_successor() {
        let mut treap = scenario_a();
        treap.insert(322, prio(37)).unwrap();
        check_invariants(&treap);
        assert_eq!(priorities_in_order(&treap), vec![100, 38, 50, 37, 120]);

        // Key 321 holds both 200 and 322 as descendants at this point.
        treap.delete(321).unwrap();
        check_invariants(&treap);
        assert_eq!(treap.len(), 4);
        assert_eq!(priorities_in_order(&treap), vec![100, 38, 37, 120]);

        let root = treap.root.unwrap();
        assert_eq!(node(&treap, root).key, 512);
        assert!(node(&treap, root).right.is_none());
        let left = node(&treap, root).left.unwrap();
        assert_eq!(node(&treap, left).key, 123);
        assert!(node(&treap, left).left.is_none());
        let lr = node(&treap, left).right.unwrap();
        assert_eq!(node(&treap, lr).key, 200);
        let lrr = node(&treap, lr).right.unwrap();
        assert_eq!(node(&treap, lrr).key, 322);
    }

    #[test]
    fn test_find_and_top() {
        let treap = scenario_a();
        assert_eq!(treap.find(200).unwrap().priority(), prio(38));
        assert_eq!(treap.find(512).unwrap().key(), 512);
        let err = treap.find(999).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);

        let top = treap.top().unwrap();
        assert_eq!(top.key(), 512);
        assert_eq!(top.priority(), prio(120));

        let empty: Treap<u32> = Treap::new(4, 16);
        assert!(empty.top().is_none());
    }

    #[test]
    fn test_delete_missing_key() {
        let mut treap = scenario_a();
        let err = treap.delete(111).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
        assert_eq!(treap.len(), 4);
        check_invariants(&treap);
    }

    #[test]
    fn test_round_trip_in_several_orders() {
        // Distinct pseudo-random priorities; small multiplicative generator.
        let keys: Vec<u32> = (0..32).collect();
        let priorities: Vec<u32> = (1..=32u32).map(|k| k.wrapping_mul(2_654_435_761)).collect();

        let forward: Vec<u32> = keys.clone();
        let reverse: Vec<u32> = keys.iter().rev().copied().collect();
        let interleaved: Vec<u32> = (0..32).map(|k| (k * 17) % 32).collect();

        for order in [forward, reverse, interleaved] {
            let mut treap = Treap::new(32, 32);
            for (&key, &p) in keys.iter().zip(&priorities) {
                treap.insert(key, prio(p)).unwrap();
                check_invariants(&treap);
            }
            assert_eq!(treap.len(), 32);
            assert!(!treap.has_space());

            for &key in &order {
                treap.delete(key).unwrap();
                check_invariants(&treap);
            }
            assert_eq!(treap.len(), 0);
            assert!(treap.root.is_none());
        }
    }

    #[test]
    fn test_duplicate_keys_are_structurally_allowed() {
        let mut treap = Treap::new(4, 16);
        treap.insert(7u32, prio(10)).unwrap();
        treap.insert(7, prio(20)).unwrap();
        assert_eq!(treap.len(), 2);
        check_invariants(&treap);

        treap.delete(7).unwrap();
        treap.delete(7).unwrap();
        assert_eq!(treap.len(), 0);
        let err = treap.delete(7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_insert_beyond_the_height_bound_fails_and_releases() {
        let mut treap = Treap::new(8, 3);
        // Decreasing priorities build a pure right spine, no rotations.
        treap.insert(10u32, prio(90)).unwrap();
        treap.insert(20, prio(80)).unwrap();
        treap.insert(30, prio(70)).unwrap();

        let err = treap.insert(40, prio(60)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeightExceeded);
        assert_eq!(treap.len(), 3);
        check_invariants(&treap);

        // The reserved slot went back to the pool.
        treap.delete(30).unwrap();
        treap.insert(40, prio(60)).unwrap();
        assert_eq!(treap.len(), 3);
        check_invariants(&treap);
    }

    #[test]
    fn test_find_at_the_bound_distinguishes_absence_from_overflow() {
        // Hand-link a right spine one node deeper than the bound permits;
        // insert() could never build this shape itself.
        let mut treap: Treap<u32> = Treap::new(8, 2);
        let a = treap.arena.allocate(10, prio(90)).unwrap();
        let b = treap.arena.allocate(20, prio(80)).unwrap();
        let c = treap.arena.allocate(30, prio(70)).unwrap();
        treap.arena.node_mut(a).right = Some(b);
        treap.arena.node_mut(b).right = Some(c);
        treap.root = Some(a);

        // Within the bound: plain hit and plain miss.
        assert_eq!(treap.find(20).unwrap().priority(), prio(80));
        assert_eq!(treap.find(5).unwrap_err().kind(), ErrorKind::KeyNotFound);

        // The budget runs out with a live cursor: overflow, not absence.
        assert_eq!(
            treap.find(30).unwrap_err().kind(),
            ErrorKind::HeightExceeded
        );
        assert_eq!(
            treap.find(25).unwrap_err().kind(),
            ErrorKind::HeightExceeded
        );

        // The budget runs out exactly on an empty link: absence is proven.
        assert_eq!(treap.find(15).unwrap_err().kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut treap = scenario_a();
        treap.clear();
        assert_eq!(treap.len(), 0);
        assert!(treap.is_empty());
        assert!(treap.root.is_none());
        assert!(treap.has_space());
        check_invariants(&treap);

        treap.insert(1, prio(5)).unwrap();
        assert_eq!(treap.len(), 1);
    }

    #[test]
    #[should_panic(expected = "max_height must be in")]
    fn test_oversized_height_bound_is_rejected() {
        let _ = Treap::<u32>::new(8, MAX_HEIGHT_LIMIT + 1);
    }
}
