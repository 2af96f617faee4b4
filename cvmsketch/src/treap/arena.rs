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

//! Fixed-capacity node storage.

use crate::error::Error;
use crate::fixed::Q31;

/// Handle to one node slot inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resident sample plus its child links.
#[derive(Debug)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) priority: Q31,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

/// Preallocated pool of node slots with a LIFO stack of free slots.
///
/// The slot array and the free stack are both sized once, at construction;
/// no storage is acquired afterwards, so allocate and release are O(1) and
/// the worst-case footprint is `capacity` nodes. The order in which released
/// slots are handed out again is unspecified.
#[derive(Debug)]
pub(crate) struct NodeArena<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<NodeId>,
}

impl<K> NodeArena<K> {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1, got {capacity}");
        assert!(
            capacity <= u32::MAX as usize,
            "capacity must fit a u32 slot index, got {capacity}"
        );
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        let free = (0..capacity as u32).rev().map(NodeId).collect();
        Self { slots, free }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently owned by the tree.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[cfg(test)]
    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn has_space(&self) -> bool {
        !self.free.is_empty()
    }

    /// Takes a slot off the free stack and initializes it with empty child
    /// links.
    pub(crate) fn allocate(&mut self, key: K, priority: Q31) -> Result<NodeId, Error> {
        let Some(id) = self.free.pop() else {
            return Err(Error::no_space());
        };
        self.slots[id.index()] = Some(Node {
            key,
            priority,
            left: None,
            right: None,
        });
        Ok(id)
    }

    /// Returns a slot to the free stack.
    ///
    /// The caller must currently own `id`: it came from
    /// [`NodeArena::allocate`] and has not been released since. The contract
    /// is unchecked in release builds; debug builds assert.
    pub(crate) fn release(&mut self, id: NodeId) {
        debug_assert!(
            self.slots[id.index()].is_some(),
            "released a slot that is not allocated"
        );
        self.slots[id.index()] = None;
        self.free.push(id);
    }

    /// Releases every slot at once. No per-node cleanup is needed.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.free.clear();
        self.free
            .extend((0..self.slots.len() as u32).rev().map(NodeId));
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        self.slots[id.index()]
            .as_ref()
            .expect("node id points at a vacant slot")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.slots[id.index()]
            .as_mut()
            .expect("node id points at a vacant slot")
    }
}
