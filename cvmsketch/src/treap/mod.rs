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

//! A bounded treap: a binary search tree on keys that is simultaneously a
//! max-heap on random per-node priorities.
//!
//! The implementation is shaped by two constraints that a textbook treap does
//! not have:
//!
//! - **No dynamic allocation after construction.** Nodes live in a
//!   fixed-capacity arena with a free-slot stack; running out of slots is an
//!   explicit, testable outcome rather than an allocator failure.
//! - **No unbounded iteration or recursion.** Every walk (search, insert
//!   path, successor search, rebalancing) is capped at the tree's configured
//!   height bound and reports [`crate::error::ErrorKind::HeightExceeded`]
//!   when the cap is hit instead of looping on.
//!
//! Together these give each operation a constant worst-case cost, which is
//! what lets the structure run in packet-processing style environments.

mod arena;
mod tree;

pub use self::tree::MAX_HEIGHT_LIMIT;
pub use self::tree::Sample;
pub use self::tree::Treap;
