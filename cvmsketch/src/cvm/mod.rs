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

//! The CVM distinct-count estimator.
//!
//! # Overview
//!
//! The sketch keeps a bounded buffer of sampled stream elements and a
//! threshold `p` that starts at 1.0 and only shrinks. Each element of the
//! stream draws a uniform priority in `[0, 1)`; an element stays sampled
//! while its draw is below `p`. Whenever the buffer overflows, the resident
//! sample with the largest draw is traded against the incoming one and `p`
//! shrinks to the larger of the two draws, so the buffer always holds the
//! elements whose draws survived every threshold so far. The number of
//! distinct elements is then estimated as `buffer occupancy / p`.
//!
//! The buffer is a bounded treap ([`crate::treap`]): the heap side exposes
//! the maximal draw in O(1), the search side makes the per-element
//! delete-before-consider step a bounded tree walk.
//!
//! Based on the algorithm in Chakraborty, Vinodchandran, Meel: "Distinct
//! Elements in Streams: An Algorithm for the (Text) Book" (ESA 2022), in the
//! treap-buffer formulation suggested by Knuth's note on the paper.
//!
//! # Example
//!
//! ```
//! # use cvmsketch::cvm::CvmSketch;
//! let mut sketch: CvmSketch<u64> = CvmSketch::builder().capacity(256).seed(42).build();
//! for key in 0..100_000u64 {
//!     sketch.update(key % 1000).unwrap();
//! }
//! let estimate = sketch.estimate();
//! assert!(estimate > 700 && estimate < 1300);
//! ```

mod sketch;

pub use self::sketch::CvmSketch;
pub use self::sketch::CvmSketchBuilder;
pub use self::sketch::DEFAULT_CAPACITY;
pub use self::sketch::DEFAULT_MAX_HEIGHT;
