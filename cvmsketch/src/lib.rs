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

//! Streaming distinct-count estimation with a fixed memory footprint.
//!
//! This crate implements the CVM algorithm (Chakraborty, Vinodchandran, Meel:
//! "Distinct Elements in Streams: An Algorithm for the (Text) Book") on top of
//! a capacity-bounded treap whose nodes live in a preallocated arena. Every
//! tree operation runs in a bounded number of steps and no storage is
//! acquired after construction, so a sketch is suitable for execution
//! environments that forbid unbounded loops and mid-stream allocation.
//!
//! # Example
//!
//! ```
//! # use cvmsketch::cvm::CvmSketch;
//! let mut sketch: CvmSketch<u32> = CvmSketch::builder().capacity(64).seed(7).build();
//! for key in 0..1000u32 {
//!     sketch.update(key % 50).unwrap();
//! }
//! assert_eq!(sketch.estimate(), 50);
//! ```

pub mod cvm;
pub mod error;
pub mod fixed;
pub mod treap;
