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

//! CVM sketch implementation.

use std::marker::PhantomData;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::fixed::Q31;
use crate::treap::MAX_HEIGHT_LIMIT;
use crate::treap::Treap;

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 128;

/// Default height bound for the buffer treap.
///
/// A random-priority treap of a few hundred nodes rarely exceeds twice the
/// log of its size; 32 leaves a wide margin for the default capacity.
pub const DEFAULT_MAX_HEIGHT: usize = 32;

/// Streaming distinct-count estimator with a fixed memory footprint.
///
/// One sketch owns its buffer treap and its random generator; it is
/// single-threaded by construction and callers must serialize access.
/// All updates are deterministic given the seed.
#[derive(Debug)]
pub struct CvmSketch<K> {
    treap: Treap<K>,
    threshold: Q31,
    rng: StdRng,
}

impl<K: Copy + Ord> CvmSketch<K> {
    /// Create a new builder for CvmSketch.
    pub fn builder() -> CvmSketchBuilder<K> {
        CvmSketchBuilder::default()
    }

    /// Feeds one stream element to the sketch.
    ///
    /// Errors other than the routinely ignored `KeyNotFound` indicate a
    /// broken capacity/height configuration and are fatal to the run; see
    /// [`crate::error::ErrorKind`].
    pub fn update(&mut self, key: K) -> Result<(), Error> {
        // Delete-before-consider: the stream is not assumed deduplicated,
        // and only the draw of the latest occurrence may stay resident.
        match self.treap.delete(key) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::KeyNotFound => {}
            Err(err) => return Err(err),
        }

        let draw = Q31::sample(&mut self.rng);
        if draw >= self.threshold {
            // This occurrence is not sampled.
            return Ok(());
        }
        if self.treap.has_space() {
            return self.treap.insert(key, draw);
        }

        let Some(top) = self.treap.top() else {
            unreachable!("a full buffer always has a top sample");
        };
        if draw > top.priority() {
            // The incoming draw is the worst in sight: it becomes the new
            // threshold and the element is discarded.
            self.threshold = draw;
            return Ok(());
        }
        // Otherwise the resident maximum is evicted in favor of the incoming
        // element and the threshold shrinks to the evicted draw.
        self.threshold = top.priority();
        self.treap.delete(top.key())?;
        self.treap.insert(key, draw)
    }

    /// Returns the estimated number of distinct elements seen so far:
    /// the buffer occupancy divided by the threshold.
    pub fn estimate(&self) -> u64 {
        let retained = self.treap.len() as u64;
        if retained == 0 {
            return 0;
        }
        self.threshold.reciprocal_mul(retained)
    }

    /// Returns the current threshold `p`.
    pub fn threshold(&self) -> Q31 {
        self.threshold
    }

    /// Returns the number of retained samples.
    pub fn num_retained(&self) -> usize {
        self.treap.len()
    }

    /// Returns the fixed buffer capacity.
    pub fn capacity(&self) -> usize {
        self.treap.capacity()
    }

    /// Check if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.treap.is_empty()
    }

    /// Check if the sketch is in estimation mode, i.e. the threshold has
    /// dropped below 1.0 and retained counts are scaled up.
    pub fn is_estimation_mode(&self) -> bool {
        self.threshold < Q31::ONE
    }

    /// Reset the sketch to its empty state.
    ///
    /// The buffer is bulk-released and the threshold returns to 1.0; the
    /// random generator keeps its stream.
    pub fn reset(&mut self) {
        self.treap.clear();
        self.threshold = Q31::ONE;
    }
}

/// Builder for CvmSketch.
#[derive(Debug)]
pub struct CvmSketchBuilder<K> {
    capacity: usize,
    max_height: usize,
    seed: Option<u64>,
    _key: PhantomData<K>,
}

impl<K> Default for CvmSketchBuilder<K> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_height: DEFAULT_MAX_HEIGHT,
            seed: None,
            _key: PhantomData,
        }
    }
}

impl<K: Copy + Ord> CvmSketchBuilder<K> {
    /// Set the buffer capacity (number of retained samples).
    ///
    /// Larger capacities tighten the estimator's variance at a proportional
    /// memory cost.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn capacity(mut self, capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1, got {capacity}");
        self.capacity = capacity;
        self
    }

    /// Set the height bound for the buffer treap.
    ///
    /// Must comfortably exceed the depth a random-priority treap of the
    /// configured capacity can realistically reach; operations that run into
    /// the bound fail rather than loop on.
    ///
    /// # Panics
    ///
    /// If `max_height` is not in `[1, MAX_HEIGHT_LIMIT]`.
    pub fn max_height(mut self, max_height: usize) -> Self {
        assert!(
            (1..=MAX_HEIGHT_LIMIT).contains(&max_height),
            "max_height must be in [1, {MAX_HEIGHT_LIMIT}], got {max_height}"
        );
        self.max_height = max_height;
        self
    }

    /// Set the random seed for a reproducible run. Unseeded sketches draw
    /// their seed from OS entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the CvmSketch.
    pub fn build(self) -> CvmSketch<K> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        CvmSketch {
            treap: Treap::new(self.capacity, self.max_height),
            threshold: Q31::ONE,
            rng,
        }
    }
}
