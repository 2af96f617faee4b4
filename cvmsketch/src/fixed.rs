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

//! Unsigned Q1.31 fixed-point fractions.
//!
//! Sample priorities and the estimator threshold are fractions in `[0, 1)`
//! stored as raw `u32` values scaled by `2^31`. All products and quotients go
//! through a `u64` intermediate so they cannot overflow before rescaling.

use std::fmt;

use rand::Rng;

/// Number of fractional bits in the representation.
pub const FRACTION_BITS: u32 = 31;

/// A fixed-point fraction with 31 fractional bits.
///
/// Ordering and equality follow the raw scaled value, so comparisons between
/// draws and the threshold are plain integer comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Q31(u32);

impl Q31 {
    /// The value 0.0.
    pub const ZERO: Q31 = Q31(0);

    /// The value 1.0 (the scale itself).
    pub const ONE: Q31 = Q31(1 << FRACTION_BITS);

    /// Wraps a raw scaled value.
    pub const fn from_raw(raw: u32) -> Self {
        Q31(raw)
    }

    /// Returns the raw scaled value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Multiplies two fractions, flooring: `floor(a * b / 2^31)`.
    pub const fn mul(self, rhs: Q31) -> Q31 {
        let product = self.0 as u64 * rhs.0 as u64;
        Q31((product >> FRACTION_BITS) as u32)
    }

    /// Divides two fractions, flooring: `floor(a * 2^31 / b)`.
    ///
    /// Quotients of 2.0 or more do not fit the representation and truncate to
    /// the low 32 bits.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    pub const fn div(self, rhs: Q31) -> Q31 {
        assert!(rhs.0 != 0, "division by zero");
        let numerator = (self.0 as u64) << FRACTION_BITS;
        Q31((numerator / rhs.0 as u64) as u32)
    }

    /// Converts to a float in `[0, 2)`.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE.0 as f64
    }

    /// Multiplies an integer count by the reciprocal of this fraction,
    /// i.e. computes `floor(count / self)`.
    ///
    /// Saturates to `u64::MAX` when the fraction is zero. `count` must stay
    /// below `2^33`; callers pass buffer occupancies, which are far smaller.
    pub const fn reciprocal_mul(self, count: u64) -> u64 {
        if self.0 == 0 {
            return u64::MAX;
        }
        (count << FRACTION_BITS) / self.0 as u64
    }

    /// Draws a uniform fraction in `[0, 1)` from `rng`.
    ///
    /// The integer bit of the raw draw is masked off, so the result is always
    /// strictly below [`Q31::ONE`].
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Q31 {
        Q31(rng.random::<u32>() & (Self::ONE.0 - 1))
    }
}

impl fmt::Display for Q31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}
