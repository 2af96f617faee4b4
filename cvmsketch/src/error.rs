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

//! Error types shared by the treap and the estimator.

use std::borrow::Cow;
use std::error;
use std::fmt;

/// Classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The node pool has no free slot. Under correct estimator usage this is
    /// never reached (space is checked before inserting); seeing it means an
    /// invariant was broken upstream.
    NoSpace,
    /// A traversal or rebalance exceeded the configured height bound without
    /// resolving. Retrying cannot help; the structure must be rebuilt with
    /// larger bounds.
    HeightExceeded,
    /// The requested key is not resident. Routine during the estimator's
    /// delete-before-consider step.
    KeyNotFound,
}

/// Error returned by treap and sketch operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl Error {
    pub(crate) fn no_space() -> Self {
        Self {
            kind: ErrorKind::NoSpace,
            message: Cow::Borrowed("node pool is exhausted"),
        }
    }

    pub(crate) fn height_exceeded(operation: &'static str, bound: usize) -> Self {
        Self {
            kind: ErrorKind::HeightExceeded,
            message: Cow::Owned(format!(
                "{operation} exceeded the height bound of {bound}"
            )),
        }
    }

    // Borrowed message: this fires once per non-resident stream element, so
    // the hot path must not allocate.
    pub(crate) fn key_not_found() -> Self {
        Self {
            kind: ErrorKind::KeyNotFound,
            message: Cow::Borrowed("key is not resident"),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for Error {}
