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

use cvmsketch::error::ErrorKind;
use cvmsketch::fixed::Q31;
use cvmsketch::treap::Treap;

fn prio(raw: u32) -> Q31 {
    Q31::from_raw(raw)
}

#[test]
fn test_new_treap_is_empty() {
    let treap: Treap<u32> = Treap::new(8, 16);
    assert!(treap.is_empty());
    assert_eq!(treap.len(), 0);
    assert_eq!(treap.capacity(), 8);
    assert_eq!(treap.max_height(), 16);
    assert!(treap.has_space());
    assert!(treap.top().is_none());
}

#[test]
fn test_insert_find_delete() {
    let mut treap = Treap::new(8, 16);
    treap.insert(5u32, prio(100)).unwrap();
    treap.insert(3, prio(200)).unwrap();
    treap.insert(7, prio(150)).unwrap();
    assert_eq!(treap.len(), 3);

    assert_eq!(treap.find(5).unwrap().priority(), prio(100));
    assert_eq!(treap.find(3).unwrap().priority(), prio(200));
    assert_eq!(treap.find(1).unwrap_err().kind(), ErrorKind::KeyNotFound);

    treap.delete(3).unwrap();
    assert_eq!(treap.len(), 2);
    assert_eq!(treap.find(3).unwrap_err().kind(), ErrorKind::KeyNotFound);
    assert_eq!(treap.find(7).unwrap().priority(), prio(150));
}

#[test]
fn test_top_tracks_the_maximal_priority() {
    let mut treap = Treap::new(8, 16);
    treap.insert(10u32, prio(40)).unwrap();
    assert_eq!(treap.top().unwrap().key(), 10);

    treap.insert(20, prio(90)).unwrap();
    assert_eq!(treap.top().unwrap().key(), 20);
    assert_eq!(treap.top().unwrap().priority(), prio(90));

    treap.insert(30, prio(60)).unwrap();
    assert_eq!(treap.top().unwrap().key(), 20);

    treap.delete(20).unwrap();
    assert_eq!(treap.top().unwrap().key(), 30);
    assert_eq!(treap.top().unwrap().priority(), prio(60));
}

#[test]
fn test_capacity_is_enforced() {
    let mut treap = Treap::new(2, 16);
    treap.insert(1u32, prio(10)).unwrap();
    treap.insert(2, prio(20)).unwrap();
    assert!(!treap.has_space());

    let err = treap.insert(3, prio(30)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSpace);
    assert_eq!(treap.len(), 2);

    treap.delete(1).unwrap();
    assert!(treap.has_space());
    treap.insert(3, prio(30)).unwrap();
    assert_eq!(treap.len(), 2);
}

#[test]
fn test_height_bound_is_enforced() {
    let mut treap = Treap::new(8, 2);
    // Decreasing priorities build a pure right spine.
    treap.insert(1u32, prio(30)).unwrap();
    treap.insert(2, prio(20)).unwrap();

    // The walk to the next empty right link would need a third step.
    let err = treap.insert(3, prio(10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HeightExceeded);
    assert_eq!(treap.len(), 2);

    // A key landing on the still-shallow left side fits.
    treap.insert(0, prio(40)).unwrap();
    assert_eq!(treap.len(), 3);
    assert_eq!(treap.top().unwrap().key(), 0);
}

#[test]
fn test_duplicate_keys_are_kept() {
    let mut treap = Treap::new(4, 16);
    treap.insert(9u32, prio(10)).unwrap();
    treap.insert(9, prio(20)).unwrap();
    treap.insert(9, prio(30)).unwrap();
    assert_eq!(treap.len(), 3);

    treap.delete(9).unwrap();
    treap.delete(9).unwrap();
    treap.delete(9).unwrap();
    assert!(treap.is_empty());
}

#[test]
fn test_clear_empties_the_tree() {
    let mut treap = Treap::new(4, 16);
    for key in 0..4u32 {
        treap.insert(key, prio(key + 1)).unwrap();
    }
    assert!(!treap.has_space());

    treap.clear();
    assert!(treap.is_empty());
    assert!(treap.has_space());
    assert!(treap.top().is_none());

    for key in 0..4u32 {
        treap.insert(key, prio(key + 1)).unwrap();
    }
    assert_eq!(treap.len(), 4);
}

#[test]
fn test_byte_sequence_keys() {
    let mut treap: Treap<[u8; 4]> = Treap::new(4, 16);
    treap.insert(*b"abcd", prio(10)).unwrap();
    treap.insert(*b"abce", prio(20)).unwrap();
    assert_eq!(treap.find(*b"abcd").unwrap().priority(), prio(10));
    assert_eq!(
        treap.find(*b"zzzz").unwrap_err().kind(),
        ErrorKind::KeyNotFound
    );
    assert_eq!(treap.top().unwrap().key(), *b"abce");
}
