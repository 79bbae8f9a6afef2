// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn normalize_sorts_and_dedupes() {
    let t = Topics::normalize(["foo", "bar", "foo"]);
    assert_eq!(t.as_slice(), &["bar".to_string(), "foo".to_string()]);
}

#[test]
fn normalize_drops_empty_strings() {
    let t = Topics::normalize(["foo", "", "bar"]);
    assert_eq!(t.as_slice(), &["bar".to_string(), "foo".to_string()]);
}

#[test]
fn none_and_empty_both_unregistered() {
    let none: Vec<String> = vec![];
    let empty: Vec<String> = Vec::new();
    assert!(Topics::normalize(none).is_empty());
    assert!(Topics::normalize(empty).is_empty());
}

#[test]
fn json_round_trip() {
    let t = Topics::normalize(["zeta", "alpha"]);
    let bytes = t.to_json_bytes();
    assert_eq!(bytes, br#"["alpha","zeta"]"#);
    let back = Topics::from_json_bytes(&bytes).unwrap();
    assert_eq!(back, t);
}

#[test]
fn snapshot_equality_is_deep() {
    let mut a = BTreeMap::new();
    a.insert("m1".to_string(), Topics::normalize(["foo"]));
    let snap_a = MembershipSnapshot::new(a.clone());
    let snap_b = MembershipSnapshot::new(a);
    assert_eq!(snap_a, snap_b);
}

proptest! {
    /// Property 1 from the testable-properties list: for any input `L`,
    /// the normalized topic list equals `sort(dedupe(L))`.
    #[test]
    fn normalization_is_sorted_deduped_set(mut input in proptest::collection::vec("[a-z]{1,6}", 0..12)) {
        let normalized = Topics::normalize(input.clone());
        input.retain(|s| !s.is_empty());
        input.sort();
        input.dedup();
        prop_assert_eq!(normalized.as_slice(), input.as_slice());
    }
}
