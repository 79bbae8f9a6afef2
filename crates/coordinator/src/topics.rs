// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-list normalization and the membership snapshot value type.
//!
//! Every public operation that accepts a topic list normalizes it on
//! entry: `nil`/empty and duplicate/unordered input all collapse to the
//! same canonical form before anything downstream sees it.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A normalized topic list: sorted, deduplicated, never containing the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Topics(Vec<String>);

impl Topics {
    /// Normalize an arbitrary topic list: drop empty strings, dedupe,
    /// sort lexicographically. `None` and `Some(vec![])` both yield the
    /// empty `Topics` ("unsubscribe from all").
    pub fn normalize<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> =
            topics.into_iter().map(Into::into).filter(|t| !t.is_empty()).collect();
        Self(set.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Canonical JSON-array encoding used as znode payload.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.0).unwrap_or_else(|_| b"[]".to_vec())
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Option<Self> {
        let topics: Vec<String> = serde_json::from_slice(bytes).ok()?;
        Some(Self::normalize(topics))
    }
}

impl<S: Into<String>> FromIterator<S> for Topics {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}

/// The normalized map `{memberId -> sorted topics}` as reported to one
/// caller at one moment. An immutable value, compared by deep equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSnapshot(BTreeMap<String, Topics>);

impl MembershipSnapshot {
    pub fn new(members: BTreeMap<String, Topics>) -> Self {
        Self(members)
    }

    pub fn get(&self, member: &str) -> Option<&Topics> {
        self.0.get(member)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Topics)> {
        self.0.iter().map(|(m, t)| (m.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[path = "topics_tests.rs"]
mod tests;
