// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group Znode Handle (GZH) — pure path layout and payload encoding over
//! a [`CoordinationClient`].
//!
//! Path layout (bit-exact, other implementations must interoperate):
//!
//! ```text
//! /consumers/<group>/ids/<memberId>                 (ephemeral, JSON array of topics)
//! /consumers/<group>/owners/<topic>/<partition>     (ephemeral, memberId as UTF-8 bytes)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::coordination::{CoordinationClient, WatchEvent};
use crate::error::Result;
use crate::topics::{MembershipSnapshot, Topics};

/// Per-group helper that knows the coordination-service path layout.
pub struct GroupZnodeHandle {
    group: String,
    cca: Arc<dyn CoordinationClient>,
}

impl GroupZnodeHandle {
    pub fn new(group: impl Into<String>, cca: Arc<dyn CoordinationClient>) -> Self {
        Self { group: group.into(), cca }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    fn ids_path(&self) -> String {
        format!("/consumers/{}/ids", self.group)
    }

    fn member_path(&self, member: &str) -> String {
        format!("/consumers/{}/ids/{}", self.group, member)
    }

    fn owners_topic_path(&self, topic: &str) -> String {
        format!("/consumers/{}/owners/{}", self.group, topic)
    }

    fn owner_path(&self, topic: &str, partition: u32) -> String {
        format!("/consumers/{}/owners/{}/{}", self.group, topic, partition)
    }

    /// Write (or clear) a member's advertised topic list.
    ///
    /// An empty `topics` deletes the znode rather than writing `[]`,
    /// matching the encoding rule that "empty subscription means the
    /// znode is absent, not a znode with `[]`".
    pub async fn register_membership(&self, member: &str, topics: &Topics) -> Result<()> {
        let path = self.member_path(member);
        if topics.is_empty() {
            self.cca.delete(&path).await?;
            debug!(group = %self.group, member, "cleared membership registration");
            return Ok(());
        }
        // An overwrite is a delete-then-create: `createEphemeral` fails
        // `Conflict` on an existing node, and there is no separate
        // "set data" primitive in the CCA contract.
        let _ = self.cca.delete(&path).await;
        self.cca.create_ephemeral(&path, topics.to_json_bytes()).await?;
        debug!(group = %self.group, member, topics = ?topics.as_slice(), "wrote membership registration");
        Ok(())
    }

    /// Remove a member's registration outright (used on `Stop`).
    pub async fn unregister(&self, member: &str) -> Result<()> {
        self.cca.delete(&self.member_path(member)).await
    }

    /// Iterate `ids/*`, read and decode each payload, and return the
    /// normalized map. A child that disappears between listing and read
    /// is skipped — best-effort, eventual consistency is acceptable
    /// because the watch will refire.
    pub async fn fetch_subscriptions(&self) -> Result<MembershipSnapshot> {
        let children = self.cca.get_children(&self.ids_path()).await?;
        let mut members = BTreeMap::new();
        for name in children.names {
            let path = self.member_path(&name);
            match self.cca.get_data(&path).await? {
                Some(bytes) => match Topics::from_json_bytes(&bytes) {
                    Some(topics) => {
                        members.insert(name, topics);
                    }
                    None => {
                        trace!(group = %self.group, member = %name, "malformed membership payload, skipping");
                    }
                },
                None => {
                    trace!(group = %self.group, member = %name, "membership node vanished between list and read");
                }
            }
        }
        Ok(MembershipSnapshot::new(members))
    }

    /// Install a one-shot watch on the `ids/` children.
    pub async fn watch_membership(&self) -> Result<oneshot::Receiver<WatchEvent>> {
        self.cca.watch_children(&self.ids_path()).await
    }

    /// Current owner of `(topic, partition)`, if any.
    pub async fn partition_owner(&self, topic: &str, partition: u32) -> Result<Option<String>> {
        let bytes = self.cca.get_data(&self.owner_path(topic, partition)).await?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    /// Attempt to claim `(topic, partition)` for `member`. Returns
    /// `Ok(true)` on success, `Ok(false)` on `Conflict` (already owned).
    pub async fn try_claim(&self, member: &str, topic: &str, partition: u32) -> Result<bool> {
        let path = self.owner_path(topic, partition);
        match self.cca.create_ephemeral(&path, member.as_bytes().to_vec()).await {
            Ok(()) => Ok(true),
            Err(crate::error::CoordinatorError::Conflict) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Release ownership of `(topic, partition)`.
    pub async fn release_partition(&self, topic: &str, partition: u32) -> Result<()> {
        self.cca.delete(&self.owner_path(topic, partition)).await
    }

    /// Install a one-shot watch on a topic's owners subtree, used by the
    /// claimant to wait out contention.
    pub async fn watch_owners(&self, topic: &str) -> Result<oneshot::Receiver<WatchEvent>> {
        self.cca.watch_children(&self.owners_topic_path(topic)).await
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
