// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination Client Adapter (CCA) — the thin contract over the
//! external, ZooKeeper-style coordination service.
//!
//! This is deliberately a black box to everything above it: create/delete
//! ephemeral znodes, list children, install one-shot child-watches, fetch
//! a node's data. No caching; pure retry/backoff lives above this layer,
//! never inside an implementation of this trait.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

/// One-shot notification that something changed under a watched path.
/// The watch fires exactly once; callers that want to keep watching
/// re-install it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    ChildrenChanged,
    SessionLost,
}

/// Children listing result: names plus an opaque revision used only for
/// logging/debugging (the coordinator never branches on it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children {
    pub names: Vec<String>,
    pub revision: u64,
}

/// The external coordination service, taken as a black box.
///
/// All operations fail with [`crate::error::CoordinatorError::Unavailable`],
/// [`crate::error::CoordinatorError::SessionLost`], or
/// [`crate::error::CoordinatorError::Conflict`] — no other error variant
/// may cross this boundary.
#[async_trait]
pub trait CoordinationClient: Send + Sync {
    /// Atomically create an ephemeral node. Fails `Conflict` if it
    /// already exists.
    async fn create_ephemeral(&self, path: &str, data: Vec<u8>) -> Result<()>;

    /// Delete a node. Idempotent: deleting a missing node is success.
    async fn delete(&self, path: &str) -> Result<()>;

    /// List the immediate children of a path.
    async fn get_children(&self, path: &str) -> Result<Children>;

    /// Fetch a node's data. `None` if the node does not exist — a missing
    /// node is not one of the three error conditions this trait surfaces.
    async fn get_data(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Install a one-shot watch on a path's children, firing on the
    /// next add/remove/session-event.
    async fn watch_children(&self, path: &str) -> Result<tokio::sync::oneshot::Receiver<WatchEvent>>;
}
