// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-process [`CoordinationClient`] backed by a `HashMap` tree,
//! standing in for a real ZooKeeper/etcd-style coordination service.
//!
//! This is the concrete backend the crate exercises itself against: the
//! real coordination-service wire protocol is out of scope (see the
//! coordinator's purpose and scope notes), but a runnable library needs
//! at least one implementation of the black-box contract to be testable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, trace, warn};

use crate::error::{CoordinatorError, Result};

use super::{Children, CoordinationClient, WatchEvent};

#[derive(Default)]
struct Inner {
    nodes: HashMap<String, Vec<u8>>,
    /// Pending one-shot watches, keyed by the path whose children they
    /// are watching.
    watchers: HashMap<String, Vec<oneshot::Sender<WatchEvent>>>,
    session_alive: bool,
}

/// In-memory coordination service, simulating ephemeral znodes, watches,
/// and session loss for a single process.
pub struct InMemoryCoordinationClient {
    inner: Mutex<Inner>,
}

impl Default for InMemoryCoordinationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCoordinationClient {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { session_alive: true, ..Inner::default() }) }
    }

    /// Simulate the coordination-service session dying: every ephemeral
    /// node is wiped and every pending watch fires `SessionLost`.
    pub async fn kill_session(&self) {
        let mut inner = self.inner.lock().await;
        inner.session_alive = false;
        inner.nodes.clear();
        for (_, waiters) in inner.watchers.drain() {
            for tx in waiters {
                let _ = tx.send(WatchEvent::SessionLost);
            }
        }
        warn!("in-memory coordination session killed");
    }

    fn fire_watchers(inner: &mut Inner, parent: &str) {
        if let Some(waiters) = inner.watchers.remove(parent) {
            trace!(path = parent, count = waiters.len(), "firing child watchers");
            for tx in waiters {
                let _ = tx.send(WatchEvent::ChildrenChanged);
            }
        }
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) if idx > 0 => &path[..idx],
        _ => "/",
    }
}

#[async_trait]
impl CoordinationClient for InMemoryCoordinationClient {
    async fn create_ephemeral(&self, path: &str, data: Vec<u8>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.session_alive {
            return Err(CoordinatorError::SessionLost);
        }
        if inner.nodes.contains_key(path) {
            return Err(CoordinatorError::Conflict);
        }
        inner.nodes.insert(path.to_owned(), data);
        let parent = parent_of(path).to_owned();
        debug!(path, "created ephemeral node");
        Self::fire_watchers(&mut inner, &parent);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.session_alive {
            return Err(CoordinatorError::SessionLost);
        }
        let existed = inner.nodes.remove(path).is_some();
        if existed {
            let parent = parent_of(path).to_owned();
            debug!(path, "deleted node");
            Self::fire_watchers(&mut inner, &parent);
        }
        Ok(())
    }

    async fn get_children(&self, path: &str) -> Result<Children> {
        let inner = self.inner.lock().await;
        if !inner.session_alive {
            return Err(CoordinatorError::SessionLost);
        }
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut names: Vec<String> = inner
            .nodes
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(|s| s.to_owned())
            .collect();
        names.sort();
        let revision = inner.nodes.len() as u64;
        Ok(Children { names, revision })
    }

    async fn get_data(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().await;
        if !inner.session_alive {
            return Err(CoordinatorError::SessionLost);
        }
        Ok(inner.nodes.get(path).cloned())
    }

    async fn watch_children(&self, path: &str) -> Result<oneshot::Receiver<WatchEvent>> {
        let mut inner = self.inner.lock().await;
        if !inner.session_alive {
            return Err(CoordinatorError::SessionLost);
        }
        let (tx, rx) = oneshot::channel();
        inner.watchers.entry(path.to_owned()).or_default().push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
