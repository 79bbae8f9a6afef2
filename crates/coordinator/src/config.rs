// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Configuration recognized by the group coordinator core.
///
/// No other tuning knobs leak into the reconciler or claimant; everything
/// else (retry backoff shape, logging, the broker client) lives above or
/// below this layer.
#[derive(Debug, Clone, clap::Args)]
pub struct CoordinatorConfig {
    /// Debounce window: how long the reconciler waits after the most
    /// recent intent or watch event before reconciling.
    #[arg(long, default_value_t = 250, env = "GROUPCOORD_REBALANCE_DELAY_MS")]
    pub rebalance_delay_ms: u64,

    /// Coordination-service session timeout.
    #[arg(long, default_value_t = 6000, env = "GROUPCOORD_SESSION_TIMEOUT_MS")]
    pub session_timeout_ms: u64,

    /// Coordination-service endpoint list.
    #[arg(long, value_delimiter = ',', env = "GROUPCOORD_ENDPOINTS")]
    pub endpoints: Vec<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { rebalance_delay_ms: 250, session_timeout_ms: 6000, endpoints: Vec::new() }
    }
}

impl CoordinatorConfig {
    pub fn rebalance_delay(&self) -> Duration {
        Duration::from_millis(self.rebalance_delay_ms)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
