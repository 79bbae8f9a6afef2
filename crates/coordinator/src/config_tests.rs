// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_rebalance_delay_is_250ms() {
    let cfg = CoordinatorConfig::default();
    assert_eq!(cfg.rebalance_delay(), Duration::from_millis(250));
}

#[test]
fn duration_accessors_convert_from_millis() {
    let cfg = CoordinatorConfig { rebalance_delay_ms: 500, session_timeout_ms: 9000, endpoints: vec![] };
    assert_eq!(cfg.rebalance_delay(), Duration::from_millis(500));
    assert_eq!(cfg.session_timeout(), Duration::from_millis(9000));
}
