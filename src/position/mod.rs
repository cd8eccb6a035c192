// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position management module.

pub mod monitor;
pub mod state;
pub mod ticker;

pub use monitor::{
    notify_within, Collaborators, MonitorSettings, PositionMonitor, PriceSample, TickOutcome,
    DEFAULT_NOTIFY_TIMEOUT,
};
pub use state::{ExitPolicy, ExitReason, ExitSignal, Position, PositionState};
pub use ticker::{IntervalTicker, Ticker, TickerHandle};
