// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Poll scheduling.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Source of poll ticks for the position monitor.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. Returns false once the ticker has been cancelled.
    async fn tick(&mut self) -> bool;
}

/// Cancels an [`IntervalTicker`] from another task.
#[derive(Debug, Clone)]
pub struct TickerHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl TickerHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// Fixed-period ticker. The first tick fires one period after creation.
pub struct IntervalTicker {
    interval: Interval,
    cancelled: watch::Receiver<bool>,
    // Keeps the channel open for as long as the ticker lives.
    _cancel: Arc<watch::Sender<bool>>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> (Self, TickerHandle) {
        let mut interval = interval_at(Instant::now() + period, period);
        // A slow sell must not be followed by a burst of catch-up polls.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);
        let ticker = Self {
            interval,
            cancelled: rx,
            _cancel: Arc::clone(&tx),
        };
        (ticker, TickerHandle { cancel: tx })
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        if self.is_cancelled() {
            return false;
        }

        tokio::select! {
            biased;
            _ = self.cancelled.changed() => false,
            _ = self.interval.tick() => !self.is_cancelled(),
        }
    }
}
