// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position monitor: one buy, periodic price checks, one sell.

use super::state::{ExitPolicy, ExitReason, ExitSignal, Position, PositionState};
use super::ticker::Ticker;
use crate::config::Config;
use crate::error::BotError;
use crate::executor::{explorer_url, BuyFill, TradeExecutor};
use crate::price::PriceSource;
use crate::telegram::Notifier;
use crate::trade_history::{ReportSink, TradeReport};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Upper bound on a single notification so a stuck channel can't stall polling.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Trade sizing and alerting knobs for one cycle.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub mint: String,
    pub policy: ExitPolicy,
    pub buy_amount_sol: Decimal,
    pub sell_percentage: Decimal,
    pub slippage_pct: Decimal,
    /// Consecutive failed price polls before the operator is alerted. 0 disables.
    pub failure_alert_after: u32,
    pub notify_timeout: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mint: config.mint.clone(),
            policy: ExitPolicy::from_config(config),
            buy_amount_sol: config.buy_amount_sol,
            sell_percentage: config.sell_percentage,
            slippage_pct: config.slippage_pct,
            failure_alert_after: config.failure_alert_after,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

/// The external pieces the monitor drives.
#[derive(Clone)]
pub struct Collaborators {
    pub prices: Arc<dyn PriceSource>,
    pub executor: Arc<dyn TradeExecutor>,
    pub notifier: Arc<dyn Notifier>,
    pub reports: Arc<dyn ReportSink>,
}

/// Most recent price observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// What happened on one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No open position; nothing was fetched.
    Inactive,
    /// The price source failed; state is unchanged.
    PriceUnavailable,
    Hold { price: Decimal, percent_delta: Decimal },
    /// An exit triggered but the sell failed; the position is still open.
    SellFailed(ExitSignal),
    Closed(TradeReport),
}

/// Owns the position and is the only thing that moves it between states.
pub struct PositionMonitor {
    settings: MonitorSettings,
    position: Position,
    deps: Collaborators,
    last_sample: Option<PriceSample>,
    price_failures: u32,
    sell_failures: u32,
    realized_pnl: Decimal,
}

impl PositionMonitor {
    pub fn new(settings: MonitorSettings, deps: Collaborators) -> Self {
        Self {
            settings,
            position: Position::new(),
            deps,
            last_sample: None,
            price_failures: 0,
            sell_failures: 0,
            realized_pnl: Decimal::ZERO,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn last_sample(&self) -> Option<PriceSample> {
        self.last_sample
    }

    /// Profit realized by sells in this session, in SOL.
    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn sell_failures(&self) -> u32 {
        self.sell_failures
    }

    /// Execute the buy and open the position at the realized price.
    pub async fn open(&mut self) -> Result<BuyFill, BotError> {
        if self.position.state() != PositionState::None {
            return Err(BotError::InvalidTransition(format!(
                "buy requested while position is {:?}",
                self.position.state()
            )));
        }

        let result = self
            .deps
            .executor
            .buy(self.settings.buy_amount_sol, self.settings.slippage_pct)
            .await;
        let fill = match result {
            Ok(fill) => fill,
            Err(e) => {
                let e = match e {
                    BotError::Buy(_) => e,
                    other => BotError::Buy(other.to_string()),
                };
                error!("❌ Buy failed: {}", e);
                self.notify(&format!("❌ *Buy Failed*\nError: {}", e)).await;
                return Err(e);
            }
        };

        if let Err(e) = self.position.open(fill.entry_price) {
            let e = BotError::Buy(format!("no usable entry price ({}): {}", fill.tx_ref, e));
            error!("❌ {}", e);
            self.notify(&format!("❌ *Buy Failed*\nError: {}", e)).await;
            return Err(e);
        }

        info!("✅ Bought {} at {} SOL - tx: {}", self.settings.mint, fill.entry_price, fill.tx_ref);
        self.notify(&format!(
            "🟢 *BUY EXECUTED*\nToken: `{}`\nEntry price: {} SOL\nTx: {}",
            self.settings.mint,
            fill.entry_price,
            explorer_url(&fill.tx_ref)
        ))
        .await;

        Ok(fill)
    }

    /// Pure threshold check for one price. `None` means keep monitoring (or not open).
    pub fn evaluate(&self, price: Decimal) -> Option<ExitSignal> {
        self.position.evaluate(price, &self.settings.policy)
    }

    /// Fetch the current price and act on it.
    pub async fn poll_once(&mut self) -> TickOutcome {
        if !self.position.is_open() {
            return TickOutcome::Inactive;
        }

        let result = self.deps.prices.get_price(&self.settings.mint).await;
        match result {
            Ok(price) => self.on_price(price).await,
            Err(e) => self.price_unavailable(&e.to_string()).await,
        }
    }

    /// Evaluate one observed price, selling if a threshold is crossed.
    pub async fn on_price(&mut self, price: Decimal) -> TickOutcome {
        if !self.position.is_open() {
            return TickOutcome::Inactive;
        }
        if price <= Decimal::ZERO {
            return self.price_unavailable(&format!("non-positive price {}", price)).await;
        }
        let Some(percent_delta) = self.position.percent_delta(price) else {
            return self
                .price_unavailable(&format!("price {} out of range for this entry", price))
                .await;
        };

        if self.price_failures > 0 {
            debug!("Price feed recovered after {} failed checks", self.price_failures);
        }
        self.price_failures = 0;
        self.last_sample = Some(PriceSample {
            price,
            observed_at: Utc::now(),
        });
        info!("📈 Current price: {} ({:.2}%)", price, percent_delta);

        match self.evaluate(price) {
            Some(signal) => self.exit(signal).await,
            None => TickOutcome::Hold { price, percent_delta },
        }
    }

    /// Count a poll without a usable price; alerts once when the streak hits the threshold.
    async fn price_unavailable(&mut self, cause: &str) -> TickOutcome {
        self.price_failures += 1;
        warn!("❌ Failed to get price ({} in a row): {}", self.price_failures, cause);
        if self.price_failures == self.settings.failure_alert_after {
            self.notify(&format!(
                "⚠️ *Price Feed Down*\nNo price for `{}` in {} consecutive checks\nLast error: {}",
                self.settings.mint, self.price_failures, cause
            ))
            .await;
        }
        TickOutcome::PriceUnavailable
    }

    async fn exit(&mut self, signal: ExitSignal) -> TickOutcome {
        match signal.reason {
            ExitReason::TakeProfit => info!("🎯 Take profit triggered at {:.2}%", signal.percent_delta),
            ExitReason::StopLoss => info!("🛑 Stop loss triggered at {:.2}%", signal.percent_delta),
        }

        let result = self
            .deps
            .executor
            .sell(self.settings.sell_percentage, self.settings.slippage_pct)
            .await;
        let fill = match result {
            Ok(fill) => fill,
            Err(e) => {
                // Stay open; the next scheduled tick re-evaluates and may sell again.
                self.sell_failures += 1;
                error!("❌ Sell failed (attempt {}): {}", self.sell_failures, e);
                self.notify(&format!(
                    "❌ *Sell Failed* ({})\nToken: `{}`\nError: {}\nRetrying on next check",
                    signal.reason, self.settings.mint, e
                ))
                .await;
                return TickOutcome::SellFailed(signal);
            }
        };

        if !self.position.close() {
            warn!("Sell completed for a position that was no longer open");
            return TickOutcome::Inactive;
        }

        let closed_at = Utc::now();
        let report = fill
            .exit_price
            .and_then(|price| {
                let report = TradeReport::new(
                    signal.entry_price,
                    price,
                    signal.reason,
                    fill.tx_ref.clone(),
                    closed_at,
                );
                if report.is_none() {
                    warn!("Fill price {} unusable, reporting trigger price {}", price, signal.price);
                }
                report
            })
            .unwrap_or_else(|| TradeReport::from_signal(&signal, fill.tx_ref.clone(), closed_at));
        self.realized_pnl = self.realized_pnl.saturating_add(report.absolute_delta);

        info!("✅ Token sold! Profit: {}", report.profit_line());
        info!("🔗 Tx: {}", explorer_url(&fill.tx_ref));

        if let Err(e) = self.deps.reports.append(&report) {
            error!("❌ Failed to record trade report: {}", e);
            self.notify(&format!("⚠️ *Report Not Saved*\nError: {}", e)).await;
        }

        self.notify(&format!(
            "🔴 *SELL EXECUTED* ({})\nToken: `{}`\nSell price: {} SOL\nProfit: {}\nTx: {}",
            report.reason,
            self.settings.mint,
            report.exit_price,
            report.profit_line(),
            explorer_url(&report.tx_ref)
        ))
        .await;

        TickOutcome::Closed(report)
    }

    /// Poll on every tick until the position closes or the ticker is cancelled.
    /// Never schedules anything unless the position is open.
    pub async fn run<T: Ticker + ?Sized>(&mut self, ticker: &mut T) -> Option<TradeReport> {
        if !self.position.is_open() {
            warn!("No open position, monitoring not started");
            return None;
        }

        info!("📊 Position monitor started for {}", self.settings.mint);

        while ticker.tick().await {
            if let TickOutcome::Closed(report) = self.poll_once().await {
                info!("📊 Position closed, monitor stopped");
                return Some(report);
            }
        }

        info!("📊 Position monitor cancelled with position still {:?}", self.position.state());
        None
    }

    async fn notify(&self, message: &str) {
        notify_within(self.deps.notifier.as_ref(), self.settings.notify_timeout, message).await;
    }
}

/// Best-effort send bounded by `limit`; failures are logged and never reach the caller.
pub async fn notify_within(notifier: &dyn Notifier, limit: Duration, message: &str) {
    match tokio::time::timeout(limit, notifier.send(message)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Notification dropped: {}", e),
        Err(_) => warn!("Notification timed out after {:?}", limit),
    }
}
