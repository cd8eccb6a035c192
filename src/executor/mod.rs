// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trade execution module.

pub mod pump_api;

pub use pump_api::PumpApiExecutor;

use crate::error::BotError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Result of a completed buy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyFill {
    /// Realized entry price. Must be positive to open a position.
    pub entry_price: Decimal,
    pub tx_ref: String,
}

/// Result of a completed sell.
#[derive(Debug, Clone, PartialEq)]
pub struct SellFill {
    /// Realized exit price, when the venue could report one.
    pub exit_price: Option<Decimal>,
    pub tx_ref: String,
}

/// Buys and sells the tracked token on the venue.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Spend `amount_sol` on the token.
    async fn buy(&self, amount_sol: Decimal, slippage_pct: Decimal) -> Result<BuyFill, BotError>;

    /// Liquidate `percentage` of the holding.
    async fn sell(&self, percentage: Decimal, slippage_pct: Decimal) -> Result<SellFill, BotError>;
}

/// Explorer link for a transaction signature.
pub fn explorer_url(tx_ref: &str) -> String {
    format!("https://solscan.io/tx/{}", tx_ref)
}
