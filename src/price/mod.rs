// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Price feeds for the tracked token.

pub mod pump_api;

pub use pump_api::PumpPriceSource;

use crate::error::BotError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Supplies the current market price of an asset on demand.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price in SOL. Any non-positive quote is reported as `BotError::PriceFetch`.
    async fn get_price(&self, mint: &str) -> Result<Decimal, BotError>;
}
