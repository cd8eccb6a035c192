// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trade executor backed by the hosted pump.fun trading API.
//! The API signs and submits on our behalf; the realized price is read back
//! from the price feed after each fill.

use super::{BuyFill, SellFill, TradeExecutor};
use crate::error::BotError;
use crate::price::PriceSource;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Serialize)]
struct BuyRequest<'a> {
    private_key: &'a str,
    mint: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    slippage: Decimal,
}

#[derive(Serialize)]
struct SellRequest<'a> {
    private_key: &'a str,
    mint: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    slippage: Decimal,
}

#[derive(Debug, Deserialize)]
struct TradeResponse {
    tx_signature: Option<String>,
}

/// Executes trades for a single mint through the HTTP trade API.
pub struct PumpApiExecutor {
    client: Client,
    base_url: String,
    private_key: String,
    mint: String,
    prices: Arc<dyn PriceSource>,
}

impl PumpApiExecutor {
    pub fn new(
        base_url: impl Into<String>,
        private_key: String,
        mint: String,
        prices: Arc<dyn PriceSource>,
        timeout: Duration,
    ) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            private_key,
            mint,
            prices,
        })
    }

    /// POST a trade and return the transaction signature.
    async fn submit<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String, String> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("POST {} failed: {}", url, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if !status.is_success() {
            return Err(format!("{} returned {}: {}", path, status, text.trim()));
        }

        parse_signature(&text)
    }
}

#[async_trait]
impl TradeExecutor for PumpApiExecutor {
    async fn buy(&self, amount_sol: Decimal, slippage_pct: Decimal) -> Result<BuyFill, BotError> {
        info!("🛒 Buying {} with {} SOL (slippage: {}%)", self.mint, amount_sol, slippage_pct);

        let request = BuyRequest {
            private_key: &self.private_key,
            mint: &self.mint,
            amount: amount_sol,
            slippage: slippage_pct,
        };
        let tx_ref = self.submit("buy", &request).await.map_err(BotError::Buy)?;
        info!("📤 Buy TX confirmed: {}", tx_ref);

        // Without an entry price there is nothing to measure the exit against.
        let entry_price = self
            .prices
            .get_price(&self.mint)
            .await
            .map_err(|e| BotError::Buy(format!("bought ({}) but no entry price: {}", tx_ref, e)))?;

        Ok(BuyFill { entry_price, tx_ref })
    }

    async fn sell(&self, percentage: Decimal, slippage_pct: Decimal) -> Result<SellFill, BotError> {
        info!("💰 Selling {}% of {} (slippage: {}%)", percentage, self.mint, slippage_pct);

        let request = SellRequest {
            private_key: &self.private_key,
            mint: &self.mint,
            percentage,
            slippage: slippage_pct,
        };
        let tx_ref = self.submit("sell", &request).await.map_err(BotError::Sell)?;
        info!("📤 Sell TX confirmed: {}", tx_ref);

        let exit_price = match self.prices.get_price(&self.mint).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("⚠️ Sold but couldn't read exit price: {}", e);
                None
            }
        };

        Ok(SellFill { exit_price, tx_ref })
    }
}

fn parse_signature(body: &str) -> Result<String, String> {
    let response: TradeResponse = serde_json::from_str(body)
        .map_err(|e| format!("Unparseable trade response: {}", e))?;

    response
        .tx_signature
        .filter(|sig| !sig.is_empty())
        .ok_or_else(|| "Trade response has no tx_signature".to_string())
}
