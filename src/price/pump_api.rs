// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Price polling against the pump.fun coin endpoint.

use super::PriceSource;
use crate::error::BotError;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Subset of the coin document we care about.
#[derive(Debug, Deserialize)]
struct CoinResponse {
    price: Option<Decimal>,
}

/// Reads `{base_url}/{mint}` and extracts the `price` field.
#[derive(Clone)]
pub struct PumpPriceSource {
    client: Client,
    base_url: String,
}

impl PumpPriceSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn coin_url(&self, mint: &str) -> String {
        format!("{}/{}", self.base_url, mint)
    }
}

#[async_trait]
impl PriceSource for PumpPriceSource {
    async fn get_price(&self, mint: &str) -> Result<Decimal, BotError> {
        let url = self.coin_url(mint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::PriceFetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::PriceFetch(format!("GET {} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::PriceFetch(format!("Failed to read body: {}", e)))?;

        let price = parse_price(&body)?;
        debug!("Price for {}: {}", mint, price);
        Ok(price)
    }
}

/// Extract a usable price from a coin document.
pub(crate) fn parse_price(body: &str) -> Result<Decimal, BotError> {
    let coin: CoinResponse = serde_json::from_str(body)
        .map_err(|e| BotError::PriceFetch(format!("Unparseable coin response: {}", e)))?;

    match coin.price {
        Some(price) if price > Decimal::ZERO => Ok(price),
        Some(price) => Err(BotError::PriceFetch(format!("Non-positive price {}", price))),
        None => Err(BotError::PriceFetch("Response has no price".into())),
    }
}
