// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::error::BotError;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MINT: &str = "9J4JXu7Tz7SShZesbSRGWbTaBFhSnYvBxaQNbi72pump";

/// Main configuration for the exit bot.
#[derive(Clone)]
pub struct Config {
    // Wallet
    pub private_key: String,

    // Asset
    pub mint: String,

    // Endpoints
    pub price_api_url: String,
    pub trade_api_url: String,
    pub http_timeout_sec: u64,

    // Trade sizing
    pub buy_amount_sol: Decimal,
    pub slippage_pct: Decimal,
    pub sell_percentage: Decimal,

    // Exit thresholds
    pub take_profit_pct: Decimal,
    pub stop_loss_pct: Decimal,

    // Monitoring
    pub check_interval_sec: u64,
    pub failure_alert_after: u32,

    // Output
    pub report_file: PathBuf,

    // Telegram
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("private_key", &"<redacted>")
            .field("mint", &self.mint)
            .field("price_api_url", &self.price_api_url)
            .field("trade_api_url", &self.trade_api_url)
            .field("buy_amount_sol", &self.buy_amount_sol)
            .field("slippage_pct", &self.slippage_pct)
            .field("sell_percentage", &self.sell_percentage)
            .field("take_profit_pct", &self.take_profit_pct)
            .field("stop_loss_pct", &self.stop_loss_pct)
            .field("check_interval_sec", &self.check_interval_sec)
            .field("report_file", &self.report_file)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, BotError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. `from_env` is the production entry point.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = |name: &str| -> Result<String, BotError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::Config(format!("{} not set", name)))
        };
        let env_var_or = |name: &str, default: &str| -> String {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            private_key: env_var("PRIVATE_KEY_BASE58")?,

            mint: env_var_or("TOKEN_MINT", DEFAULT_MINT),

            price_api_url: env_var_or("PRICE_API_URL", "https://pump.fun/api/coin"),
            trade_api_url: env_var_or("TRADE_API_URL", "https://api.pumpfunapis.com/api"),
            http_timeout_sec: parse_var("HTTP_TIMEOUT_SEC", env_var_or("HTTP_TIMEOUT_SEC", "10"))?,

            buy_amount_sol: parse_var("BUY_AMOUNT_SOL", env_var_or("BUY_AMOUNT_SOL", "0.01"))?,
            slippage_pct: parse_var("SLIPPAGE_PCT", env_var_or("SLIPPAGE_PCT", "10"))?,
            sell_percentage: parse_var("SELL_PERCENTAGE", env_var_or("SELL_PERCENTAGE", "100"))?,

            take_profit_pct: parse_var("TAKE_PROFIT_PCT", env_var_or("TAKE_PROFIT_PCT", "30"))?,
            stop_loss_pct: parse_var("STOP_LOSS_PCT", env_var_or("STOP_LOSS_PCT", "-20"))?,

            check_interval_sec: parse_var(
                "CHECK_INTERVAL_SEC",
                env_var_or("CHECK_INTERVAL_SEC", "15"),
            )?,
            failure_alert_after: parse_var(
                "FAILURE_ALERT_AFTER",
                env_var_or("FAILURE_ALERT_AFTER", "4"),
            )?,

            report_file: PathBuf::from(env_var_or("REPORT_FILE", "report.txt")),

            telegram_token: lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty()),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the trading cycle meaningless.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.mint.trim().is_empty() {
            return Err(BotError::Config("TOKEN_MINT is empty".into()));
        }
        if self.buy_amount_sol <= Decimal::ZERO {
            return Err(BotError::Config("BUY_AMOUNT_SOL must be positive".into()));
        }
        if self.slippage_pct < Decimal::ZERO {
            return Err(BotError::Config("SLIPPAGE_PCT must not be negative".into()));
        }
        if self.sell_percentage <= Decimal::ZERO || self.sell_percentage > Decimal::ONE_HUNDRED {
            return Err(BotError::Config("SELL_PERCENTAGE must be in (0, 100]".into()));
        }
        if self.take_profit_pct <= Decimal::ZERO {
            return Err(BotError::Config("TAKE_PROFIT_PCT must be positive".into()));
        }
        if self.stop_loss_pct >= Decimal::ZERO {
            return Err(BotError::Config("STOP_LOSS_PCT must be negative".into()));
        }
        if self.check_interval_sec == 0 {
            return Err(BotError::Config("CHECK_INTERVAL_SEC must be at least 1".into()));
        }
        if self.http_timeout_sec == 0 {
            return Err(BotError::Config("HTTP_TIMEOUT_SEC must be at least 1".into()));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_sec)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }
}

fn parse_var<T>(name: &str, raw: String) -> Result<T, BotError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| BotError::Config(format!("Invalid {} {:?}: {}", name, raw, e)))
}
