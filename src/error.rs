// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error kinds shared by the bot's collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or malformed settings. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Transient; the next poll retries.
    #[error("price fetch failed: {0}")]
    PriceFetch(String),

    /// No entry price was established.
    #[error("buy failed: {0}")]
    Buy(String),

    /// Position stays open; the next poll may trigger again.
    #[error("sell failed: {0}")]
    Sell(String),

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("report write failed: {0}")]
    Report(String),

    #[error("invalid position transition: {0}")]
    InvalidTransition(String),
}

impl BotError {
    /// Only config and buy errors are allowed to abort the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Buy(_))
    }
}
