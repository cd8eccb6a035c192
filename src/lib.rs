// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-cycle pump.fun trading bot: buy once, watch the price, sell on
//! take-profit or stop-loss.

pub mod config;
pub mod error;
pub mod executor;
pub mod position;
pub mod price;
pub mod telegram;
pub mod trade_history;

pub use config::Config;
pub use error::BotError;
