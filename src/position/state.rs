// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position lifecycle and exit thresholds.

use crate::config::Config;
use crate::error::BotError;
use rust_decimal::Decimal;
use std::fmt;

/// Lifecycle of the single tracked holding. Strictly forward: None -> Open -> Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    None,
    Open,
    Closed,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeProfit => f.write_str("TAKE_PROFIT"),
            Self::StopLoss => f.write_str("STOP_LOSS"),
        }
    }
}

/// Take-profit / stop-loss thresholds, in percent of the entry price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPolicy {
    /// Exit once the return reaches this value (inclusive).
    pub take_profit_pct: Decimal,
    /// Exit once the return falls to this value (inclusive). Negative.
    pub stop_loss_pct: Decimal,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            take_profit_pct: Decimal::from(30),
            stop_loss_pct: Decimal::from(-20),
        }
    }
}

impl ExitPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            take_profit_pct: config.take_profit_pct,
            stop_loss_pct: config.stop_loss_pct,
        }
    }

    /// Take-profit is checked first, so it wins if thresholds were ever set to overlap.
    pub fn decide(&self, percent_delta: Decimal) -> Option<ExitReason> {
        if percent_delta >= self.take_profit_pct {
            Some(ExitReason::TakeProfit)
        } else if percent_delta <= self.stop_loss_pct {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }
}

/// An exit decision for one price observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitSignal {
    pub reason: ExitReason,
    pub entry_price: Decimal,
    pub price: Decimal,
    pub percent_delta: Decimal,
}

/// The single open holding being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    state: PositionState,
    entry_price: Option<Decimal>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        Self {
            state: PositionState::None,
            entry_price: None,
        }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn entry_price(&self) -> Option<Decimal> {
        self.entry_price
    }

    pub fn is_open(&self) -> bool {
        self.state == PositionState::Open
    }

    /// None -> Open. The entry price is fixed from here on.
    pub fn open(&mut self, entry_price: Decimal) -> Result<(), BotError> {
        if self.state != PositionState::None {
            return Err(BotError::InvalidTransition(format!(
                "cannot open a position in state {:?}",
                self.state
            )));
        }
        if entry_price <= Decimal::ZERO {
            return Err(BotError::InvalidTransition(format!(
                "entry price must be positive, got {}",
                entry_price
            )));
        }

        self.entry_price = Some(entry_price);
        self.state = PositionState::Open;
        Ok(())
    }

    /// Open -> Closed. Returns false if the position was not open, so a second
    /// exit can never close it twice.
    pub fn close(&mut self) -> bool {
        if self.state != PositionState::Open {
            return false;
        }
        self.state = PositionState::Closed;
        true
    }

    /// Signed return of `price` against the entry, in percent. `None` unless open.
    pub fn percent_delta(&self, price: Decimal) -> Option<Decimal> {
        if !self.is_open() {
            return None;
        }
        let entry = self.entry_price?;
        price
            .checked_sub(entry)?
            .checked_div(entry)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Check one observation against the policy. A no-op unless the position is open.
    pub fn evaluate(&self, price: Decimal, policy: &ExitPolicy) -> Option<ExitSignal> {
        let percent_delta = self.percent_delta(price)?;
        let reason = policy.decide(percent_delta)?;
        Some(ExitSignal {
            reason,
            entry_price: self.entry_price?,
            price,
            percent_delta,
        })
    }
}
