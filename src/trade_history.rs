// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trade reports and the append-only report file.

use crate::error::BotError;
use crate::position::{ExitReason, ExitSignal};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Outcome of one completed buy-then-sell cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReport {
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub absolute_delta: Decimal,
    pub percent_delta: Decimal,
    pub reason: ExitReason,
    pub tx_ref: String,
    pub closed_at: DateTime<Utc>,
}

impl TradeReport {
    /// `None` when `entry_price` is not positive or the deltas fall outside
    /// the representable range.
    pub fn new(
        entry_price: Decimal,
        exit_price: Decimal,
        reason: ExitReason,
        tx_ref: String,
        closed_at: DateTime<Utc>,
    ) -> Option<Self> {
        if entry_price <= Decimal::ZERO {
            return None;
        }
        let absolute_delta = exit_price.checked_sub(entry_price)?;
        let percent_delta = absolute_delta
            .checked_div(entry_price)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some(Self {
            entry_price,
            exit_price,
            absolute_delta,
            percent_delta,
            reason,
            tx_ref,
            closed_at,
        })
    }

    /// Report priced at the observation that triggered the exit.
    pub fn from_signal(signal: &ExitSignal, tx_ref: String, closed_at: DateTime<Utc>) -> Self {
        Self {
            entry_price: signal.entry_price,
            exit_price: signal.price,
            absolute_delta: signal.price.saturating_sub(signal.entry_price),
            percent_delta: signal.percent_delta,
            reason: signal.reason,
            tx_ref,
            closed_at,
        }
    }

    /// "0.300000 SOL (30.00%)"
    pub fn profit_line(&self) -> String {
        format!(
            "{:.6} SOL ({:.2}%)",
            round_half_up(self.absolute_delta, 6),
            round_half_up(self.percent_delta, 2)
        )
    }

    /// Block written to the report file.
    pub fn render(&self) -> String {
        format!(
            "=== Trade Report ===\n\
             Time: {}\n\
             Reason: {}\n\
             Buy Price: {} SOL\n\
             Sell Price: {} SOL\n\
             Profit: {}\n\
             Tx: {}\n\
             -------------------------\n",
            self.closed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.reason,
            self.entry_price,
            self.exit_price,
            self.profit_line(),
            self.tx_ref,
        )
    }
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Durable, append-only record of completed cycles.
pub trait ReportSink: Send + Sync {
    fn append(&self, report: &TradeReport) -> Result<(), BotError>;
}

/// Appends rendered reports to a text file.
#[derive(Debug)]
pub struct FileReportSink {
    path: PathBuf,
    // Serialises writers within this process.
    lock: Mutex<()>,
}

impl FileReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileReportSink {
    fn append(&self, report: &TradeReport) -> Result<(), BotError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| BotError::Report("report lock poisoned".into()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BotError::Report(format!("Failed to open {}: {}", self.path.display(), e)))?;

        file.write_all(report.render().as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| BotError::Report(format!("Failed to write {}: {}", self.path.display(), e)))?;

        info!("📝 Recorded trade report to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn deltas_are_exact() {
        let report = TradeReport::new(dec!(1.0), dec!(1.3), ExitReason::TakeProfit, "sig".into(), at()).unwrap();
        assert_eq!(report.absolute_delta, dec!(0.3));
        assert_eq!(report.percent_delta, dec!(30));
        assert_eq!(report.profit_line(), "0.300000 SOL (30.00%)");
    }

    #[test]
    fn losses_render_negative() {
        let report = TradeReport::new(dec!(2.0), dec!(1.6), ExitReason::StopLoss, "sig".into(), at()).unwrap();
        assert_eq!(report.absolute_delta, dec!(-0.4));
        assert_eq!(report.percent_delta, dec!(-20));
        assert_eq!(report.profit_line(), "-0.400000 SOL (-20.00%)");
    }

    #[test]
    fn render_contains_every_field() {
        let report = TradeReport::new(dec!(0.000031), dec!(0.0000412), ExitReason::TakeProfit, "5xYz".into(), at()).unwrap();
        let text = report.render();
        assert!(text.starts_with("=== Trade Report ===\n"));
        assert!(text.contains("Time: 2025-03-01T12:00:00.000Z\n"));
        assert!(text.contains("Reason: TAKE_PROFIT\n"));
        assert!(text.contains("Buy Price: 0.000031 SOL\n"));
        assert!(text.contains("Sell Price: 0.0000412 SOL\n"));
        assert!(text.contains("Profit: 0.000010 SOL (32.90%)\n"));
        assert!(text.contains("Tx: 5xYz\n"));
        assert!(text.ends_with("-------------------------\n"));
    }

    #[test]
    fn unrepresentable_deltas_yield_no_report() {
        let tiny = Decimal::new(1, 28);
        let huge = Decimal::from_i128_with_scale(79_000_000_000_000_000_000_000_000, 0);
        assert_eq!(TradeReport::new(tiny, huge, ExitReason::TakeProfit, "a".into(), at()), None);
        assert_eq!(TradeReport::new(dec!(0), dec!(1), ExitReason::TakeProfit, "a".into(), at()), None);
    }

    #[test]
    fn signal_report_matches_trigger() {
        let signal = ExitSignal {
            reason: ExitReason::StopLoss,
            entry_price: dec!(2.0),
            price: dec!(1.6),
            percent_delta: dec!(-20),
        };
        let report = TradeReport::from_signal(&signal, "sig".into(), at());
        assert_eq!(
            Some(report.clone()),
            TradeReport::new(dec!(2.0), dec!(1.6), ExitReason::StopLoss, "sig".into(), at())
        );
        assert_eq!(report.profit_line(), "-0.400000 SOL (-20.00%)");
    }

    #[test]
    fn file_sink_appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("report.txt"));

        let first = TradeReport::new(dec!(1.0), dec!(1.3), ExitReason::TakeProfit, "a".into(), at()).unwrap();
        let second = TradeReport::new(dec!(2.0), dec!(1.6), ExitReason::StopLoss, "b".into(), at()).unwrap();
        sink.append(&first).unwrap();
        sink.append(&second).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(contents, format!("{}{}", first.render(), second.render()));
        assert_eq!(contents.matches("=== Trade Report ===").count(), 2);
    }

    #[test]
    fn unwritable_path_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("missing").join("report.txt"));
        let report = TradeReport::new(dec!(1.0), dec!(1.3), ExitReason::TakeProfit, "a".into(), at()).unwrap();
        assert!(matches!(sink.append(&report), Err(BotError::Report(_))));
    }
}
