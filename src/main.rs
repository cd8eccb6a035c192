// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pump Exit Bot - buys one token and sells it on take-profit or stop-loss.

use clap::Parser;
use pump_exit_bot::config::Config;
use pump_exit_bot::executor::{PumpApiExecutor, TradeExecutor};
use pump_exit_bot::position::{
    notify_within, Collaborators, IntervalTicker, MonitorSettings, PositionMonitor,
    DEFAULT_NOTIFY_TIMEOUT,
};
use pump_exit_bot::price::{PriceSource, PumpPriceSource};
use pump_exit_bot::telegram::{Notifier, TelegramNotifier};
use pump_exit_bot::trade_history::{FileReportSink, ReportSink};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "pump-exit-bot", version, about = "Buy once, sell on take-profit or stop-loss")]
struct Cli {
    /// Token mint to trade (overrides TOKEN_MINT).
    #[arg(long)]
    mint: Option<String>,

    /// Seconds between price checks (overrides CHECK_INTERVAL_SEC).
    #[arg(long)]
    check_interval_sec: Option<u64>,

    /// Report file path (overrides REPORT_FILE).
    #[arg(long)]
    report_file: Option<PathBuf>,

    /// Print the current price and exit without trading.
    #[arg(long)]
    price_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let mut config = Config::from_env().map_err(|e| {
        error!("Failed to load config: {}", e);
        e
    })?;
    if let Some(mint) = cli.mint {
        config.mint = mint;
    }
    if let Some(secs) = cli.check_interval_sec {
        config.check_interval_sec = secs;
    }
    if let Some(path) = cli.report_file {
        config.report_file = path;
    }
    config.validate()?;

    let prices: Arc<dyn PriceSource> = Arc::new(PumpPriceSource::new(
        config.price_api_url.clone(),
        config.http_timeout(),
    )?);

    if cli.price_only {
        let price = prices.get_price(&config.mint).await?;
        info!("💵 {} price: {} SOL", config.mint, price);
        return Ok(());
    }

    info!("🤖 Pump Exit Bot starting...");
    info!("🪙 Mint: {}", config.mint);
    info!("💰 Buy amount: {} SOL (slippage {}%)", config.buy_amount_sol, config.slippage_pct);
    info!(
        "🎯 Take profit: {}% | 🛑 Stop loss: {}% | ⏱️ every {}s",
        config.take_profit_pct, config.stop_loss_pct, config.check_interval_sec
    );

    let executor: Arc<dyn TradeExecutor> = Arc::new(PumpApiExecutor::new(
        config.trade_api_url.clone(),
        config.private_key.clone(),
        config.mint.clone(),
        Arc::clone(&prices),
        config.http_timeout(),
    )?);

    let telegram: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    ));
    notify_within(
        telegram.as_ref(),
        DEFAULT_NOTIFY_TIMEOUT,
        &format!("🚀 Pump Exit Bot launching for `{}`", config.mint),
    )
    .await;

    let reports: Arc<dyn ReportSink> = Arc::new(FileReportSink::new(config.report_file.clone()));

    let mut monitor = PositionMonitor::new(
        MonitorSettings::from_config(&config),
        Collaborators {
            prices,
            executor,
            notifier: Arc::clone(&telegram),
            reports,
        },
    );

    // A failed buy is fatal: there is nothing to monitor.
    let fill = monitor.open().await?;
    info!("💵 Entry price: {} SOL", fill.entry_price);

    let (mut ticker, handle) = IntervalTicker::new(config.check_interval());
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received");
            handle.cancel();
        }
    });

    match monitor.run(&mut ticker).await {
        Some(report) => {
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("📊 Cycle complete ({}): {}", report.reason, report.profit_line());
            info!("📊 Session P/L: {} SOL", monitor.realized_pnl());
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        }
        None => {
            warn!(
                "⚠️ Stopped with position {:?} (entry {:?} SOL) - sell manually if needed",
                monitor.position().state(),
                monitor.position().entry_price()
            );
            notify_within(
                telegram.as_ref(),
                DEFAULT_NOTIFY_TIMEOUT,
                "🛑 Bot stopped before exit - position still open",
            )
            .await;
        }
    }

    Ok(())
}
