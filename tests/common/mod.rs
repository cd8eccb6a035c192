//! Shared test doubles for the monitor's collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use pump_exit_bot::executor::{BuyFill, SellFill, TradeExecutor};
use pump_exit_bot::position::{Collaborators, ExitPolicy, MonitorSettings, PositionMonitor, Ticker};
use pump_exit_bot::price::PriceSource;
use pump_exit_bot::telegram::Notifier;
use pump_exit_bot::trade_history::{ReportSink, TradeReport};
use pump_exit_bot::BotError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays a fixed sequence of price results, counting every request.
pub struct ScriptedPrices {
    script: Mutex<VecDeque<Result<Decimal, BotError>>>,
    pub calls: Mutex<u32>,
}

impl ScriptedPrices {
    pub fn new(script: Vec<Result<Decimal, BotError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        })
    }

    pub fn prices(values: &[Decimal]) -> Arc<Self> {
        Self::new(values.iter().copied().map(Ok).collect())
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PriceSource for ScriptedPrices {
    async fn get_price(&self, _mint: &str) -> Result<Decimal, BotError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BotError::PriceFetch("no more prices".into())))
    }
}

/// Executor whose buy returns a fixed entry and whose sells follow a script.
pub struct FakeExecutor {
    entry: Result<Decimal, String>,
    sell_script: Mutex<VecDeque<Result<SellFill, BotError>>>,
    pub sells: Mutex<u32>,
}

impl FakeExecutor {
    pub fn buying_at(entry: Decimal) -> Arc<Self> {
        Arc::new(Self {
            entry: Ok(entry),
            sell_script: Mutex::new(VecDeque::new()),
            sells: Mutex::new(0),
        })
    }

    pub fn failing_buy(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            entry: Err(reason.to_string()),
            sell_script: Mutex::new(VecDeque::new()),
            sells: Mutex::new(0),
        })
    }

    pub fn then_sell(self: &Arc<Self>, result: Result<SellFill, BotError>) -> Arc<Self> {
        self.sell_script.lock().unwrap().push_back(result);
        Arc::clone(self)
    }

    pub fn sells(&self) -> u32 {
        *self.sells.lock().unwrap()
    }
}

#[async_trait]
impl TradeExecutor for FakeExecutor {
    async fn buy(&self, _amount_sol: Decimal, _slippage_pct: Decimal) -> Result<BuyFill, BotError> {
        match &self.entry {
            Ok(entry_price) => Ok(BuyFill {
                entry_price: *entry_price,
                tx_ref: "buy-sig".into(),
            }),
            Err(reason) => Err(BotError::Buy(reason.clone())),
        }
    }

    async fn sell(&self, _percentage: Decimal, _slippage_pct: Decimal) -> Result<SellFill, BotError> {
        *self.sells.lock().unwrap() += 1;
        self.sell_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(SellFill {
                    exit_price: None,
                    tx_ref: "sell-sig".into(),
                })
            })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), BotError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Notifier that always fails.
pub struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn send(&self, _message: &str) -> Result<(), BotError> {
        Err(BotError::Notify("chat not found".into()))
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub reports: Mutex<Vec<TradeReport>>,
}

impl MemorySink {
    pub fn reports(&self) -> Vec<TradeReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ReportSink for MemorySink {
    fn append(&self, report: &TradeReport) -> Result<(), BotError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

/// Ticker that fires a fixed number of times, then reports cancellation.
pub struct CountingTicker {
    remaining: u32,
    pub fired: u32,
}

impl CountingTicker {
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks, fired: 0 }
    }
}

#[async_trait]
impl Ticker for CountingTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.fired += 1;
        true
    }
}

pub fn settings() -> MonitorSettings {
    MonitorSettings {
        mint: "9J4JXu7Tz7SShZesbSRGWbTaBFhSnYvBxaQNbi72pump".into(),
        policy: ExitPolicy::default(),
        buy_amount_sol: dec!(0.01),
        sell_percentage: dec!(100),
        slippage_pct: dec!(10),
        failure_alert_after: 3,
        notify_timeout: Duration::from_millis(200),
    }
}

pub struct Rig {
    pub monitor: PositionMonitor,
    pub prices: Arc<ScriptedPrices>,
    pub executor: Arc<FakeExecutor>,
    pub notifier: Arc<RecordingNotifier>,
    pub sink: Arc<MemorySink>,
}

pub fn rig(prices: Arc<ScriptedPrices>, executor: Arc<FakeExecutor>) -> Rig {
    let notifier = Arc::new(RecordingNotifier::default());
    let sink = Arc::new(MemorySink::default());
    let monitor = PositionMonitor::new(
        settings(),
        Collaborators {
            prices: prices.clone(),
            executor: executor.clone(),
            notifier: notifier.clone(),
            reports: sink.clone(),
        },
    );
    Rig {
        monitor,
        prices,
        executor,
        notifier,
        sink,
    }
}
