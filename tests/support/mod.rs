#![allow(dead_code)]

use async_trait::async_trait;
use lighter_engine::config::EngineConfig;
use lighter_engine::connectors::error::ClientError;
use lighter_engine::connectors::traits::{MarketDataClient, TxSubmitter};
use lighter_engine::types::{
    AccountPosition, AccountState, CancelAllRequest, LeverageRequest, MarketInfo,
    OrderBookQuote, OrderIntent, SubmissionHandle,
};
use lighter_engine::ExecutionEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListMarkets,
    GetAccount(i64),
    OrderBook(u8),
    CreateOrder(OrderIntent),
    CancelAll(String),
    UpdateLeverage(LeverageRequest),
}

/// In-memory exchange that records every call made against it, in order.
pub struct FakeExchange {
    calls: Mutex<Vec<Call>>,
    markets: Mutex<Vec<MarketInfo>>,
    account: Mutex<Option<AccountState>>,
    quotes: Mutex<HashMap<u8, OrderBookQuote>>,
    hashes: AtomicUsize,
    latency: Duration,
    pub fail_cancel: AtomicBool,
    pub fail_leverage: AtomicBool,
    pub fail_order: AtomicBool,
}

impl FakeExchange {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            markets: Mutex::new(vec![
                market("ETH", 0, 4, 2),
                market("BTC", 1, 5, 1),
            ]),
            account: Mutex::new(Some(account(vec![]))),
            quotes: Mutex::new(HashMap::from([
                (0, mark(dec!(3000))),
                (1, mark(dec!(60000))),
            ])),
            hashes: AtomicUsize::new(0),
            latency,
            fail_cancel: AtomicBool::new(false),
            fail_leverage: AtomicBool::new(false),
            fail_order: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn created_orders(&self) -> Vec<OrderIntent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateOrder(intent) => Some(intent),
                _ => None,
            })
            .collect()
    }

    pub fn set_account(&self, state: Option<AccountState>) {
        *self.account.lock().unwrap() = state;
    }

    pub fn set_quote(&self, market_index: u8, quote: OrderBookQuote) {
        self.quotes.lock().unwrap().insert(market_index, quote);
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn next_hash(&self) -> SubmissionHandle {
        format!("0xhash{}", self.hashes.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl MarketDataClient for FakeExchange {
    async fn list_markets(&self) -> Result<Vec<MarketInfo>, ClientError> {
        self.record(Call::ListMarkets).await;
        Ok(self.markets.lock().unwrap().clone())
    }

    async fn get_account(&self, account_index: i64) -> Result<Option<AccountState>, ClientError> {
        self.record(Call::GetAccount(account_index)).await;
        Ok(self.account.lock().unwrap().clone())
    }

    async fn get_order_book_detail(&self, market_index: u8) -> Result<OrderBookQuote, ClientError> {
        self.record(Call::OrderBook(market_index)).await;
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .get(&market_index)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TxSubmitter for FakeExchange {
    async fn create_order(&self, intent: &OrderIntent) -> Result<SubmissionHandle, ClientError> {
        self.record(Call::CreateOrder(intent.clone())).await;
        if self.fail_order.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected("order rejected".to_string()));
        }
        Ok(self.next_hash())
    }

    async fn cancel_all_orders(
        &self,
        request: &CancelAllRequest,
    ) -> Result<SubmissionHandle, ClientError> {
        self.record(Call::CancelAll(request.symbol.clone())).await;
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected("nonce too low".to_string()));
        }
        Ok(self.next_hash())
    }

    async fn update_leverage(
        &self,
        request: &LeverageRequest,
    ) -> Result<SubmissionHandle, ClientError> {
        self.record(Call::UpdateLeverage(request.clone())).await;
        if self.fail_leverage.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected("leverage rejected".to_string()));
        }
        Ok(self.next_hash())
    }
}

pub fn market(coin: &str, index: u8, size_decimals: u32, price_decimals: u32) -> MarketInfo {
    MarketInfo {
        coin: coin.to_string(),
        market_index: index,
        size_decimals,
        price_decimals,
    }
}

pub fn mark(price: Decimal) -> OrderBookQuote {
    OrderBookQuote {
        mark_price: Some(price),
        best_ask: None,
        best_bid: None,
    }
}

pub fn account(positions: Vec<AccountPosition>) -> AccountState {
    AccountState {
        index: 0,
        available_balance: dec!(800),
        collateral: dec!(1000),
        positions,
    }
}

pub fn position(coin: &str, raw_quantity: Decimal) -> AccountPosition {
    AccountPosition {
        coin: coin.to_string(),
        raw_quantity,
        initial_margin_fraction: dec!(10),
        avg_entry_price: dec!(2900),
        position_value: raw_quantity.abs() * dec!(3000),
        mark_price: None,
        unrealized_pnl: dec!(25),
        liquidation_price: dec!(2000),
    }
}

/// Engine wired to `exchange` for both data and submission, markets preloaded
/// and the call log cleared.
pub async fn engine_with(exchange: &Arc<FakeExchange>, config: EngineConfig) -> ExecutionEngine {
    let engine = ExecutionEngine::new(config, exchange.clone(), exchange.clone());
    engine.load_markets().await.unwrap();
    exchange.take_calls();
    engine
}

pub async fn engine(exchange: &Arc<FakeExchange>) -> ExecutionEngine {
    engine_with(exchange, EngineConfig::default()).await
}
