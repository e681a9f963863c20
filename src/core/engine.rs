// src/core/engine.rs
use crate::config::EngineConfig;
use crate::connectors::traits::{MarketDataClient, TxSubmitter};
use crate::core::account::AccountReader;
use crate::core::codec::NumericCodec;
use crate::core::locks::SymbolLocks;
use crate::core::markets::MarketCache;
use crate::error::{EngineError, Result};
use crate::types::{
    AccountSnapshot, CancelAllRequest, ExecutionReport, LeverageRequest, MarginMode, MarketInfo,
    OrderIntent, OrderOutcome, OrderStatus, OrderType, Position, PositionSide, Side,
    SubmissionHandle, TimeInForce, WorkflowWarning,
};
use crate::utils::clock::{now_millis, OrderIndexAllocator};
use crate::utils::symbol::coin_of;
use chrono::Duration;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Largest leverage expressible as a whole-basis-point margin fraction.
pub const MAX_LEVERAGE: u32 = 10_000;

const IMF_BASIS_POINTS: u32 = 10_000;

/// Order workflows against a single exchange account.
///
/// Every workflow on a symbol runs under that symbol's lock, from the first
/// cancel to the last submission. Nothing is retried and nothing is rolled
/// back: a leverage change stays applied if the order after it fails.
pub struct ExecutionEngine {
    config: EngineConfig,
    data: Arc<dyn MarketDataClient>,
    submitter: Arc<dyn TxSubmitter>,
    markets: Arc<MarketCache>,
    codec: NumericCodec,
    account: AccountReader,
    locks: SymbolLocks,
    order_ids: OrderIndexAllocator,
    margin_modes: DashMap<String, MarginMode>,
}

/// Order parameters in human units, before encoding.
struct OrderDraft {
    side: Side,
    quantity: Decimal,
    price: Decimal,
    order_type: OrderType,
    reduce_only: bool,
    trigger_price: Option<Decimal>,
    expiry: Option<i64>,
}

impl ExecutionEngine {
    pub fn new(
        config: EngineConfig,
        data: Arc<dyn MarketDataClient>,
        submitter: Arc<dyn TxSubmitter>,
    ) -> Self {
        let markets = Arc::new(MarketCache::new(data.clone(), config.quote_suffix.clone()));
        let codec = NumericCodec::new(markets.clone(), config.precision_policy);
        let account = AccountReader::new(
            data.clone(),
            config.account_index,
            config.quote_suffix.clone(),
        );

        Self {
            config,
            data,
            submitter,
            markets,
            codec,
            account,
            locks: SymbolLocks::new(),
            order_ids: OrderIndexAllocator::new(),
            margin_modes: DashMap::new(),
        }
    }

    /// Warms the market cache; returns the number of markets loaded.
    pub async fn load_markets(&self) -> Result<usize> {
        self.markets.reload().await
    }

    fn lock_key<'a>(&self, symbol: &'a str) -> &'a str {
        coin_of(symbol, &self.config.quote_suffix)
    }

    // --- Account ---

    pub async fn get_balance(&self) -> Result<AccountSnapshot> {
        self.account.get_balance().await
    }

    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        self.account.get_positions().await
    }

    /// Re-reads positions so a caller can check what a submitted order did.
    pub async fn confirm_position(
        &self,
        symbol: &str,
        side: PositionSide,
    ) -> Result<Option<Position>> {
        let coin = self.lock_key(symbol);
        Ok(self
            .get_positions()
            .await?
            .into_iter()
            .find(|p| p.side == side && coin_of(&p.symbol, &self.config.quote_suffix) == coin))
    }

    // --- Market data ---

    pub async fn get_market_price(&self, symbol: &str) -> Result<Decimal> {
        let market = self.markets.lookup(symbol).await?;
        self.reference_price(symbol, &market).await
    }

    async fn reference_price(&self, symbol: &str, market: &MarketInfo) -> Result<Decimal> {
        let quote = self
            .data
            .get_order_book_detail(market.market_index)
            .await
            .map_err(|source| EngineError::PriceUnavailable {
                symbol: symbol.to_string(),
                source: Some(source),
            })?;

        quote
            .reference_price()
            .ok_or_else(|| EngineError::PriceUnavailable {
                symbol: symbol.to_string(),
                source: None,
            })
    }

    // --- Codec surface ---

    pub async fn to_raw_size(&self, symbol: &str, quantity: Decimal) -> Result<i64> {
        self.codec.to_raw_size(symbol, quantity).await
    }

    pub async fn to_raw_price(&self, symbol: &str, price: Decimal) -> Result<i64> {
        self.codec.to_raw_price(symbol, price).await
    }

    pub async fn from_raw_size(&self, symbol: &str, raw: i64) -> Result<Decimal> {
        self.codec.from_raw_size(symbol, raw).await
    }

    pub async fn from_raw_price(&self, symbol: &str, raw: i64) -> Result<Decimal> {
        self.codec.from_raw_price(symbol, raw).await
    }

    pub async fn format_quantity(&self, symbol: &str, quantity: Decimal) -> Result<String> {
        self.codec.format_quantity(symbol, quantity).await
    }

    // --- Margin & leverage ---

    /// The exchange has no standalone margin-mode call; the mode is sent along
    /// with the next leverage update for this symbol.
    pub fn set_margin_mode(&self, symbol: &str, cross: bool) {
        let mode = if cross {
            MarginMode::Cross
        } else {
            MarginMode::Isolated
        };
        self.margin_modes
            .insert(self.lock_key(symbol).to_string(), mode);
        info!("  ✓ {} will use {:?} margin (applied on next leverage update)", symbol, mode);
    }

    fn margin_mode(&self, symbol: &str) -> MarginMode {
        self.margin_modes
            .get(self.lock_key(symbol))
            .map(|mode| *mode)
            .unwrap_or(self.config.margin_mode)
    }

    pub async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<SubmissionHandle> {
        let _guard = self.locks.acquire(self.lock_key(symbol)).await;
        self.apply_leverage(symbol, leverage).await
    }

    async fn apply_leverage(&self, symbol: &str, leverage: u32) -> Result<SubmissionHandle> {
        let imf = initial_margin_fraction(leverage)?;
        let market = self.markets.lookup(symbol).await?;

        let request = LeverageRequest {
            symbol: symbol.to_string(),
            market_index: market.market_index,
            initial_margin_fraction: imf,
            margin_mode: self.margin_mode(symbol),
        };

        let hash = self
            .submitter
            .update_leverage(&request)
            .await
            .map_err(|source| EngineError::LeverageSetFailed {
                symbol: symbol.to_string(),
                leverage,
                source,
            })?;

        info!(
            "  ✓ {} leverage set: {}x (imf={}) hash={}",
            symbol, leverage, imf, hash
        );
        Ok(hash)
    }

    // --- Cancellation ---

    pub async fn cancel_all_orders(&self, symbol: &str) -> Result<SubmissionHandle> {
        let _guard = self.locks.acquire(self.lock_key(symbol)).await;
        self.submit_cancel_all(symbol).await
    }

    async fn submit_cancel_all(&self, symbol: &str) -> Result<SubmissionHandle> {
        let request = CancelAllRequest {
            symbol: symbol.to_string(),
            time_in_force: TimeInForce::ImmediateCancelAll,
            timestamp_ms: now_millis(),
        };

        let hash = self
            .submitter
            .cancel_all_orders(&request)
            .await
            .map_err(|source| EngineError::CancelFailed {
                symbol: symbol.to_string(),
                source,
            })?;

        info!("  ✓ Cancelled all orders on {} hash={}", symbol, hash);
        Ok(hash)
    }

    // --- Opening ---

    pub async fn open_long(
        &self,
        symbol: &str,
        quantity: Decimal,
        leverage: u32,
    ) -> Result<ExecutionReport> {
        self.open(symbol, PositionSide::Long, quantity, leverage).await
    }

    pub async fn open_short(
        &self,
        symbol: &str,
        quantity: Decimal,
        leverage: u32,
    ) -> Result<ExecutionReport> {
        self.open(symbol, PositionSide::Short, quantity, leverage).await
    }

    async fn open(
        &self,
        symbol: &str,
        side: PositionSide,
        quantity: Decimal,
        leverage: u32,
    ) -> Result<ExecutionReport> {
        ensure_positive(symbol, quantity)?;
        initial_margin_fraction(leverage)?;

        let _guard = self.locks.acquire(self.lock_key(symbol)).await;
        let mut warnings = Vec::new();

        // 1. Stale orders: best effort.
        if let Err(e) = self.submit_cancel_all(symbol).await {
            warn!("  ⚠ Failed to cancel stale orders on {}: {}", symbol, e);
            warnings.push(WorkflowWarning::StaleOrdersNotCancelled {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            });
        }

        // 2. Leverage must be in place before any capital is at risk.
        self.apply_leverage(symbol, leverage).await?;

        // 3-4. Pre-flight.
        let market = self.markets.lookup(symbol).await?;
        let reference = self.reference_price(symbol, &market).await?;

        // 5-6. Marketable IOC limit.
        let order_side = side.entry_side();
        let draft = OrderDraft {
            side: order_side,
            quantity,
            price: self.marketable_price(reference, order_side),
            order_type: OrderType::Limit,
            reduce_only: false,
            trigger_price: None,
            expiry: None,
        };
        let outcome = self.submit(symbol, &market, draft).await?;

        info!(
            "✓ Opened {} {}: qty={} ref={} hash={}",
            side, symbol, quantity, reference, outcome.submission_handle
        );
        Ok(ExecutionReport { outcome, warnings })
    }

    // --- Closing ---

    /// `quantity == 0` closes the whole long currently held.
    pub async fn close_long(&self, symbol: &str, quantity: Decimal) -> Result<ExecutionReport> {
        self.close(symbol, PositionSide::Long, quantity).await
    }

    /// `quantity == 0` closes the whole short currently held.
    pub async fn close_short(&self, symbol: &str, quantity: Decimal) -> Result<ExecutionReport> {
        self.close(symbol, PositionSide::Short, quantity).await
    }

    async fn close(
        &self,
        symbol: &str,
        side: PositionSide,
        quantity: Decimal,
    ) -> Result<ExecutionReport> {
        if quantity < Decimal::ZERO {
            return Err(EngineError::InvalidQuantity {
                symbol: symbol.to_string(),
                quantity,
            });
        }

        let _guard = self.locks.acquire(self.lock_key(symbol)).await;

        let quantity = if quantity.is_zero() {
            self.current_amount(symbol, side).await?
        } else {
            quantity
        };

        let market = self.markets.lookup(symbol).await?;
        let reference = self.reference_price(symbol, &market).await?;

        let order_side = side.exit_side();
        let draft = OrderDraft {
            side: order_side,
            quantity,
            price: self.marketable_price(reference, order_side),
            order_type: OrderType::Limit,
            reduce_only: true,
            trigger_price: None,
            expiry: None,
        };
        let submitted = self.submit(symbol, &market, draft).await;

        // Leftover protective orders go whether or not the close went through.
        let mut warnings = Vec::new();
        if let Err(e) = self.submit_cancel_all(symbol).await {
            warn!("  ⚠ Failed to cancel remaining orders on {}: {}", symbol, e);
            warnings.push(WorkflowWarning::ResidualOrdersNotCancelled {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            });
        }

        let outcome = submitted?;
        info!(
            "✓ Closed {} {}: qty={} hash={}",
            side, symbol, quantity, outcome.submission_handle
        );
        Ok(ExecutionReport { outcome, warnings })
    }

    async fn current_amount(&self, symbol: &str, side: PositionSide) -> Result<Decimal> {
        let coin = self.lock_key(symbol);
        self.get_positions()
            .await?
            .into_iter()
            .find(|p| p.side == side && coin_of(&p.symbol, &self.config.quote_suffix) == coin)
            .map(|p| p.amount)
            .filter(|amount| !amount.is_zero())
            .ok_or_else(|| EngineError::NoPositionToClose {
                symbol: symbol.to_string(),
                side,
            })
    }

    // --- Protective orders ---

    pub async fn set_stop_loss(
        &self,
        symbol: &str,
        position_side: PositionSide,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<OrderOutcome> {
        self.protective(symbol, position_side, quantity, stop_price, OrderType::StopLoss)
            .await
    }

    pub async fn set_take_profit(
        &self,
        symbol: &str,
        position_side: PositionSide,
        quantity: Decimal,
        take_profit_price: Decimal,
    ) -> Result<OrderOutcome> {
        self.protective(
            symbol,
            position_side,
            quantity,
            take_profit_price,
            OrderType::TakeProfit,
        )
        .await
    }

    async fn protective(
        &self,
        symbol: &str,
        position_side: PositionSide,
        quantity: Decimal,
        trigger: Decimal,
        order_type: OrderType,
    ) -> Result<OrderOutcome> {
        ensure_positive(symbol, quantity)?;

        let _guard = self.locks.acquire(self.lock_key(symbol)).await;
        let market = self.markets.lookup(symbol).await?;

        let expiry =
            now_millis() + Duration::days(self.config.protective_order_ttl_days).num_milliseconds();
        let draft = OrderDraft {
            side: position_side.exit_side(),
            quantity,
            price: trigger,
            order_type,
            reduce_only: true,
            trigger_price: Some(trigger),
            expiry: Some(expiry),
        };
        let outcome = self.submit(symbol, &market, draft).await?;

        info!(
            "  {:?} set on {} {}: trigger={} hash={}",
            order_type, position_side, symbol, trigger, outcome.submission_handle
        );
        Ok(outcome)
    }

    // --- Submission ---

    /// Reference price pushed against us by the configured slippage so an IOC
    /// limit behaves like a market order.
    fn marketable_price(&self, reference: Decimal, side: Side) -> Decimal {
        match side {
            Side::Buy => reference * (Decimal::ONE + self.config.slippage),
            Side::Sell => reference * (Decimal::ONE - self.config.slippage),
        }
    }

    fn encode(&self, symbol: &str, market: &MarketInfo, draft: OrderDraft) -> Result<OrderIntent> {
        let price = self.codec.encode_price(market, draft.price)?;
        let trigger_price = draft
            .trigger_price
            .map(|p| self.codec.encode_price(market, p))
            .transpose()?;

        Ok(OrderIntent {
            symbol: symbol.to_string(),
            market_index: market.market_index,
            client_order_index: self.order_ids.next(),
            base_amount: self.codec.encode_size(market, draft.quantity)?,
            price,
            is_ask: draft.side.is_ask(),
            order_type: draft.order_type,
            time_in_force: TimeInForce::ImmediateOrCancel,
            reduce_only: draft.reduce_only,
            trigger_price,
            expiry: draft.expiry,
        })
    }

    async fn submit(
        &self,
        symbol: &str,
        market: &MarketInfo,
        draft: OrderDraft,
    ) -> Result<OrderOutcome> {
        let intent = self.encode(symbol, market, draft)?;

        info!(
            "🚀 Sending order: {} {:?} ask={} base={} price={} reduce_only={}",
            symbol,
            intent.order_type,
            intent.is_ask,
            intent.base_amount,
            intent.price,
            intent.reduce_only
        );

        let hash = self
            .submitter
            .create_order(&intent)
            .await
            .map_err(|source| {
                error!("⚠️ Order submission failed on {}: {}", symbol, source);
                EngineError::OrderSubmissionFailed {
                    symbol: symbol.to_string(),
                    source,
                }
            })?;

        Ok(OrderOutcome {
            client_order_index: intent.client_order_index,
            symbol: symbol.to_string(),
            status: OrderStatus::Submitted,
            submission_handle: hash,
        })
    }
}

fn ensure_positive(symbol: &str, quantity: Decimal) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(EngineError::InvalidQuantity {
            symbol: symbol.to_string(),
            quantity,
        });
    }
    Ok(())
}

/// Leverage to margin fraction in basis points: 10x -> 1000.
pub fn initial_margin_fraction(leverage: u32) -> Result<u16> {
    if leverage == 0 || leverage > MAX_LEVERAGE {
        return Err(EngineError::InvalidLeverage(leverage));
    }
    u16::try_from(IMF_BASIS_POINTS / leverage).map_err(|_| EngineError::InvalidLeverage(leverage))
}
