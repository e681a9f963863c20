// src/types.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash handed back by the submitter once a request was accepted.
pub type SubmissionHandle = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Sell)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Order side that grows a position of this direction.
    pub fn entry_side(self) -> Side {
        match self {
            PositionSide::Long => Side::Buy,
            PositionSide::Short => Side::Sell,
        }
    }

    /// Order side that reduces a position of this direction.
    pub fn exit_side(self) -> Side {
        match self {
            PositionSide::Long => Side::Sell,
            PositionSide::Short => Side::Buy,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Exchange metadata for one market, keyed by its coin ("ETH", "BTC").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub coin: String,
    pub market_index: u8,
    pub size_decimals: u32,
    pub price_decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    #[default]
    Cross,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    ImmediateOrCancel,
    /// Only meaningful on cancel-all requests.
    ImmediateCancelAll,
}

/// Fully encoded order handed to the submitter. All numeric fields are in
/// exchange base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub market_index: u8,
    pub client_order_index: i64,
    pub base_amount: i64,
    pub price: i64,
    pub is_ask: bool,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub reduce_only: bool,
    pub trigger_price: Option<i64>,
    /// Unix milliseconds.
    pub expiry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageRequest {
    pub symbol: String,
    pub market_index: u8,
    /// Basis points: 10_000 / leverage.
    pub initial_margin_fraction: u16,
    pub margin_mode: MarginMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAllRequest {
    pub symbol: String,
    pub time_in_force: TimeInForce,
    pub timestamp_ms: i64,
}

/// Top of the order book as reported by the data client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookQuote {
    pub mark_price: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub best_bid: Option<Decimal>,
}

impl OrderBookQuote {
    /// Mark price when present, otherwise the mid of a two-sided book.
    pub fn reference_price(&self) -> Option<Decimal> {
        if let Some(mark) = self.mark_price.filter(|p| *p > Decimal::ZERO) {
            return Some(mark);
        }
        match (self.best_ask, self.best_bid) {
            (Some(ask), Some(bid)) if ask > Decimal::ZERO && bid > Decimal::ZERO => {
                Some((ask + bid) / Decimal::from(2))
            }
            _ => None,
        }
    }
}

/// One position row as returned by the exchange, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPosition {
    pub coin: String,
    /// Signed: positive is long, negative is short.
    pub raw_quantity: Decimal,
    /// Percentage form, e.g. 10 means 10% margin (10x).
    pub initial_margin_fraction: Decimal,
    pub avg_entry_price: Decimal,
    pub position_value: Decimal,
    pub mark_price: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    pub liquidation_price: Decimal,
}

/// Raw account record; `collateral` already includes unrealized P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub index: i64,
    pub available_balance: Decimal,
    pub collateral: Decimal,
    pub positions: Vec<AccountPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub unrealized_pnl: Decimal,
}

impl AccountSnapshot {
    pub fn total_equity(&self) -> Decimal {
        self.wallet_balance + self.unrealized_pnl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub liquidation_price: Decimal,
    pub leverage: Option<Decimal>,
}

/// What the engine knows about an order after handing it off. Fills are never
/// observed here; confirm through a fresh account query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Submitted,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Submitted => write!(f, "submitted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub client_order_index: i64,
    pub symbol: String,
    pub status: OrderStatus,
    pub submission_handle: SubmissionHandle,
}

/// Best-effort step that failed without aborting the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowWarning {
    StaleOrdersNotCancelled { symbol: String, reason: String },
    ResidualOrdersNotCancelled { symbol: String, reason: String },
}

impl fmt::Display for WorkflowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowWarning::StaleOrdersNotCancelled { symbol, reason } => {
                write!(f, "stale orders on {} may remain: {}", symbol, reason)
            }
            WorkflowWarning::ResidualOrdersNotCancelled { symbol, reason } => {
                write!(f, "residual orders on {} may remain: {}", symbol, reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcome: OrderOutcome,
    pub warnings: Vec<WorkflowWarning>,
}
