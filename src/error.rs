// src/error.rs
use crate::connectors::error::ClientError;
use crate::types::PositionSide;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the execution engine.
///
/// Pre-flight failures (`MarketNotFound`, `PriceUnavailable`, validation) are
/// raised before anything state-mutating reaches the exchange. Critical-step
/// failures (`LeverageSetFailed`, `OrderSubmissionFailed`) abort the workflow
/// but leave earlier steps in place; nothing is rolled back.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Market not found for symbol: {0}")]
    MarketNotFound(String),

    #[error("Failed to reload market metadata: {0}")]
    MetadataReload(#[source] ClientError),

    #[error("Price unavailable for {symbol}")]
    PriceUnavailable {
        symbol: String,
        #[source]
        source: Option<ClientError>,
    },

    #[error("No {side} position to close on {symbol}")]
    NoPositionToClose { symbol: String, side: PositionSide },

    #[error("Failed to set leverage {leverage}x on {symbol}: {source}")]
    LeverageSetFailed {
        symbol: String,
        leverage: u32,
        #[source]
        source: ClientError,
    },

    #[error("Order submission failed on {symbol}: {source}")]
    OrderSubmissionFailed {
        symbol: String,
        #[source]
        source: ClientError,
    },

    #[error("Cancel-all failed on {symbol}: {source}")]
    CancelFailed {
        symbol: String,
        #[source]
        source: ClientError,
    },

    #[error("Account data unavailable: {0}")]
    AccountUnavailable(#[source] ClientError),

    #[error("Account {0} not found")]
    AccountNotFound(i64),

    #[error("Invalid leverage: {0} (expected 1..=10000)")]
    InvalidLeverage(u32),

    #[error("Invalid quantity for {symbol}: {quantity}")]
    InvalidQuantity { symbol: String, quantity: Decimal },

    #[error("No precision metadata for {0} and fallback encoding is disabled")]
    PrecisionUnavailable(String),

    #[error("Value {value} for {symbol} does not fit the exchange encoding at {decimals} decimals")]
    EncodingOverflow {
        symbol: String,
        value: Decimal,
        decimals: u32,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
