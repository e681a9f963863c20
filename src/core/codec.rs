// src/core/codec.rs
use crate::core::markets::MarketCache;
use crate::error::{EngineError, Result};
use crate::types::MarketInfo;
use crate::utils::precision::{format_truncated, from_raw, to_raw, PrecisionPolicy};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
enum Field {
    Size,
    Price,
}

impl Field {
    fn decimals(self, market: &MarketInfo) -> u32 {
        match self {
            Field::Size => market.size_decimals,
            Field::Price => market.price_decimals,
        }
    }
}

/// Converts human quantities and prices to exchange base units using cached
/// market precision. Size and price are encoded independently; minimum
/// notional and similar checks are left to the exchange.
pub struct NumericCodec {
    markets: Arc<MarketCache>,
    policy: PrecisionPolicy,
}

impl NumericCodec {
    pub fn new(markets: Arc<MarketCache>, policy: PrecisionPolicy) -> Self {
        Self { markets, policy }
    }

    pub async fn to_raw_size(&self, symbol: &str, quantity: Decimal) -> Result<i64> {
        let market = self.markets.peek(symbol).await;
        self.encode(symbol, market.as_ref(), quantity, Field::Size)
    }

    pub async fn to_raw_price(&self, symbol: &str, price: Decimal) -> Result<i64> {
        let market = self.markets.peek(symbol).await;
        self.encode(symbol, market.as_ref(), price, Field::Price)
    }

    pub async fn from_raw_size(&self, symbol: &str, raw: i64) -> Result<Decimal> {
        let market = self.markets.peek(symbol).await;
        self.decode(symbol, market.as_ref(), raw, Field::Size)
    }

    pub async fn from_raw_price(&self, symbol: &str, raw: i64) -> Result<Decimal> {
        let market = self.markets.peek(symbol).await;
        self.decode(symbol, market.as_ref(), raw, Field::Price)
    }

    /// Quantity truncated to the market's size precision, as a string.
    pub async fn format_quantity(&self, symbol: &str, quantity: Decimal) -> Result<String> {
        let market = self.markets.peek(symbol).await;
        let decimals = self.decimals(symbol, market.as_ref(), Field::Size)?;
        Ok(format_truncated(quantity, decimals))
    }

    /// Encoding against an already resolved market.
    pub fn encode_size(&self, market: &MarketInfo, quantity: Decimal) -> Result<i64> {
        self.encode(&market.coin, Some(market), quantity, Field::Size)
    }

    pub fn encode_price(&self, market: &MarketInfo, price: Decimal) -> Result<i64> {
        self.encode(&market.coin, Some(market), price, Field::Price)
    }

    fn decimals(&self, symbol: &str, market: Option<&MarketInfo>, field: Field) -> Result<u32> {
        if let Some(market) = market {
            return Ok(field.decimals(market));
        }
        match self.policy {
            PrecisionPolicy::Fallback { decimals } => {
                warn!(
                    "⚠️ No market metadata for {}, encoding {:?} with fallback {} decimals",
                    symbol, field, decimals
                );
                Ok(decimals)
            }
            PrecisionPolicy::FailClosed => Err(EngineError::PrecisionUnavailable(symbol.to_string())),
        }
    }

    fn encode(
        &self,
        symbol: &str,
        market: Option<&MarketInfo>,
        value: Decimal,
        field: Field,
    ) -> Result<i64> {
        let decimals = self.decimals(symbol, market, field)?;
        to_raw(value, decimals).ok_or_else(|| EngineError::EncodingOverflow {
            symbol: symbol.to_string(),
            value,
            decimals,
        })
    }

    fn decode(
        &self,
        symbol: &str,
        market: Option<&MarketInfo>,
        raw: i64,
        field: Field,
    ) -> Result<Decimal> {
        let decimals = self.decimals(symbol, market, field)?;
        from_raw(raw, decimals).ok_or_else(|| EngineError::EncodingOverflow {
            symbol: symbol.to_string(),
            value: Decimal::from(raw),
            decimals,
        })
    }
}
