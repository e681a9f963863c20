// src/connectors/messages.rs
use crate::connectors::error::ClientError;
use crate::types::{AccountPosition, AccountState, MarketInfo, OrderBookQuote};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::warn;

const CODE_OK: i32 = 200;

/// Response of `/api/v1/orderBooks`.
#[derive(Debug, Deserialize)]
pub struct OrderBooksResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order_books: Vec<OrderBookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OrderBookEntry {
    pub symbol: String,
    pub market_id: u8,
    pub supported_size_decimals: u8,
    pub supported_price_decimals: u8,
}

/// Response of `/api/v1/account?by=index&value=N`.
#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AccountEntry {
    pub index: i64,
    #[serde(default)]
    pub available_balance: String,
    #[serde(default)]
    pub collateral: String,
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PositionEntry {
    pub symbol: String,
    #[serde(default)]
    pub initial_margin_fraction: String,
    /// 1 for long, -1 for short; `position` itself is unsigned.
    pub sign: i32,
    pub position: String,
    #[serde(default)]
    pub avg_entry_price: String,
    #[serde(default)]
    pub position_value: String,
    #[serde(default)]
    pub unrealized_pnl: String,
    #[serde(default)]
    pub liquidation_price: String,
}

/// Response of `/api/v1/orderBookDetails?market_id=N`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderBookDetailResponse {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mark_price: Option<String>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
}

#[derive(Debug, Deserialize)]
pub struct PriceLevel {
    pub price: String,
}

/// Empty strings are treated as zero; anything else must parse.
fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(trimmed).map_err(|_| ClientError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn check_code(code: i32, message: Option<String>) -> Result<(), ClientError> {
    if code != CODE_OK {
        return Err(ClientError::Api {
            code,
            message: message.unwrap_or_default(),
        });
    }
    Ok(())
}

impl OrderBooksResponse {
    pub fn into_markets(self) -> Result<Vec<MarketInfo>, ClientError> {
        check_code(self.code, self.message)?;
        Ok(self
            .order_books
            .into_iter()
            .map(|book| MarketInfo {
                coin: book.symbol,
                market_index: book.market_id,
                size_decimals: u32::from(book.supported_size_decimals),
                price_decimals: u32::from(book.supported_price_decimals),
            })
            .collect())
    }
}

impl AccountResponse {
    /// First account of the response, if any.
    pub fn into_state(self) -> Result<Option<AccountState>, ClientError> {
        check_code(self.code, self.message)?;
        self.accounts
            .into_iter()
            .next()
            .map(AccountEntry::into_state)
            .transpose()
    }
}

impl AccountEntry {
    fn into_state(self) -> Result<AccountState, ClientError> {
        let positions = self
            .positions
            .into_iter()
            .map(PositionEntry::into_position)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AccountState {
            index: self.index,
            available_balance: parse_decimal("available_balance", &self.available_balance)?,
            collateral: parse_decimal("collateral", &self.collateral)?,
            positions,
        })
    }
}

impl PositionEntry {
    fn into_position(self) -> Result<AccountPosition, ClientError> {
        let magnitude = parse_decimal("position", &self.position)?.abs();
        let raw_quantity = if self.sign < 0 { -magnitude } else { magnitude };

        Ok(AccountPosition {
            coin: self.symbol,
            raw_quantity,
            initial_margin_fraction: parse_decimal(
                "initial_margin_fraction",
                &self.initial_margin_fraction,
            )?,
            avg_entry_price: parse_decimal("avg_entry_price", &self.avg_entry_price)?,
            position_value: parse_decimal("position_value", &self.position_value)?,
            // The account endpoint does not report a mark price.
            mark_price: None,
            unrealized_pnl: parse_decimal("unrealized_pnl", &self.unrealized_pnl)?,
            liquidation_price: parse_decimal("liquidation_price", &self.liquidation_price)?,
        })
    }
}

impl OrderBookDetailResponse {
    pub fn into_quote(self) -> Result<OrderBookQuote, ClientError> {
        if let Some(code) = self.code {
            check_code(code, self.message)?;
        }
        // A bad mark price must not hide a usable book mid.
        let mark_price = self
            .mark_price
            .as_deref()
            .and_then(|p| match parse_decimal("mark_price", p) {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!("⚠️ Ignoring mark price: {}", e);
                    None
                }
            });
        let best_ask = self
            .asks
            .first()
            .map(|level| parse_decimal("asks.price", &level.price))
            .transpose()?;
        let best_bid = self
            .bids
            .first()
            .map(|level| parse_decimal("bids.price", &level.price))
            .transpose()?;

        Ok(OrderBookQuote {
            mark_price,
            best_ask,
            best_bid,
        })
    }
}
