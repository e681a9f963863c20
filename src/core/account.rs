// src/core/account.rs
use crate::connectors::traits::MarketDataClient;
use crate::error::{EngineError, Result};
use crate::types::{AccountPosition, AccountSnapshot, AccountState, Position, PositionSide};
use crate::utils::symbol::symbol_of;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Reads balances and positions straight from the exchange. Nothing is
/// cached: every call is a fresh fetch, and two calls may observe different
/// account states.
pub struct AccountReader {
    client: Arc<dyn MarketDataClient>,
    account_index: i64,
    quote_suffix: String,
}

impl AccountReader {
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        account_index: i64,
        quote_suffix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            account_index,
            quote_suffix: quote_suffix.into(),
        }
    }

    async fn fetch(&self) -> Result<Option<AccountState>> {
        self.client
            .get_account(self.account_index)
            .await
            .map_err(EngineError::AccountUnavailable)
    }

    pub async fn get_balance(&self) -> Result<AccountSnapshot> {
        let state = self
            .fetch()
            .await?
            .ok_or(EngineError::AccountNotFound(self.account_index))?;
        let snapshot = snapshot_from(&state);

        info!(
            "✅ Account {}: equity={} (wallet {} + unrealized {}), available={}",
            state.index,
            state.collateral,
            snapshot.wallet_balance,
            snapshot.unrealized_pnl,
            snapshot.available_balance
        );
        Ok(snapshot)
    }

    /// Open positions only; an unknown account simply has none.
    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        Ok(self
            .fetch()
            .await?
            .map(|state| positions_from(&state, &self.quote_suffix))
            .unwrap_or_default())
    }
}

/// Exchange collateral already contains unrealized P&L; the wallet balance
/// reported here excludes it.
pub fn snapshot_from(state: &AccountState) -> AccountSnapshot {
    let unrealized_pnl: Decimal = state.positions.iter().map(|p| p.unrealized_pnl).sum();
    AccountSnapshot {
        wallet_balance: state.collateral - unrealized_pnl,
        available_balance: state.available_balance,
        unrealized_pnl,
    }
}

pub fn positions_from(state: &AccountState, quote_suffix: &str) -> Vec<Position> {
    state
        .positions
        .iter()
        .filter_map(|raw| position_from(raw, quote_suffix))
        .collect()
}

/// `None` for flat positions. The zero check must come before the mark
/// price division below.
fn position_from(raw: &AccountPosition, quote_suffix: &str) -> Option<Position> {
    if raw.raw_quantity.is_zero() {
        return None;
    }

    let side = if raw.raw_quantity > Decimal::ZERO {
        PositionSide::Long
    } else {
        PositionSide::Short
    };
    let amount = raw.raw_quantity.abs();
    let mark_price = match raw.mark_price {
        Some(mark) => mark,
        None => raw.position_value.checked_div(amount).unwrap_or_else(|| {
            warn!("⚠️ {}: mark price out of range, reporting zero", raw.coin);
            Decimal::ZERO
        }),
    };
    let leverage = if raw.initial_margin_fraction > Decimal::ZERO {
        Decimal::ONE_HUNDRED.checked_div(raw.initial_margin_fraction)
    } else {
        None
    };

    Some(Position {
        symbol: symbol_of(&raw.coin, quote_suffix),
        side,
        amount,
        entry_price: raw.avg_entry_price,
        mark_price,
        unrealized_pnl: raw.unrealized_pnl,
        liquidation_price: raw.liquidation_price,
        leverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(coin: &str, quantity: Decimal, imf: Decimal) -> AccountPosition {
        AccountPosition {
            coin: coin.to_string(),
            raw_quantity: quantity,
            initial_margin_fraction: imf,
            avg_entry_price: dec!(100),
            position_value: quantity.abs() * dec!(110),
            mark_price: None,
            unrealized_pnl: dec!(5),
            liquidation_price: dec!(50),
        }
    }

    fn state(positions: Vec<AccountPosition>) -> AccountState {
        AccountState {
            index: 1,
            available_balance: dec!(700),
            collateral: dec!(1000),
            positions,
        }
    }

    #[test]
    fn positive_quantity_is_long() {
        let positions = positions_from(&state(vec![raw("ETH", dec!(2.5), dec!(10))]), "USDT");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "ETHUSDT");
        assert_eq!(positions[0].side, PositionSide::Long);
        assert_eq!(positions[0].amount, dec!(2.5));
    }

    #[test]
    fn negative_quantity_is_short() {
        let positions = positions_from(&state(vec![raw("BTC", dec!(-1.0), dec!(5))]), "USDT");
        assert_eq!(positions[0].side, PositionSide::Short);
        assert_eq!(positions[0].amount, dec!(1.0));
        assert_eq!(positions[0].leverage, Some(dec!(20)));
    }

    #[test]
    fn flat_positions_are_dropped() {
        let positions = positions_from(
            &state(vec![
                raw("ETH", Decimal::ZERO, dec!(10)),
                raw("SOL", dec!(3), dec!(10)),
            ]),
            "USDT",
        );
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "SOLUSDT");
    }

    #[test]
    fn non_positive_margin_fraction_leaves_leverage_unset() {
        let positions = positions_from(
            &state(vec![
                raw("ETH", dec!(1), Decimal::ZERO),
                raw("BTC", dec!(1), dec!(-2)),
            ]),
            "USDT",
        );
        assert!(positions.iter().all(|p| p.leverage.is_none()));
    }

    #[test]
    fn tiny_margin_fraction_leaves_leverage_unset() {
        let tiny = Decimal::new(1, 28);
        let positions = positions_from(&state(vec![raw("ETH", dec!(1), tiny)]), "USDT");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].leverage, None);
    }

    #[test]
    fn oversized_position_value_reports_zero_mark() {
        let mut huge = raw("ETH", Decimal::new(1, 28), dec!(10));
        huge.position_value = Decimal::MAX;
        let positions = positions_from(&state(vec![huge]), "USDT");
        assert_eq!(positions[0].mark_price, Decimal::ZERO);
        assert_eq!(positions[0].leverage, Some(dec!(10)));
    }

    #[test]
    fn mark_price_derived_from_position_value() {
        let positions = positions_from(&state(vec![raw("ETH", dec!(-2), dec!(10))]), "USDT");
        assert_eq!(positions[0].mark_price, dec!(110));
    }

    #[test]
    fn reported_mark_price_wins() {
        let mut with_mark = raw("ETH", dec!(2), dec!(10));
        with_mark.mark_price = Some(dec!(123));
        let positions = positions_from(&state(vec![with_mark]), "USDT");
        assert_eq!(positions[0].mark_price, dec!(123));
    }

    #[test]
    fn wallet_balance_excludes_unrealized_pnl() {
        let snapshot = snapshot_from(&state(vec![
            raw("ETH", dec!(1), dec!(10)),
            raw("BTC", dec!(-1), dec!(10)),
        ]));
        assert_eq!(snapshot.unrealized_pnl, dec!(10));
        assert_eq!(snapshot.wallet_balance, dec!(990));
        assert_eq!(snapshot.available_balance, dec!(700));
        assert_eq!(snapshot.total_equity(), dec!(1000));
    }
}
