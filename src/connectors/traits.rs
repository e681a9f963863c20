// src/connectors/traits.rs
use crate::connectors::error::ClientError;
use crate::types::{
    AccountState, CancelAllRequest, LeverageRequest, MarketInfo, OrderBookQuote, OrderIntent,
    SubmissionHandle,
};
use async_trait::async_trait;

/// Read-only market and account queries.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn list_markets(&self) -> Result<Vec<MarketInfo>, ClientError>;

    /// `Ok(None)` when the exchange knows no account with this index.
    async fn get_account(&self, account_index: i64) -> Result<Option<AccountState>, ClientError>;

    async fn get_order_book_detail(&self, market_index: u8) -> Result<OrderBookQuote, ClientError>;
}

/// Signs and submits state-changing transactions. A returned handle means
/// "accepted for submission", never "filled".
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    async fn create_order(&self, intent: &OrderIntent) -> Result<SubmissionHandle, ClientError>;

    async fn cancel_all_orders(
        &self,
        request: &CancelAllRequest,
    ) -> Result<SubmissionHandle, ClientError>;

    async fn update_leverage(
        &self,
        request: &LeverageRequest,
    ) -> Result<SubmissionHandle, ClientError>;
}
