// src/connectors/paper.rs
use crate::connectors::error::ClientError;
use crate::connectors::traits::TxSubmitter;
use crate::types::{CancelAllRequest, LeverageRequest, OrderIntent, SubmissionHandle};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Request seen by the paper submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperTx {
    CreateOrder(OrderIntent),
    CancelAll(CancelAllRequest),
    UpdateLeverage(LeverageRequest),
}

/// Dry-run submitter: logs every request and answers with a synthetic hash.
/// Nothing is signed and nothing leaves the process.
#[derive(Default)]
pub struct PaperSubmitter {
    history: Mutex<Vec<(SubmissionHandle, PaperTx)>>,
}

impl PaperSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self) -> Vec<(SubmissionHandle, PaperTx)> {
        self.history.lock().await.clone()
    }

    async fn record(&self, tx: PaperTx) -> SubmissionHandle {
        let hash = format!("paper-{}", Uuid::new_v4().simple());
        self.history.lock().await.push((hash.clone(), tx));
        hash
    }
}

#[async_trait]
impl TxSubmitter for PaperSubmitter {
    async fn create_order(&self, intent: &OrderIntent) -> Result<SubmissionHandle, ClientError> {
        info!(
            "📝 Paper order: {} market={} ask={} base={} price={} reduce_only={} type={:?}",
            intent.symbol,
            intent.market_index,
            intent.is_ask,
            intent.base_amount,
            intent.price,
            intent.reduce_only,
            intent.order_type
        );
        Ok(self.record(PaperTx::CreateOrder(intent.clone())).await)
    }

    async fn cancel_all_orders(
        &self,
        request: &CancelAllRequest,
    ) -> Result<SubmissionHandle, ClientError> {
        info!("📝 Paper cancel-all: {} @ {}", request.symbol, request.timestamp_ms);
        Ok(self.record(PaperTx::CancelAll(request.clone())).await)
    }

    async fn update_leverage(
        &self,
        request: &LeverageRequest,
    ) -> Result<SubmissionHandle, ClientError> {
        info!(
            "📝 Paper leverage: {} imf={} mode={:?}",
            request.symbol, request.initial_margin_fraction, request.margin_mode
        );
        Ok(self.record(PaperTx::UpdateLeverage(request.clone())).await)
    }
}
