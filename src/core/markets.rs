// src/core/markets.rs
use crate::connectors::traits::MarketDataClient;
use crate::error::{EngineError, Result};
use crate::types::MarketInfo;
use crate::utils::symbol::coin_of;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub type MarketMap = HashMap<String, MarketInfo>;

/// Per-coin market metadata.
///
/// Readers take a cheap `Arc` snapshot of the current map. `reload` builds a
/// complete new map and publishes it with a single write, so a failed reload
/// leaves the previous snapshot untouched and readers never see a mix.
pub struct MarketCache {
    client: Arc<dyn MarketDataClient>,
    quote_suffix: String,
    markets: RwLock<Arc<MarketMap>>,
}

impl MarketCache {
    pub fn new(client: Arc<dyn MarketDataClient>, quote_suffix: impl Into<String>) -> Self {
        Self {
            client,
            quote_suffix: quote_suffix.into(),
            markets: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub async fn snapshot(&self) -> Arc<MarketMap> {
        self.markets.read().await.clone()
    }

    /// Cache probe without reloading.
    pub async fn peek(&self, symbol: &str) -> Option<MarketInfo> {
        let coin = coin_of(symbol, &self.quote_suffix);
        self.snapshot().await.get(coin).cloned()
    }

    /// Probe, reload once on a miss, probe again.
    pub async fn lookup(&self, symbol: &str) -> Result<MarketInfo> {
        if let Some(market) = self.peek(symbol).await {
            return Ok(market);
        }

        debug!("Market cache miss for {}, reloading", symbol);
        self.reload().await?;

        self.peek(symbol)
            .await
            .ok_or_else(|| EngineError::MarketNotFound(symbol.to_string()))
    }

    /// Replaces the whole map with the exchange's current market list.
    pub async fn reload(&self) -> Result<usize> {
        let listed = self
            .client
            .list_markets()
            .await
            .map_err(EngineError::MetadataReload)?;

        let fresh: MarketMap = listed
            .into_iter()
            .map(|market| (market.coin.clone(), market))
            .collect();
        let count = fresh.len();

        *self.markets.write().await = Arc::new(fresh);

        info!("✅ Loaded {} markets", count);
        Ok(count)
    }
}
