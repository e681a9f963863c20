// src/connectors/lighter.rs
use crate::connectors::error::ClientError;
use crate::connectors::messages::{AccountResponse, OrderBookDetailResponse, OrderBooksResponse};
use crate::connectors::traits::MarketDataClient;
use crate::types::{AccountState, MarketInfo, OrderBookQuote};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// REST client for the exchange's public market and account endpoints.
pub struct LighterClient {
    http_client: Client,
    base_url: Url,
}

impl LighterClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(endpoint)?;
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        debug!("GET {}", url);
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Request to {} failed: {} {}", url, status, body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketDataClient for LighterClient {
    async fn list_markets(&self) -> Result<Vec<MarketInfo>, ClientError> {
        let resp: OrderBooksResponse = self.get_json("/api/v1/orderBooks", &[]).await?;
        resp.into_markets()
    }

    async fn get_account(&self, account_index: i64) -> Result<Option<AccountState>, ClientError> {
        let resp: AccountResponse = self
            .get_json(
                "/api/v1/account",
                &[("by", "index".to_string()), ("value", account_index.to_string())],
            )
            .await?;
        resp.into_state()
    }

    async fn get_order_book_detail(&self, market_index: u8) -> Result<OrderBookQuote, ClientError> {
        let resp: OrderBookDetailResponse = self
            .get_json(
                "/api/v1/orderBookDetails",
                &[("market_id", market_index.to_string())],
            )
            .await?;
        resp.into_quote()
    }
}
