// src/config.rs

use crate::types::MarginMode;
use crate::utils::precision::PrecisionPolicy;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::time::Duration;

pub const MAINNET_ENDPOINT: &str = "https://mainnet.zklighter.elliot.ai";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// REST endpoint, testnet or mainnet.
    pub endpoint: String,
    pub account_index: i64,
    /// Suffix stripped from caller symbols to get the exchange coin.
    pub quote_suffix: String,
    pub margin_mode: MarginMode,
    /// Adverse offset applied to the reference price for IOC orders.
    pub slippage: Decimal,
    pub protective_order_ttl_days: i64,
    pub precision_policy: PrecisionPolicy,
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: MAINNET_ENDPOINT.to_string(),
            account_index: 0,
            quote_suffix: "USDT".to_string(),
            margin_mode: MarginMode::Cross,
            slippage: dec!(0.01),
            protective_order_ttl_days: 30,
            precision_policy: PrecisionPolicy::default(),
            request_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    /// `Settings.*` (optional) overlaid by `APP__*` environment variables,
    /// e.g. `APP__ACCOUNT_INDEX=7`.
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        let parsed: EngineConfig = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.slippage < Decimal::ZERO || self.slippage >= Decimal::ONE {
            return Err(ConfigError::Message(format!(
                "slippage must be in [0, 1), got {}",
                self.slippage
            )));
        }
        if self.protective_order_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "protective_order_ttl_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_exchange_conventions() {
        let config = EngineConfig::default();
        assert_eq!(config.quote_suffix, "USDT");
        assert_eq!(config.slippage, dec!(0.01));
        assert_eq!(config.protective_order_ttl_days, 30);
        assert_eq!(
            config.precision_policy,
            PrecisionPolicy::Fallback { decimals: 4 }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_full_slippage() {
        let config = EngineConfig {
            slippage: Decimal::ONE,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_fail_closed_policy() {
        let config = Config::builder()
            .set_override("precision_policy.mode", "fail_closed")
            .unwrap()
            .set_override("account_index", 7)
            .unwrap()
            .build()
            .unwrap();
        let parsed: EngineConfig = config.try_deserialize().unwrap();
        assert_eq!(parsed.precision_policy, PrecisionPolicy::FailClosed);
        assert_eq!(parsed.account_index, 7);
        assert_eq!(parsed.endpoint, MAINNET_ENDPOINT);
    }
}
