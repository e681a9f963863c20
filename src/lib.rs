//! Order execution engine for a perpetual-futures exchange that only speaks
//! fixed-point integer prices and sizes.
//!
//! The engine resolves per-market precision, sequences multi-step workflows
//! (cancel, set leverage, submit) under a per-symbol lock, and rebuilds
//! positions from account snapshots. Signing and raw network access sit
//! behind [`connectors::traits::TxSubmitter`] and
//! [`connectors::traits::MarketDataClient`].

pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

pub use crate::core::engine::ExecutionEngine;
pub use crate::error::{EngineError, Result};
