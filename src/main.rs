// src/main.rs
use dotenvy::dotenv;
use lighter_engine::config::EngineConfig;
use lighter_engine::connectors::lighter::LighterClient;
use lighter_engine::connectors::paper::PaperSubmitter;
use lighter_engine::ExecutionEngine;
use rust_decimal_macros::dec;
use std::env;
use std::sync::Arc;
use tracing::{error, warn};

const DEMO_SYMBOL: &str = "ETHUSDT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _log_guard = lighter_engine::logging::init();

    // 1. Load Configuration
    let config = EngineConfig::new()?;

    // Orders only ever go to the paper submitter here.
    let demo_orders = env::var("DEMO_ORDERS")
        .unwrap_or("false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    println!("========================================");
    println!("       LIGHTER ENGINE - v0.1.1");
    println!("========================================");
    println!("Endpoint: {}", config.endpoint);
    println!("Account:  {}", config.account_index);
    println!(
        "Orders:   {}",
        if demo_orders {
            "📝 PAPER (signed nowhere)"
        } else {
            "disabled"
        }
    );
    println!("========================================");

    // 2. Initialize Components
    let data = Arc::new(LighterClient::new(&config.endpoint, config.request_timeout())?);
    let submitter = Arc::new(PaperSubmitter::new());
    let engine = ExecutionEngine::new(config, data, submitter.clone());

    if let Err(e) = engine.load_markets().await {
        warn!("⚠️ Failed to load market info: {}", e);
    }

    // 3. Read-only queries
    match engine.get_balance().await {
        Ok(balance) => println!("Balance:   {:?}", balance),
        Err(e) => error!("Failed to fetch balance: {}", e),
    }

    match engine.get_positions().await {
        Ok(positions) => println!("Positions: {:?}", positions),
        Err(e) => error!("Failed to fetch positions: {}", e),
    }

    match engine.get_market_price(DEMO_SYMBOL).await {
        Ok(price) => println!("{} price: {}", DEMO_SYMBOL, price),
        Err(e) => error!("Failed to fetch price: {}", e),
    }

    // 4. Paper workflow
    if demo_orders {
        match engine.open_long(DEMO_SYMBOL, dec!(0.01), 10).await {
            Ok(report) => {
                println!("Open long: {:?}", report.outcome);
                for warning in &report.warnings {
                    println!("  warning: {}", warning);
                }
            }
            Err(e) => error!("Open long failed: {}", e),
        }
        for (hash, tx) in submitter.history().await {
            println!("  {} {:?}", hash, tx);
        }
    }

    Ok(())
}
