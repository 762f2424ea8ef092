//! Crypto Price Analyzer - Main Entry Point
//!
//! Refreshes the quote store from Binance, then writes statistical and
//! volatility reports for every configured symbol.

use crypto_price_analyzer::*;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};

use crypto_price_analyzer::{
    config::FetchMode,
    network::BinanceClient,
    statistics::{attach_period_volatility, StatisticalAnalyzer},
    storage::{save_reports, save_volatility_csv},
    store::{QuoteSource, QuoteStore},
    utils::SystemClock,
    volatility::{oscillation_rows, VolatilityEngine, DEFAULT_ANALYSIS_DAYS},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = CONFIG.clone();

    // Initialize logging
    utils::setup_output_directories(&config)?;
    let _logging_guard = utils::setup_logging(&config.log_dir)?;

    info!("📈 Crypto Price Analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Symbols: {}", config.symbols.join(", "));
    info!("   Quote Asset: {}", config.quote_asset);
    info!("   History: {} days", config.history_days);
    info!("   Store: {}", config.store_path);
    info!("   Reports: {}", config.report_dir);
    info!("   Source: {} (timeout {}s)", config.binance_base_url, config.request_timeout_secs);
    info!("   Fetch Mode: {}", config.fetch_mode);
    if let Some(import) = &config.csv_import {
        info!("   CSV Import: {} as {}", import.path, import.symbol);
    }
    if config.fetch_only {
        info!("   Mode: fetch only");
    } else if config.report_only {
        info!("   Mode: report only");
    }

    let mut store = QuoteStore::load(&config.store_path, Arc::new(SystemClock))?;
    info!("💾 Loaded {} stored quotes", store.len());

    if let Some(import) = &config.csv_import {
        let imported = store.import_csv(&import.path, &import.symbol, &import.format)?;
        store.save(&config.store_path)?;
        info!("📥 Imported {} {} quotes from {}", imported, import.symbol, import.path);
    }

    if !config.report_only {
        refresh_quotes(&config, &mut store).await?;
    }

    if config.fetch_only {
        info!("✅ Fetch complete");
        return Ok(());
    }

    generate_reports(&config, &store)
}

async fn refresh_quotes(config: &Config, store: &mut QuoteStore) -> Result<()> {
    let client = BinanceClient::from_config(config)?;
    info!(
        "🌐 Fetching daily closes ({} mode, up to {} days)...",
        config.fetch_mode, config.history_days
    );

    let mut fetched_symbols = 0;
    for symbol in &config.symbols {
        let days = match config.fetch_mode {
            FetchMode::Full => config.history_days,
            FetchMode::Incremental => store.incremental_fetch_days(symbol, config.history_days),
        };

        match client.fetch_daily_closes(symbol, days).await {
            Ok(quotes) => {
                let received = quotes.len();
                let added = store.upsert_batch(quotes);
                let since = store
                    .oldest_timestamp(symbol)
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                info!(
                    "   ✅ {}: {} quotes received ({} days requested), {} new days, history since {}",
                    symbol, received, days, added, since
                );
                fetched_symbols += 1;
            }
            Err(e) => {
                warn!("   ⚠️  {}: fetch failed, keeping stored history: {}", symbol, e);
            }
        }
        // Stay well inside the public API weight limits
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    store.save(&config.store_path)?;
    info!(
        "💾 Saved {} quotes ({}/{} symbols refreshed)",
        store.len(),
        fetched_symbols,
        config.symbols.len()
    );

    Ok(())
}

fn generate_reports(config: &Config, store: &QuoteStore) -> Result<()> {
    let analyzer = StatisticalAnalyzer::system();
    let mut reports = analyzer.batch_generate_reports(&config.symbols, |symbol| {
        store.get_quotes(symbol, None)
    });

    let engine = VolatilityEngine::new(store);
    let filled = attach_period_volatility(&mut reports, &engine);
    info!("🌊 Attached volatility to {} report periods", filled);

    let oscillations = engine.analyze_all_symbols(&config.symbols, DEFAULT_ANALYSIS_DAYS)?;

    let report_path = save_reports(&config.report_dir, &reports)?;
    info!("📝 Report written to {}", report_path.display());
    let csv_path = save_volatility_csv(&config.report_dir, &oscillation_rows(&oscillations))?;
    info!("📝 Volatility table written to {}", csv_path.display());

    utils::print_report_summary(&reports);
    utils::print_volatility_summary(&oscillations);

    let valid = reports.values().filter(|entry| !entry.is_error()).count();
    if valid == 0 {
        error!("❌ No symbol produced a valid report");
        return Err(anyhow::anyhow!("No valid reports generated"));
    }

    info!("✅ {} of {} symbols reported", valid, reports.len());
    Ok(())
}
