use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{debug, info, warn};

use common::logger;
use market_data::YahooDividendClient;
use monitor::services::build_dispatcher;
use monitor::symbols::load_symbols;
use monitor::{DividendMonitor, MonitorConfig};
use storage::open_store;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("Dividend monitor starting up...");

    let config = MonitorConfig::from_env()?;
    debug!("Storage: {:?}", config.storage);

    let symbols = load_symbols(&config.symbols_path).await?;
    if symbols.is_empty() {
        warn!("No symbols listed in {}", config.symbols_path.display());
    }

    let fetcher = Arc::new(YahooDividendClient::new(config.yahoo.clone())?);
    let store = open_store(&config.storage).await?;
    let dispatcher = build_dispatcher(&config.alert)?;

    let monitor = DividendMonitor::new(config.monitor.clone(), fetcher, store, dispatcher);
    let report = monitor.run(&symbols).await?;

    info!(
        "Run complete: {} checked, {} alerts, {} skipped, {} failed",
        report.processed, report.alerts, report.skipped_zero, report.fetch_failures
    );
    Ok(())
}
