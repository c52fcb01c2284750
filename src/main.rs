use scrooge_ledger::{
    batch::EpochEngine,
    config::Config,
    ledger,
    ConfirmationStatus,
};
use tracing::{info, warn};

/// Entry point for the `scrooge` binary.
///
/// Loads the configuration (path from the first argument, or
/// `config/default.toml`), validates every batch against the genesis pool in
/// order, and writes the resulting pool snapshot.
fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();
    info!("Scrooge starting with config: {:?}", config);

    let genesis = ledger::load_pool(&config.ledger.genesis_path)?;
    let batches = ledger::load_batches(&config.ledger.batches_path)?;

    let mut engine = EpochEngine::new(&genesis);
    for batch in &batches {
        let receipt = engine.run_epoch(batch);
        for tx_receipt in &receipt.receipts {
            if let ConfirmationStatus::Rejected { reason } = &tx_receipt.status {
                warn!(
                    "Epoch #{}: transaction {:?} rejected: {}",
                    receipt.epoch, tx_receipt.tx_hash, reason
                );
            }
        }
    }

    let stats = engine.pool().stats();
    info!(
        "Final pool: {} UTXOs holding {} units",
        stats.utxo_count, stats.total_value
    );

    ledger::save_pool(&config.ledger.output_path, engine.pool())?;
    info!("Pool written to {}", config.ledger.output_path.display());

    Ok(())
}
