use std::sync::Arc;

use arbitrage_keeper::config::{Cli, KeeperConfig};
use arbitrage_keeper::keeper::replay::{PaperSubmitter, SnapshotMarket};
use arbitrage_keeper::keeper::state::KeeperState;
use arbitrage_keeper::keeper::{BlockOutcome, Keeper};
use arbitrage_keeper::utils::logger::setup_logger;
use clap::Parser;
use eyre::Result;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    setup_logger(cli.debug)?;

    let config = KeeperConfig::try_from(&cli)?;
    let market = Arc::new(SnapshotMarket::load(&cli.snapshots)?);
    let submitter = Arc::new(PaperSubmitter::new(config.account));
    let keeper = Keeper::new(config, market.clone(), submitter.clone());

    keeper.startup().await?;

    let mut state = KeeperState::new();
    while let Some(block) = market.advance() {
        info!("Processing block {block}");
        if keeper.process_block(&mut state).await == BlockOutcome::Terminated {
            break;
        }
    }

    info!(
        "Keeper stopped after {} actions and {} errors",
        submitter.submitted().await.len(),
        state.errors()
    );
    Ok(())
}
