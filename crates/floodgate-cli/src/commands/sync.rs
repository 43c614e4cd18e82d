//! Sync command - push changed resources to Gate

use std::path::Path;

use floodgate_sync::{ResourceManager, SyncReporter};

use crate::display;
use crate::error::Result;

/// Run the sync command
pub async fn run(config: &Path, reporter: Box<dyn SyncReporter>) -> Result<()> {
    let mut manager = ResourceManager::init(config, reporter).await?;
    tracing::debug!(
        desynced = manager.desynced_resources().len(),
        total = manager.resources().len(),
        "loaded resources"
    );

    let summary = manager.sync_resources().await;
    display::print_summary(&summary);
    summary.into_result()?;
    Ok(())
}
