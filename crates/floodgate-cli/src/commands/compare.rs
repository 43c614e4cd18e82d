//! Compare command - show drift between local definitions and Gate

use std::path::Path;

use floodgate_sync::{ResourceManager, SyncReporter};

use crate::display;
use crate::error::{CliError, Result};

/// Run the compare command
pub async fn run(config: &Path, reporter: Box<dyn SyncReporter>, output_json: bool) -> Result<()> {
    let manager = ResourceManager::init(config, reporter).await?;
    let changes = manager.get_changes()?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        for change in &changes {
            display::print_change(change);
        }
        display::print_compare_footer(changes.len(), manager.resources().len());
    }

    if changes.is_empty() {
        Ok(())
    } else {
        Err(CliError::OutOfSync {
            count: changes.len(),
        })
    }
}
