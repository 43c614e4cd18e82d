//! Inspect command - print the remote state Gate holds for each resource

use console::style;
use std::path::Path;

use floodgate_sync::{ResourceKind, ResourceManager, SyncReporter};

use crate::error::Result;

/// Run the inspect command
///
/// Each selected kind prints its snapshots concatenated on one line, in load
/// order. Without `--kind` every kind is printed under a header on stderr.
pub async fn run(
    config: &Path,
    reporter: Box<dyn SyncReporter>,
    kind: Option<ResourceKind>,
) -> Result<()> {
    let manager = ResourceManager::init(config, reporter).await?;

    match kind {
        Some(kind) => println!("{}", manager.remote_state_of(kind)),
        None => {
            for kind in ResourceKind::ALL {
                eprintln!("{}", style(format!("# {}", kind.plural())).dim());
                println!("{}", manager.remote_state_of(kind));
            }
        }
    }
    Ok(())
}
