//! Floodgate CLI - keep Spinnaker resources in sync with their file definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use floodgate_core::{Config, ResourceKind};
use floodgate_sync::{ConsoleReporter, QuietReporter, SyncReporter, TracingReporter};

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;

use error::Result;

#[derive(Parser)]
#[command(name = "floodgate")]
#[command(version)]
#[command(about = "Keep Spinnaker applications, pipelines and pipeline templates in sync with files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/floodgate/config.yaml)
    #[arg(short, long, global = true, env = "FLOODGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show resources whose local definition differs from Gate
    Compare {
        /// Output changes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Push changed resources to Gate
    Sync,

    /// Print the remote state Gate holds for the defined resources
    Inspect {
        /// Only print one kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Application,
    Pipeline,
    #[value(name = "pipelinetemplate", alias = "template")]
    PipelineTemplate,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Application => ResourceKind::Application,
            KindArg::Pipeline => ResourceKind::Pipeline,
            KindArg::PipelineTemplate => ResourceKind::PipelineTemplate,
        }
    }
}

/// Pick the progress reporter for this run
///
/// Interactive terminals get styled progress; otherwise events go through
/// `tracing` so they land in the log stream.
fn reporter(debug: bool, quiet: bool) -> Box<dyn SyncReporter> {
    if quiet {
        Box::new(QuietReporter::new())
    } else if !console::Term::stderr().features().is_attended() {
        Box::new(TracingReporter)
    } else if debug {
        Box::new(ConsoleReporter::new().verbose())
    } else {
        Box::new(ConsoleReporter::new())
    }
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.debug, cli.quiet) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        if err.is_reported() {
            eprintln!("{:?}", miette::Report::new(err));
        }
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    tracing::debug!("using config {}", config.display());

    let reporter = reporter(cli.debug, cli.quiet);

    match cli.command {
        Commands::Compare { json } => commands::compare::run(&config, reporter, json).await,
        Commands::Sync => commands::sync::run(&config, reporter).await,
        Commands::Inspect { kind } => {
            commands::inspect::run(&config, reporter, kind.map(ResourceKind::from)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect_kind() {
        let cli = Cli::try_parse_from(["floodgate", "inspect", "--kind", "template"]).unwrap();
        match cli.command {
            Commands::Inspect { kind: Some(kind) } => {
                assert_eq!(ResourceKind::from(kind), ResourceKind::PipelineTemplate)
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_debug() {
        assert!(Cli::try_parse_from(["floodgate", "--quiet", "--debug", "sync"]).is_err());
    }
}
