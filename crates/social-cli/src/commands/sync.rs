//! Schema sync command
//!
//! Usage: social sync [--force]

use clap::Args;
use social_core::social_core_types::RequestContext;
use social_engine::{apply_engine_command, EngineCommand};
use social_store::StoreConfig;

use super::CliResult;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Drop every table before creating it again
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: SyncArgs, store: &StoreConfig) -> CliResult {
    let mut repo = store.open()?;
    apply_engine_command(
        EngineCommand::Sync { force: args.force },
        &mut repo,
        &RequestContext::new(),
    )?;

    if args.force {
        println!("Schema synced (tables dropped and recreated)");
    } else {
        println!("Schema synced");
    }
    Ok(())
}
