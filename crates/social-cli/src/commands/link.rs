//! Link / unlink commands
//!
//! Usage:
//!   social link <ASSOCIATION> <OWNER_ID> <TARGET_ID>...
//!   social unlink <ASSOCIATION> <OWNER_ID> [TARGET_ID]...
//!
//! ASSOCIATION is `entity.accessor`, e.g. `user.posts` or `like.users`.
//! Collection associations add/remove every target; single-valued ones
//! (`user.profile`, `post.user`) take exactly one target to link and
//! none to unlink.

use clap::Args;
use serde_json::json;
use social_core::repo::SocialRepo;
use social_core::social_core_types::RequestContext;
use social_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use social_store::StoreConfig;

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct LinkArgs {
    pub association: String,
    pub owner_id: String,
    #[arg(required = true)]
    pub target_ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UnlinkArgs {
    pub association: String,
    pub owner_id: String,
    pub target_ids: Vec<String>,
}

pub fn execute(args: LinkArgs, store: &StoreConfig) -> CliResult {
    let mut repo = store.open()?;
    let assoc = *repo.registry().resolve(&args.association)?;

    let cmd = if assoc.kind.is_collection() {
        EngineCommand::Add {
            association: args.association,
            owner_id: args.owner_id,
            target_ids: args.target_ids,
        }
    } else {
        let [target_id]: [String; 1] = args.target_ids.try_into().map_err(|_| {
            format!("{} links exactly one record", assoc.path())
        })?;
        EngineCommand::Set {
            association: args.association,
            owner_id: args.owner_id,
            target_id: Some(target_id),
        }
    };

    report(apply_engine_command(cmd, &mut repo, &RequestContext::new())?)
}

pub fn execute_unlink(args: UnlinkArgs, store: &StoreConfig) -> CliResult {
    let mut repo = store.open()?;
    let assoc = *repo.registry().resolve(&args.association)?;

    let cmd = if assoc.kind.is_collection() {
        EngineCommand::Remove {
            association: args.association,
            owner_id: args.owner_id,
            target_ids: args.target_ids,
        }
    } else {
        if !args.target_ids.is_empty() {
            return Err(format!("{} unlinks without a target", assoc.path()).into());
        }
        EngineCommand::Set {
            association: args.association,
            owner_id: args.owner_id,
            target_id: None,
        }
    };

    report(apply_engine_command(cmd, &mut repo, &RequestContext::new())?)
}

fn report(result: EngineCommandResult) -> CliResult {
    match result {
        EngineCommandResult::Linked {
            association,
            owner_id,
            count,
        } => print_json(&json!({
            "association": association,
            "owner_id": owner_id,
            "linked": count,
        })),
        EngineCommandResult::Unlinked {
            association,
            owner_id,
            count,
        } => print_json(&json!({
            "association": association,
            "owner_id": owner_id,
            "unlinked": count,
        })),
        other => Err(format!("unexpected result: {:?}", other).into()),
    }
}
