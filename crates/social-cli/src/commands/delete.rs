//! Delete command
//!
//! Usage: social delete <ENTITY> <ID>

use clap::Args;
use serde_json::json;
use social_core::schema::EntityKind;
use social_core::social_core_types::RequestContext;
use social_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use social_store::StoreConfig;

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Entity kind (user, profile, post, comment, like)
    pub entity: String,

    pub id: String,
}

pub fn execute(args: DeleteArgs, store: &StoreConfig) -> CliResult {
    let kind: EntityKind = args.entity.parse()?;
    let mut repo = store.open()?;

    match apply_engine_command(
        EngineCommand::Delete {
            entity: kind,
            id: args.id,
        },
        &mut repo,
        &RequestContext::new(),
    )? {
        EngineCommandResult::Deleted {
            entity,
            id,
            removed,
        } => print_json(&json!({
            "entity": entity,
            "id": id,
            "deleted": removed,
        })),
        other => Err(format!("unexpected result: {:?}", other).into()),
    }
}
