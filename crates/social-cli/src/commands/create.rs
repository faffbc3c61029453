//! Create command
//!
//! Usage: social create <ENTITY> --attrs '<JSON>'

use clap::Args;
use social_core::model::NewRecord;
use social_core::schema::EntityKind;
use social_core::social_core_types::RequestContext;
use social_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use social_store::StoreConfig;

use super::{print_json, record_json, CliResult};

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Entity kind (user, profile, post, comment, like)
    pub entity: String,

    /// Attributes as a JSON object, e.g. '{"reactionType":"happy"}'
    #[arg(long, default_value = "{}")]
    pub attrs: String,
}

pub fn execute(args: CreateArgs, store: &StoreConfig) -> CliResult {
    let kind: EntityKind = args.entity.parse()?;
    let attrs: serde_json::Value = serde_json::from_str(&args.attrs)?;
    let attrs = NewRecord::from_json(kind, attrs)?;

    let mut repo = store.open()?;
    match apply_engine_command(
        EngineCommand::Create { attrs },
        &mut repo,
        &RequestContext::new(),
    )? {
        EngineCommandResult::Created(record) => print_json(&record_json(&record)?),
        other => Err(format!("unexpected result: {:?}", other).into()),
    }
}
