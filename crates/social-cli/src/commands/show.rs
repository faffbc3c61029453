//! Show command
//!
//! Usage: social show <ENTITY> <ID> [--with <ACCESSOR>]...

use clap::Args;
use serde_json::{json, Value};
use social_core::schema::EntityKind;
use social_core::social_core_types::RequestContext;
use social_engine::{apply_engine_query, EngineQuery, EngineQueryResult};
use social_store::StoreConfig;

use super::{print_json, record_json, CliResult};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Entity kind (user, profile, post, comment, like)
    pub entity: String,

    pub id: String,

    /// Include records reached through this accessor (repeatable), e.g. `posts`
    #[arg(long = "with")]
    pub with: Vec<String>,
}

pub fn execute(args: ShowArgs, store: &StoreConfig) -> CliResult {
    let kind: EntityKind = args.entity.parse()?;
    let repo = store.open()?;
    let ctx = RequestContext::new();

    let record = match apply_engine_query(
        EngineQuery::Find {
            entity: kind,
            id: args.id.clone(),
        },
        &repo,
        &ctx,
    )? {
        EngineQueryResult::Record(Some(record)) => record,
        EngineQueryResult::Record(None) => {
            return Err(format!("{} {} not found", kind, args.id).into())
        }
        other => return Err(format!("unexpected result: {:?}", other).into()),
    };

    let mut output = json!({ "record": record_json(&record)? });
    for accessor in args.with {
        let linked = apply_engine_query(
            EngineQuery::Associated {
                association: format!("{}.{}", kind.name(), accessor),
                owner_id: args.id.clone(),
            },
            &repo,
            &ctx,
        )?;
        let value = match linked {
            EngineQueryResult::Many(records) => Value::Array(
                records
                    .iter()
                    .map(record_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            EngineQueryResult::Single(Some(record)) | EngineQueryResult::Record(Some(record)) => {
                record_json(&record)?
            }
            EngineQueryResult::Single(None) | EngineQueryResult::Record(None) => Value::Null,
        };
        output[accessor.as_str()] = value;
    }

    print_json(&output)
}
