//! Engine-level write commands.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use social_core::errors::Result;
use social_core::model::{EntityRecord, NewRecord};
use social_core::repo::{SocialRepo, SyncOptions};
use social_core::schema::EntityKind;
use social_core::{log_op_end, log_op_error, log_op_start};
use social_core_types::RequestContext;

/// Commands that change the schema or its records.
///
/// Associations are named by path, `entity.accessor` (e.g. `user.posts`).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Materialize the schema; `force` drops every table first.
    Sync { force: bool },
    /// Create a record from its attributes.
    Create { attrs: NewRecord },
    /// Set or clear a has-one / belongs-to association.
    Set {
        association: String,
        owner_id: String,
        target_id: Option<String>,
    },
    /// Append to a has-many / many-to-many association.
    Add {
        association: String,
        owner_id: String,
        target_ids: Vec<String>,
    },
    /// Remove from a has-many / many-to-many association.
    Remove {
        association: String,
        owner_id: String,
        target_ids: Vec<String>,
    },
    /// Delete a record; dependents are unlinked.
    Delete { entity: EntityKind, id: String },
}

impl EngineCommand {
    /// Operation name used in log lines
    pub fn op_name(&self) -> &'static str {
        match self {
            EngineCommand::Sync { .. } => "sync",
            EngineCommand::Create { .. } => "create",
            EngineCommand::Set { .. } => "set_link",
            EngineCommand::Add { .. } => "add_links",
            EngineCommand::Remove { .. } => "remove_links",
            EngineCommand::Delete { .. } => "delete",
        }
    }
}

/// Result of applying an engine command.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    Synced { force: bool },
    Created(EntityRecord),
    Linked {
        association: String,
        owner_id: String,
        /// Links actually made; targets that were already linked don't count
        count: usize,
    },
    Unlinked {
        association: String,
        owner_id: String,
        count: usize,
    },
    Deleted {
        entity: EntityKind,
        id: String,
        removed: bool,
    },
}

/// Apply an engine command to a repository.
///
/// # Errors
///
/// Whatever the repository reports, tagged with the request id:
/// `NotFound` for missing records, `UnknownAssociation` for an undeclared
/// path, `InvalidInput` when the path's kind does not fit the command,
/// `Persistence` / `ConstraintViolation` from storage.
pub fn apply_engine_command(
    cmd: EngineCommand,
    repo: &mut dyn SocialRepo,
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    let op = cmd.op_name();
    let request_id = ctx.request_id.as_str();
    log_op_start!(op, request_id = request_id);
    let start = Instant::now();

    let result = apply_engine_command_impl(cmd, repo).map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            op,
            &e,
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = request_id
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = request_id
    );

    Ok(result)
}

fn apply_engine_command_impl(
    cmd: EngineCommand,
    repo: &mut dyn SocialRepo,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::Sync { force } => {
            repo.sync(SyncOptions { force })?;
            Ok(EngineCommandResult::Synced { force })
        }
        EngineCommand::Create { attrs } => {
            let record = repo.create(attrs)?;
            tracing::debug!(entity = %record.kind(), entity_id = record.id(), "record created");
            Ok(EngineCommandResult::Created(record))
        }
        EngineCommand::Set {
            association,
            owner_id,
            target_id,
        } => {
            let assoc = *repo.registry().resolve(&association)?;
            repo.set_link(&assoc, &owner_id, target_id.as_deref())?;
            Ok(EngineCommandResult::Linked {
                association,
                owner_id,
                count: usize::from(target_id.is_some()),
            })
        }
        EngineCommand::Add {
            association,
            owner_id,
            target_ids,
        } => {
            let assoc = *repo.registry().resolve(&association)?;
            let count = repo.add_links(&assoc, &owner_id, &target_ids)?;
            Ok(EngineCommandResult::Linked {
                association,
                owner_id,
                count,
            })
        }
        EngineCommand::Remove {
            association,
            owner_id,
            target_ids,
        } => {
            let assoc = *repo.registry().resolve(&association)?;
            let count = repo.remove_links(&assoc, &owner_id, &target_ids)?;
            Ok(EngineCommandResult::Unlinked {
                association,
                owner_id,
                count,
            })
        }
        EngineCommand::Delete { entity, id } => {
            let removed = repo.delete(entity, &id)?;
            Ok(EngineCommandResult::Deleted {
                entity,
                id,
                removed,
            })
        }
    }
}
