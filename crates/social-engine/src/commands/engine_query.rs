//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for reads. Unlike
//! `apply_engine_command`, it takes a shared repository and never writes.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use social_core::errors::Result;
use social_core::model::EntityRecord;
use social_core::repo::SocialRepo;
use social_core::schema::{AssociationKind, EntityKind};
use social_core::{log_op_end, log_op_error, log_op_start};
use social_core_types::RequestContext;

/// Read-only queries supported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineQuery {
    /// Look a record up by identity.
    Find { entity: EntityKind, id: String },
    /// Records reached from `owner_id` through `association` (`entity.accessor`).
    Associated {
        association: String,
        owner_id: String,
    },
}

impl EngineQuery {
    pub fn op_name(&self) -> &'static str {
        match self {
            EngineQuery::Find { .. } => "find",
            EngineQuery::Associated { .. } => "get_associated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineQueryResult {
    /// `Find`; `None` when no such record
    Record(Option<EntityRecord>),
    /// `Associated` through a has-one / belongs-to accessor
    Single(Option<EntityRecord>),
    /// `Associated` through a collection accessor, in link order
    Many(Vec<EntityRecord>),
}

impl EngineQueryResult {
    /// Flatten to the records returned, in order
    pub fn into_records(self) -> Vec<EntityRecord> {
        match self {
            EngineQueryResult::Record(r) | EngineQueryResult::Single(r) => {
                r.into_iter().collect()
            }
            EngineQueryResult::Many(records) => records,
        }
    }
}

/// Apply a read-only query.
///
/// # Errors
///
/// `NotFound` when the owner of an association query does not exist,
/// `UnknownAssociation` for an undeclared path, `Persistence` from storage.
pub fn apply_engine_query(
    query: EngineQuery,
    repo: &dyn SocialRepo,
    ctx: &RequestContext,
) -> Result<EngineQueryResult> {
    let op = query.op_name();
    let request_id = ctx.request_id.as_str();
    log_op_start!(op, request_id = request_id);
    let start = Instant::now();

    let result = apply_engine_query_impl(query, repo).map_err(|e| {
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

fn apply_engine_query_impl(query: EngineQuery, repo: &dyn SocialRepo) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::Find { entity, id } => Ok(EngineQueryResult::Record(repo.find(entity, &id)?)),
        EngineQuery::Associated {
            association,
            owner_id,
        } => {
            let assoc = *repo.registry().resolve(&association)?;
            let records = repo.associated(&assoc, &owner_id)?;
            match assoc.kind {
                AssociationKind::HasOne | AssociationKind::BelongsTo => {
                    Ok(EngineQueryResult::Single(records.into_iter().next()))
                }
                AssociationKind::HasMany | AssociationKind::BelongsToMany => {
                    Ok(EngineQueryResult::Many(records))
                }
            }
        }
    }
}
