//! Demo walkthrough of the social schema.
//!
//! Syncs with force, then creates and links records through the engine,
//! checking each association reads back what was linked. Used by
//! `social demo` and as an end-to-end smoke test of a backend.

#![allow(clippy::result_large_err)]

use serde::Serialize;
use social_core::errors::{ExError, ExErrorKind, Result};
use social_core::model::{
    EntityRecord, NewComment, NewLike, NewPost, NewProfile, NewRecord, NewUser,
};
use social_core::repo::SocialRepo;
use social_core_types::RequestContext;

use crate::commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
use crate::commands::engine_query::{apply_engine_query, EngineQuery};

/// Outcome of one demo step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    pub checks: Vec<DemoCheck>,
}

impl DemoReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    fn check(&mut self, name: &'static str, passed: bool, detail: String) {
        self.checks.push(DemoCheck {
            name,
            passed,
            detail,
        });
    }
}

/// Run every demo step against `repo`; data already there is dropped.
///
/// # Errors
///
/// A storage error aborts the walkthrough. Read-back mismatches do not;
/// they are reported as failed checks.
pub fn run_demo(repo: &mut dyn SocialRepo, ctx: &RequestContext) -> Result<DemoReport> {
    let mut report = DemoReport::default();
    apply_engine_command(EngineCommand::Sync { force: true }, repo, ctx)?;

    // Users
    let u1 = create(repo, ctx, NewRecord::User(NewUser::new("emart", "test@test.com")))?;
    let u2 = create(repo, ctx, NewRecord::User(NewUser::new("emart", "test@test.com")))?;
    match &u1 {
        EntityRecord::User(user) => report.check(
            "create_user",
            user.username == "emart" && user.email == "test@test.com",
            format!("username={} email={}", user.username, user.email),
        ),
        other => report.check("create_user", false, format!("got {}", other.kind())),
    }

    // Profile
    let profile = create(
        repo,
        ctx,
        NewRecord::Profile(NewProfile::new("test test test", "test/img", "01/01/01")),
    )?;
    command(
        repo,
        ctx,
        EngineCommand::Set {
            association: "user.profile".to_string(),
            owner_id: u1.id().to_string(),
            target_id: Some(profile.id().to_string()),
        },
    )?;
    let linked = associated(repo, ctx, "user.profile", u1.id())?;
    report.check(
        "user_profile",
        linked.len() == 1 && linked[0].id() == profile.id(),
        format!("{} profile(s) linked", linked.len()),
    );

    // Posts
    let posts = vec![
        create(repo, ctx, NewRecord::Post(NewPost::new("test", "test test test")))?,
        create(repo, ctx, NewRecord::Post(NewPost::new("test", "test test test")))?,
    ];
    command(
        repo,
        ctx,
        EngineCommand::Add {
            association: "user.posts".to_string(),
            owner_id: u1.id().to_string(),
            target_ids: ids(&posts),
        },
    )?;
    let linked = associated(repo, ctx, "user.posts", u1.id())?;
    report.check(
        "user_posts",
        linked.len() == 2 && linked.iter().all(|r| matches!(r, EntityRecord::Post(_))),
        format!("{} post(s) linked", linked.len()),
    );

    // Comments
    let comments = vec![
        create(repo, ctx, NewRecord::Comment(NewComment::new("test test")))?,
        create(repo, ctx, NewRecord::Comment(NewComment::new("test test")))?,
    ];
    command(
        repo,
        ctx,
        EngineCommand::Add {
            association: "post.comments".to_string(),
            owner_id: posts[0].id().to_string(),
            target_ids: ids(&comments),
        },
    )?;
    let linked = associated(repo, ctx, "post.comments", posts[0].id())?;
    report.check(
        "post_comments",
        linked.len() == 2 && linked.iter().all(|r| matches!(r, EntityRecord::Comment(_))),
        format!("{} comment(s) linked", linked.len()),
    );

    // Likes, linked from both sides
    let likes = vec![
        create(repo, ctx, NewRecord::Like(NewLike::new("happy")))?,
        create(repo, ctx, NewRecord::Like(NewLike::new("happy")))?,
    ];
    match &likes[0] {
        EntityRecord::Like(like) => report.check(
            "create_like",
            like.reaction_type.as_deref() == Some("happy"),
            format!("reaction_type={:?}", like.reaction_type),
        ),
        other => report.check("create_like", false, format!("got {}", other.kind())),
    }
    command(
        repo,
        ctx,
        EngineCommand::Add {
            association: "user.likes".to_string(),
            owner_id: u1.id().to_string(),
            target_ids: ids(&likes),
        },
    )?;
    command(
        repo,
        ctx,
        EngineCommand::Add {
            association: "like.users".to_string(),
            owner_id: likes[0].id().to_string(),
            target_ids: vec![u1.id().to_string(), u2.id().to_string()],
        },
    )?;
    let user_likes = associated(repo, ctx, "user.likes", u1.id())?;
    let like_users = associated(repo, ctx, "like.users", likes[0].id())?;
    report.check(
        "user_likes",
        user_likes.len() == 2 && like_users.len() == 2,
        format!(
            "user has {} like(s), like has {} user(s)",
            user_likes.len(),
            like_users.len()
        ),
    );

    tracing::debug!(
        checks = report.checks.len(),
        passed = report.all_passed(),
        "demo finished"
    );
    Ok(report)
}

fn command(
    repo: &mut dyn SocialRepo,
    ctx: &RequestContext,
    cmd: EngineCommand,
) -> Result<EngineCommandResult> {
    apply_engine_command(cmd, repo, ctx)
}

fn create(repo: &mut dyn SocialRepo, ctx: &RequestContext, attrs: NewRecord) -> Result<EntityRecord> {
    match command(repo, ctx, EngineCommand::Create { attrs })? {
        EngineCommandResult::Created(record) => Ok(record),
        other => Err(ExError::new(ExErrorKind::Internal)
            .with_op("demo")
            .with_message(format!("create returned {:?}", other))),
    }
}

fn associated(
    repo: &dyn SocialRepo,
    ctx: &RequestContext,
    association: &str,
    owner_id: &str,
) -> Result<Vec<EntityRecord>> {
    let result = apply_engine_query(
        EngineQuery::Associated {
            association: association.to_string(),
            owner_id: owner_id.to_string(),
        },
        repo,
        ctx,
    )?;
    Ok(result.into_records())
}

fn ids(records: &[EntityRecord]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_core::Store;

    #[test]
    fn test_demo_passes_on_in_memory_store() {
        let mut store = Store::new().unwrap();
        let report = run_demo(&mut store, &RequestContext::new()).unwrap();

        assert_eq!(report.checks.len(), 6);
        assert!(report.all_passed(), "{:?}", report);
    }
}
