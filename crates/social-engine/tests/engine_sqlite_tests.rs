// Integration tests running engine commands against SQLite.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use social_core::errors::ExErrorKind;
use social_core::model::{EntityRecord, NewRecord};
use social_core::social_core_types::RequestContext;
use social_core::{EntityKind, SocialRepo};
use social_engine::commands::demo::run_demo;
use social_engine::{
    apply_engine_command, apply_engine_query, EngineCommand, EngineCommandResult, EngineQuery,
    EngineQueryResult,
};
use social_store::{SqliteRepo, StoreConfig};
use tempfile::TempDir;

fn setup_repo() -> (TempDir, SqliteRepo) {
    let temp_dir = TempDir::new().unwrap();
    let mut repo = StoreConfig::from_path(temp_dir.path().join("test.db"))
        .open()
        .unwrap();
    apply_engine_command(
        EngineCommand::Sync { force: true },
        &mut repo,
        &RequestContext::new(),
    )
    .unwrap();
    (temp_dir, repo)
}

fn create(repo: &mut SqliteRepo, kind: EntityKind, attrs: serde_json::Value) -> EntityRecord {
    let attrs = NewRecord::from_json(kind, attrs).unwrap();
    match apply_engine_command(
        EngineCommand::Create { attrs },
        repo,
        &RequestContext::new(),
    )
    .unwrap()
    {
        EngineCommandResult::Created(record) => record,
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_demo_passes_on_sqlite() {
    let (_tmp, mut repo) = setup_repo();

    let report = run_demo(&mut repo, &RequestContext::new()).unwrap();

    assert!(report.all_passed(), "{:?}", report);
    let users: i64 = repo
        .connection()
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    assert_eq!(users, 2);
}

#[test]
fn test_demo_resets_previous_data() {
    let (_tmp, mut repo) = setup_repo();
    create(
        &mut repo,
        EntityKind::Like,
        json!({"reactionType": "sad"}),
    );

    run_demo(&mut repo, &RequestContext::new()).unwrap();

    let likes: i64 = repo
        .connection()
        .query_row("SELECT COUNT(*) FROM likes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(likes, 2);
}

#[test]
fn test_link_and_show_through_engine() {
    // Given: A user and two posts created from JSON attributes
    let (_tmp, mut repo) = setup_repo();
    let user = create(
        &mut repo,
        EntityKind::User,
        json!({"username": "emart", "email": "test@test.com"}),
    );
    let p1 = create(&mut repo, EntityKind::Post, json!({"title": "a", "body": "b"}));
    let p2 = create(&mut repo, EntityKind::Post, json!({"title": "c"}));
    let ctx = RequestContext::new();

    // When: Both posts are added to the user by association path
    let result = apply_engine_command(
        EngineCommand::Add {
            association: "user.posts".to_string(),
            owner_id: user.id().to_string(),
            target_ids: vec![p1.id().to_string(), p2.id().to_string()],
        },
        &mut repo,
        &ctx,
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Linked { count: 2, .. }));

    // Then: The association query returns both, in order
    let posts = apply_engine_query(
        EngineQuery::Associated {
            association: "User.posts".to_string(),
            owner_id: user.id().to_string(),
        },
        &repo,
        &ctx,
    )
    .unwrap();
    match posts {
        EngineQueryResult::Many(records) => {
            let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
            assert_eq!(ids, vec![p1.id(), p2.id()]);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_add_through_single_valued_path_is_rejected() {
    let (_tmp, mut repo) = setup_repo();
    let user = create(
        &mut repo,
        EntityKind::User,
        json!({"username": "emart", "email": "test@test.com"}),
    );

    let err = apply_engine_command(
        EngineCommand::Add {
            association: "user.profile".to_string(),
            owner_id: user.id().to_string(),
            target_ids: vec![],
        },
        &mut repo,
        &RequestContext::new(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_delete_through_engine() {
    let (_tmp, mut repo) = setup_repo();
    let like = create(&mut repo, EntityKind::Like, json!({"reactionType": "happy"}));
    let ctx = RequestContext::new();

    let result = apply_engine_command(
        EngineCommand::Delete {
            entity: EntityKind::Like,
            id: like.id().to_string(),
        },
        &mut repo,
        &ctx,
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Deleted { removed: true, .. }));
    assert!(repo.find_like(like.id()).unwrap().is_none());
}
