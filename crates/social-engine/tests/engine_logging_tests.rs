// Integration tests for engine lifecycle logging.
// Every command logs start, then end or end_error, tagged with its request id.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use social_core::logging_facility::{init_test_capture, CapturedEvent, TestCapture};
use social_core::model::{NewRecord, NewUser};
use social_core::social_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use social_core::social_core_types::RequestContext;
use social_core::{Store, SocialRepo, SyncOptions};
use social_engine::{apply_engine_command, apply_engine_query, EngineCommand, EngineQuery};

fn synced_store() -> Store {
    let mut store = Store::new().unwrap();
    store.sync(SyncOptions::default()).unwrap();
    store
}

/// Events carrying this request's id; tests share one global capture
fn events_for(capture: &TestCapture, ctx: &RequestContext) -> Vec<CapturedEvent> {
    capture
        .events()
        .into_iter()
        .filter(|e| e.field("request_id") == Some(ctx.request_id.as_str()))
        .collect()
}

#[test]
fn test_successful_command_logs_start_and_end() {
    let capture = init_test_capture();
    let mut store = synced_store();
    let ctx = RequestContext::new();

    apply_engine_command(
        EngineCommand::Create {
            attrs: NewRecord::User(NewUser::new("emart", "test@test.com")),
        },
        &mut store,
        &ctx,
    )
    .unwrap();

    let events = events_for(&capture, &ctx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].op.as_deref(), Some("create"));
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
    assert!(events[1].field("duration_ms").is_some());
}

#[test]
fn test_failed_command_logs_end_error_with_code() {
    let capture = init_test_capture();
    let mut store = synced_store();
    let ctx = RequestContext::new();

    let err = apply_engine_command(
        EngineCommand::Set {
            association: "user.profile".to_string(),
            owner_id: "no-such-user".to_string(),
            target_id: None,
        },
        &mut store,
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err.code(), "ERR_NOT_FOUND");

    let events = events_for(&capture, &ctx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].op.as_deref(), Some("set_link"));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[1].field("err_code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_query_logs_lifecycle() {
    let capture = init_test_capture();
    let store = synced_store();
    let ctx = RequestContext::new();

    apply_engine_query(
        EngineQuery::Find {
            entity: social_core::EntityKind::User,
            id: "missing".to_string(),
        },
        &store,
        &ctx,
    )
    .unwrap();

    let events = events_for(&capture, &ctx);
    let kinds: Vec<&str> = events.iter().filter_map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![EVENT_START, EVENT_END]);
    assert_eq!(events[0].op.as_deref(), Some("find"));
}

#[test]
fn test_email_is_not_logged() {
    let capture = init_test_capture();
    let mut store = synced_store();
    let ctx = RequestContext::new();

    apply_engine_command(
        EngineCommand::Create {
            attrs: NewRecord::User(NewUser::new("emart", "secret@test.com")),
        },
        &mut store,
        &ctx,
    )
    .unwrap();

    for event in capture.events() {
        for value in event.fields.values() {
            assert!(!value.contains("secret@test.com"));
        }
    }
}
