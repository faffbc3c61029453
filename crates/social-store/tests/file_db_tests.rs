// Integration tests for file-backed databases

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use social_core::{SocialRepo, SyncOptions};
use social_store::StoreConfig;
use tempfile::TempDir;

#[test]
fn test_records_survive_reopen() {
    // Given: A database file with a linked user and post
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::from_path(dir.path().join("social.db"));
    let (user_id, post_id) = {
        let mut repo = config.open().unwrap();
        repo.sync(SyncOptions::force()).unwrap();
        let user = emart(&mut repo);
        let post = test_post(&mut repo);
        repo.add_user_posts(&user.id, &[post.id.clone()]).unwrap();
        (user.id, post.id)
    };

    // When: The database is opened again and synced without force
    let mut repo = config.open().unwrap();
    repo.sync(SyncOptions::default()).unwrap();

    // Then: The records and their link are still there
    let posts = repo.get_user_posts(&user_id).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, post_id);
}

#[test]
fn test_file_database_uses_wal() {
    let dir = TempDir::new().unwrap();
    let repo = StoreConfig::from_path(dir.path().join("nested").join("social.db"))
        .open()
        .unwrap();

    let mode: String = repo
        .connection()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn test_wal_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let repo = StoreConfig::from_path(dir.path().join("social.db"))
        .with_journal_wal(false)
        .open()
        .unwrap();

    let mode: String = repo
        .connection()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "delete");
}
