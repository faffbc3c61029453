//! CLI integration tests
//!
//! These tests run the `social` binary against a temporary database and
//! check its JSON output and the rows it leaves behind.

use rusqlite::Connection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("social.db")
}

fn run(temp_dir: &TempDir, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_social");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .env_remove("SOCIAL_DB")
        .env("RUST_LOG", "off")
        .arg("--db")
        .arg(db_path(temp_dir))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn run_ok(temp_dir: &TempDir, args: &[&str]) -> String {
    let output = run(temp_dir, args);
    assert!(
        output.status.success(),
        "CLI command {:?} should succeed. Stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn run_json(temp_dir: &TempDir, args: &[&str]) -> Value {
    serde_json::from_str(&run_ok(temp_dir, args)).expect("stdout should be JSON")
}

fn synced(temp_dir: &TempDir) {
    run_ok(temp_dir, &["sync", "--force"]);
}

fn count_rows(db: &Path, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn test_cli_create_user() {
    // When: `social create user --attrs {...}`
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);

    let user = run_json(
        &temp_dir,
        &[
            "create",
            "user",
            "--attrs",
            r#"{"username":"emart","email":"test@test.com"}"#,
        ],
    );

    // Then: The created record is printed with its attributes
    assert_eq!(user["entity"], "user");
    assert_eq!(user["username"], "emart");
    assert_eq!(user["email"], "test@test.com");
    assert!(user["id"].as_str().is_some());
    assert_eq!(count_rows(&db_path(&temp_dir), "users"), 1);
}

#[test]
fn test_cli_create_like() {
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);

    let like = run_json(
        &temp_dir,
        &["create", "like", "--attrs", r#"{"reactionType":"happy"}"#],
    );

    assert_eq!(like["reaction_type"], "happy");
}

#[test]
fn test_cli_create_missing_required_attribute_fails() {
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);

    let output = run(
        &temp_dir,
        &["create", "user", "--attrs", r#"{"username":"emart"}"#],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_VALIDATION"), "stderr: {}", stderr);
    assert_eq!(count_rows(&db_path(&temp_dir), "users"), 0);
}

#[test]
fn test_cli_link_and_show_posts() {
    // Given: A user and two posts
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);
    let user = run_json(
        &temp_dir,
        &[
            "create",
            "user",
            "--attrs",
            r#"{"username":"emart","email":"test@test.com"}"#,
        ],
    );
    let user_id = user["id"].as_str().unwrap().to_string();
    let post_ids: Vec<String> = (0..2)
        .map(|_| {
            run_json(
                &temp_dir,
                &["create", "post", "--attrs", r#"{"title":"test","body":"test test test"}"#],
            )["id"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();

    // When: The posts are linked and the user is shown with its posts
    let linked = run_json(
        &temp_dir,
        &["link", "user.posts", &user_id, &post_ids[0], &post_ids[1]],
    );
    assert_eq!(linked["linked"], 2);

    // And: Linking the same post again makes no new link
    let relinked = run_json(&temp_dir, &["link", "user.posts", &user_id, &post_ids[0]]);
    assert_eq!(relinked["linked"], 0);

    let shown = run_json(&temp_dir, &["show", "user", &user_id, "--with", "posts"]);

    // Then: Both posts are listed in link order
    let posts = shown["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"], post_ids[0].as_str());
    assert_eq!(posts[1]["user_id"], user_id.as_str());
    assert_eq!(shown["record"]["username"], "emart");
}

#[test]
fn test_cli_single_valued_link_takes_one_target() {
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);
    let user = run_json(
        &temp_dir,
        &[
            "create",
            "user",
            "--attrs",
            r#"{"username":"emart","email":"test@test.com"}"#,
        ],
    );
    let user_id = user["id"].as_str().unwrap();

    let output = run(&temp_dir, &["link", "user.profile", user_id, "p1", "p2"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exactly one"));
}

#[test]
fn test_cli_link_missing_record_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);

    let output = run(&temp_dir, &["link", "post.comments", "no-such-post", "c1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}

#[test]
fn test_cli_demo() {
    let temp_dir = TempDir::new().unwrap();

    let stdout = run_ok(&temp_dir, &["demo"]);

    assert!(stdout.contains("All 6 checks passed"), "stdout: {}", stdout);
    assert_eq!(count_rows(&db_path(&temp_dir), "user_likes"), 3);
}

#[test]
fn test_cli_uses_social_db_env() {
    // Given: No --db flag, SOCIAL_DB pointing into the temp dir
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("from_env.db");

    let output = Command::new(env!("CARGO_BIN_EXE_social"))
        .current_dir(temp_dir.path())
        .env("SOCIAL_DB", &db)
        .env("RUST_LOG", "off")
        .args(["sync"])
        .output()
        .expect("Failed to execute CLI");

    // Then: The schema lands in that file
    assert!(output.status.success());
    assert_eq!(count_rows(&db, "users"), 0);
    assert!(!temp_dir.path().join("social.db").exists());
}

#[test]
fn test_cli_delete_unlinks_posts() {
    let temp_dir = TempDir::new().unwrap();
    synced(&temp_dir);
    let user = run_json(
        &temp_dir,
        &[
            "create",
            "user",
            "--attrs",
            r#"{"username":"emart","email":"test@test.com"}"#,
        ],
    );
    let user_id = user["id"].as_str().unwrap();
    let post = run_json(&temp_dir, &["create", "post", "--attrs", r#"{"title":"t"}"#]);
    let post_id = post["id"].as_str().unwrap();
    run_ok(&temp_dir, &["link", "post.user", post_id, user_id]);

    let deleted = run_json(&temp_dir, &["delete", "user", user_id]);
    assert_eq!(deleted["deleted"], true);

    let shown = run_json(&temp_dir, &["show", "post", post_id, "--with", "user"]);
    assert_eq!(shown["user"], Value::Null);
    assert_eq!(shown["record"]["user_id"], Value::Null);
}
