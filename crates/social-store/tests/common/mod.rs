use social_core::{
    Comment, Like, NewComment, NewLike, NewPost, NewProfile, NewUser, Post, Profile, SocialRepo,
    SyncOptions, User,
};
use social_store::SqliteRepo;

/// In-memory repository after `sync(force)`, the way each suite starts
#[allow(dead_code)]
pub fn setup_test_repo() -> SqliteRepo {
    let mut repo = SqliteRepo::open_in_memory().expect("Failed to open in-memory database");
    repo.sync(SyncOptions::force()).expect("Failed to sync schema");
    repo
}

#[allow(dead_code)]
pub fn table_names(repo: &SqliteRepo) -> Vec<String> {
    let mut stmt = repo
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[allow(dead_code)]
pub fn count_rows(repo: &SqliteRepo, table: &str) -> i64 {
    repo.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
}

#[allow(dead_code)]
pub fn emart(repo: &mut dyn SocialRepo) -> User {
    repo.create_user(NewUser::new("emart", "test@test.com"))
        .unwrap()
}

#[allow(dead_code)]
pub fn test_profile(repo: &mut dyn SocialRepo) -> Profile {
    repo.create_profile(NewProfile::new("test test test", "test/img", "01/01/01"))
        .unwrap()
}

#[allow(dead_code)]
pub fn test_post(repo: &mut dyn SocialRepo) -> Post {
    repo.create_post(NewPost::new("test", "test test test"))
        .unwrap()
}

#[allow(dead_code)]
pub fn test_comment(repo: &mut dyn SocialRepo) -> Comment {
    repo.create_comment(NewComment::new("test test")).unwrap()
}

#[allow(dead_code)]
pub fn happy_like(repo: &mut dyn SocialRepo) -> Like {
    repo.create_like(NewLike::new("happy")).unwrap()
}
