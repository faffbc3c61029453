use social_core::{
    Comment, Like, NewComment, NewLike, NewPost, NewProfile, NewUser, Post, Profile, SocialRepo,
    Store, SyncOptions, User,
};

/// A store with all tables created
#[allow(dead_code)]
pub fn synced_store() -> Store {
    let mut store = Store::new().unwrap();
    store.sync(SyncOptions::force()).unwrap();
    store
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
