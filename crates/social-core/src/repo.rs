//! Persistence boundary
//!
//! `SocialRepo` is implemented by every backend (the in-memory `Store`
//! here, `SqliteRepo` in social-store). Backends provide a handful of
//! registry-driven primitives; the typed create/set/add/get operations of
//! each declared association are provided on top of them.

use crate::errors::{Result, SocialError};
use crate::model::{
    typed, Comment, EntityRecord, Like, NewComment, NewLike, NewPost, NewProfile, NewRecord,
    NewUser, Post, Profile, User,
};
use crate::schema::{AssociationDef, AssociationKind, EntityKind, Registry};

/// Options for materializing the schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Drop every table before creating it again
    pub force: bool,
}

impl SyncOptions {
    pub fn force() -> Self {
        Self { force: true }
    }
}

/// Create / associate / query operations over the declared schema
pub trait SocialRepo {
    /// Declarations this backend lays out and resolves accessors against
    fn registry(&self) -> &Registry;

    /// Materialize the schema; `force` drops existing tables first
    fn sync(&mut self, options: SyncOptions) -> Result<()>;

    /// Persist a fully built record and return it as stored
    fn insert(&mut self, record: EntityRecord) -> Result<EntityRecord>;

    fn find(&self, kind: EntityKind, id: &str) -> Result<Option<EntityRecord>>;

    /// Remove a record; dependents' foreign keys become NULL and join rows
    /// that mention it are deleted. Returns whether a row was removed.
    fn delete(&mut self, kind: EntityKind, id: &str) -> Result<bool>;

    /// Has-one / belongs-to link; `None` clears it
    fn set_link(&mut self, assoc: &AssociationDef, owner_id: &str, target_id: Option<&str>)
        -> Result<()>;

    /// Has-many / many-to-many append, in the given order. Targets already
    /// linked to `owner_id` are skipped; returns how many links were made.
    fn add_links(&mut self, assoc: &AssociationDef, owner_id: &str, target_ids: &[String])
        -> Result<usize>;

    /// Has-many / many-to-many removal; returns how many links were removed
    fn remove_links(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_ids: &[String],
    ) -> Result<usize>;

    /// Records linked to `owner_id` through `assoc`, in link order
    fn associated(&self, assoc: &AssociationDef, owner_id: &str) -> Result<Vec<EntityRecord>>;

    // ----- provided operations -----

    fn create(&mut self, attrs: NewRecord) -> Result<EntityRecord> {
        self.insert(attrs.into_record())
    }

    fn create_user(&mut self, attrs: NewUser) -> Result<User> {
        self.create(NewRecord::User(attrs))?.try_into()
    }

    fn create_profile(&mut self, attrs: NewProfile) -> Result<Profile> {
        self.create(NewRecord::Profile(attrs))?.try_into()
    }

    fn create_post(&mut self, attrs: NewPost) -> Result<Post> {
        self.create(NewRecord::Post(attrs))?.try_into()
    }

    fn create_comment(&mut self, attrs: NewComment) -> Result<Comment> {
        self.create(NewRecord::Comment(attrs))?.try_into()
    }

    fn create_like(&mut self, attrs: NewLike) -> Result<Like> {
        self.create(NewRecord::Like(attrs))?.try_into()
    }

    fn find_user(&self, id: &str) -> Result<Option<User>> {
        self.find(EntityKind::User, id)?.map(User::try_from).transpose()
    }

    fn find_profile(&self, id: &str) -> Result<Option<Profile>> {
        self.find(EntityKind::Profile, id)?
            .map(Profile::try_from)
            .transpose()
    }

    fn find_post(&self, id: &str) -> Result<Option<Post>> {
        self.find(EntityKind::Post, id)?.map(Post::try_from).transpose()
    }

    fn find_comment(&self, id: &str) -> Result<Option<Comment>> {
        self.find(EntityKind::Comment, id)?
            .map(Comment::try_from)
            .transpose()
    }

    fn find_like(&self, id: &str) -> Result<Option<Like>> {
        self.find(EntityKind::Like, id)?.map(Like::try_from).transpose()
    }

    /// Resolve `source.accessor` to an owned declaration
    fn resolve_association(&self, source: EntityKind, accessor: &str) -> Result<AssociationDef> {
        self.registry().association(source, accessor).copied()
    }

    // User 1-1 Profile

    fn set_user_profile(&mut self, user_id: &str, profile_id: Option<&str>) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::User, "profile")?;
        self.set_link(&assoc, user_id, profile_id)
    }

    fn get_user_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let assoc = self.resolve_association(EntityKind::User, "profile")?;
        single(self.associated(&assoc, user_id)?)
    }

    fn set_profile_user(&mut self, profile_id: &str, user_id: Option<&str>) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Profile, "user")?;
        self.set_link(&assoc, profile_id, user_id)
    }

    fn get_profile_user(&self, profile_id: &str) -> Result<Option<User>> {
        let assoc = self.resolve_association(EntityKind::Profile, "user")?;
        single(self.associated(&assoc, profile_id)?)
    }

    // User 1-N Post

    fn add_user_posts(&mut self, user_id: &str, post_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::User, "posts")?;
        self.add_links(&assoc, user_id, post_ids)?;
        Ok(())
    }

    fn remove_user_posts(&mut self, user_id: &str, post_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::User, "posts")?;
        self.remove_links(&assoc, user_id, post_ids)?;
        Ok(())
    }

    fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let assoc = self.resolve_association(EntityKind::User, "posts")?;
        typed(self.associated(&assoc, user_id)?)
    }

    fn set_post_user(&mut self, post_id: &str, user_id: Option<&str>) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Post, "user")?;
        self.set_link(&assoc, post_id, user_id)
    }

    fn get_post_user(&self, post_id: &str) -> Result<Option<User>> {
        let assoc = self.resolve_association(EntityKind::Post, "user")?;
        single(self.associated(&assoc, post_id)?)
    }

    // Post 1-N Comment

    fn add_post_comments(&mut self, post_id: &str, comment_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Post, "comments")?;
        self.add_links(&assoc, post_id, comment_ids)?;
        Ok(())
    }

    fn remove_post_comments(&mut self, post_id: &str, comment_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Post, "comments")?;
        self.remove_links(&assoc, post_id, comment_ids)?;
        Ok(())
    }

    fn get_post_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let assoc = self.resolve_association(EntityKind::Post, "comments")?;
        typed(self.associated(&assoc, post_id)?)
    }

    fn set_comment_post(&mut self, comment_id: &str, post_id: Option<&str>) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Comment, "post")?;
        self.set_link(&assoc, comment_id, post_id)
    }

    fn get_comment_post(&self, comment_id: &str) -> Result<Option<Post>> {
        let assoc = self.resolve_association(EntityKind::Comment, "post")?;
        single(self.associated(&assoc, comment_id)?)
    }

    // User N-N Like

    fn add_user_likes(&mut self, user_id: &str, like_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::User, "likes")?;
        self.add_links(&assoc, user_id, like_ids)?;
        Ok(())
    }

    fn remove_user_likes(&mut self, user_id: &str, like_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::User, "likes")?;
        self.remove_links(&assoc, user_id, like_ids)?;
        Ok(())
    }

    fn get_user_likes(&self, user_id: &str) -> Result<Vec<Like>> {
        let assoc = self.resolve_association(EntityKind::User, "likes")?;
        typed(self.associated(&assoc, user_id)?)
    }

    fn add_like_users(&mut self, like_id: &str, user_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Like, "users")?;
        self.add_links(&assoc, like_id, user_ids)?;
        Ok(())
    }

    fn remove_like_users(&mut self, like_id: &str, user_ids: &[String]) -> Result<()> {
        let assoc = self.resolve_association(EntityKind::Like, "users")?;
        self.remove_links(&assoc, like_id, user_ids)?;
        Ok(())
    }

    fn get_like_users(&self, like_id: &str) -> Result<Vec<User>> {
        let assoc = self.resolve_association(EntityKind::Like, "users")?;
        typed(self.associated(&assoc, like_id)?)
    }

    // Deletion

    fn delete_user(&mut self, id: &str) -> Result<bool> {
        self.delete(EntityKind::User, id)
    }

    fn delete_profile(&mut self, id: &str) -> Result<bool> {
        self.delete(EntityKind::Profile, id)
    }

    fn delete_post(&mut self, id: &str) -> Result<bool> {
        self.delete(EntityKind::Post, id)
    }

    fn delete_comment(&mut self, id: &str) -> Result<bool> {
        self.delete(EntityKind::Comment, id)
    }

    fn delete_like(&mut self, id: &str) -> Result<bool> {
        self.delete(EntityKind::Like, id)
    }
}

fn single<T>(records: Vec<EntityRecord>) -> Result<Option<T>>
where
    T: TryFrom<EntityRecord, Error = crate::errors::ExError>,
{
    records.into_iter().next().map(T::try_from).transpose()
}

/// Reject operations that do not fit the association's kind
pub fn ensure_kind(assoc: &AssociationDef, op: &'static str, collection: bool) -> Result<()> {
    if assoc.kind.is_collection() != collection {
        return Err(SocialError::WrongAssociationKind {
            source_entity: assoc.source,
            accessor: assoc.accessor.to_string(),
            op,
        }
        .into());
    }
    Ok(())
}

/// Join-table column pair for a many-to-many association
pub fn join_keys(assoc: &AssociationDef) -> Option<(&'static str, &'static str, &'static str)> {
    match (assoc.kind, assoc.through) {
        (AssociationKind::BelongsToMany, Some(through)) => {
            Some((through.table, through.source_key, through.target_key))
        }
        _ => None,
    }
}
