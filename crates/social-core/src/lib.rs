//! Social Core - schema, records and the persistence boundary
//!
//! This crate provides:
//! - Entity records (User, Profile, Post, Comment, Like) and their
//!   create-time attribute sets
//! - The schema & association registry that declares fields, foreign keys
//!   and join tables
//! - The `SocialRepo` trait with typed create/set/add/get operations
//! - An in-memory `Store` implementation
//! - Error and logging facilities shared by the other crates

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod repo;
pub mod schema;

// Used by the logging macros
pub use social_core_types;

pub use errors::{ExError, ExErrorKind, Result, SocialError};
pub use model::{
    Comment, EntityRecord, Like, NewComment, NewLike, NewPost, NewProfile, NewRecord, NewUser,
    Post, Profile, User,
};
pub use ops::Store;
pub use repo::{SocialRepo, SyncOptions};
pub use schema::{AssociationDef, AssociationKind, EntityKind, Registry};
