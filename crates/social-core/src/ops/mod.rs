//! In-memory persistence

mod store;

pub use store::Store;
