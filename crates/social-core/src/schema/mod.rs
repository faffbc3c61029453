//! Schema & association registry
//!
//! Declares each entity's fields and the directional associations between
//! entities. Persistence backends read the registry to lay out columns,
//! foreign keys and join tables, and to resolve association accessors.

pub mod association;
pub mod entity;
pub mod registry;

pub use association::{AssociationDef, AssociationKind, ForeignKey, JoinTable, JoinTableDef};
pub use entity::{EntityDef, EntityKind, FieldDef, FieldType};
pub use registry::Registry;
