//! Schema introspection: extracts tables, columns, keys, and constraints
//! from a live database connection into the normalized [`types::DatabaseSchema`]
//! model the rest of the crate works against.

pub mod introspect;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod types;

pub use introspect::{database_type_from_url, SchemaIntrospector};
pub use types::{DatabaseSchema, DatabaseType};
