//! Catalog of a single-user relational database: persistent table, column and
//! index metadata, plus the open heap and index handles of the database in use.

mod error;
mod manager;
mod registry;

pub use {
    error::{BoxError, Error, Result},
    manager::{CatalogManager, ColumnDescription},
    registry::HandleRegistry,
};

/// Catalog file inside a database directory.
pub const META_FILE_NAME: &str = "db.meta";
/// Placeholder for the transaction log, created with the database.
pub const LOG_FILE_NAME: &str = "db.log";
/// Scratch file a new catalog image is written to before it replaces
/// [`META_FILE_NAME`].
pub const META_TMP_FILE_NAME: &str = "db.meta.tmp";
