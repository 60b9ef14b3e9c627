//! Interfaces of the storage engines the catalog drives.
//!
//! The catalog never touches record or key layouts itself. It only asks these
//! collaborators to create, open, close and destroy the files backing tables
//! and indexes, and keeps the handles they return.

mod codec;

pub use codec::{Decoder, Encoder};
use {crate::meta::ColumnMeta, std::path::Path};

/// Heap files: one per table, holding fixed-size records.
pub trait HeapStorage {
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_file(&self, path: &Path, record_size: u32) -> Result<(), Self::Error>;
    fn open_file(&self, path: &Path) -> Result<Self::Handle, Self::Error>;
    /// Consumes the handle, so a handle cannot be closed twice.
    fn close_file(&self, handle: Self::Handle) -> Result<(), Self::Error>;
    fn destroy_file(&self, path: &Path) -> Result<(), Self::Error>;
}

/// Secondary index files, identified by table name and ordered key columns.
pub trait IndexStorage {
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deterministic name of the index on `columns` of `table`. It is both the
    /// file name inside the database directory and the key the catalog
    /// registers the open handle under.
    fn index_name<S: AsRef<str>>(&self, table: &str, columns: &[S]) -> String {
        canonical_index_name(table, columns)
    }

    fn index_exists<S: AsRef<str>>(&self, dir: &Path, table: &str, columns: &[S]) -> bool;

    fn create_index(
        &self,
        dir: &Path,
        table: &str,
        columns: &[ColumnMeta],
    ) -> Result<(), Self::Error>;

    fn open_index(
        &self,
        dir: &Path,
        table: &str,
        columns: &[ColumnMeta],
    ) -> Result<Self::Handle, Self::Error>;

    fn close_index(&self, handle: Self::Handle) -> Result<(), Self::Error>;

    fn destroy_index<S: AsRef<str>>(
        &self,
        dir: &Path,
        table: &str,
        columns: &[S],
    ) -> Result<(), Self::Error>;
}

/// `{table}_{col1}_{col2}...idx`, with `%` and `_` inside each part written as
/// `%25` and `%5F` so that different column lists never share a name.
pub fn canonical_index_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let mut name = String::with_capacity(table.len() + 8);
    push_escaped(&mut name, table);
    for column in columns {
        name.push('_');
        push_escaped(&mut name, column.as_ref());
    }
    name.push_str(".idx");

    name
}

fn push_escaped(name: &mut String, part: &str) {
    for c in part.chars() {
        match c {
            '%' => name.push_str("%25"),
            '_' => name.push_str("%5F"),
            c => name.push(c),
        }
    }
}
