use {
    super::CatalogManager,
    crate::error::{self, Result},
    def::{
        storage::{HeapStorage, IndexStorage},
        ColumnType, DatabaseMeta, TableMeta,
    },
    snafu::prelude::*,
};

/// One row of `desc_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub ty: ColumnType,
    pub len: u32,
    pub offset: u32,
    pub indexed: bool,
}

impl<S: HeapStorage, X: IndexStorage> CatalogManager<S, X> {
    /// Names of the tables of the open database, in ascending order.
    pub fn show_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .database()?
            .table_names()
            .map(ToString::to_string)
            .collect())
    }

    /// Columns of table `name` in record order.
    pub fn desc_table(&self, name: &str) -> Result<Vec<ColumnDescription>> {
        let table = self.table(name)?;

        Ok(table
            .columns
            .iter()
            .map(|column| ColumnDescription {
                name: column.name.clone(),
                ty: column.ty,
                len: column.len,
                offset: column.offset,
                indexed: column.indexed,
            })
            .collect())
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Name the open database was opened under, which is its directory name.
    pub fn current_database(&self) -> Option<&str> {
        self.open.as_ref().map(|db| db.name.as_str())
    }

    /// In-memory catalog of the open database.
    pub fn database(&self) -> Result<&DatabaseMeta> {
        self.open
            .as_ref()
            .map(|db| &db.meta)
            .context(error::NoDatabaseOpenSnafu)
    }

    pub fn table(&self, name: &str) -> Result<&TableMeta> {
        self.database()?
            .table(name)
            .context(error::TableNotFoundSnafu { name })
    }

    pub fn heap_handle(&self, table: &str) -> Option<&S::Handle> {
        self.open.as_ref()?.handles.heap(table)
    }

    pub fn index_handle<C: AsRef<str>>(&self, table: &str, columns: &[C]) -> Option<&X::Handle> {
        let name = self.index_storage.index_name(table, columns);
        self.open.as_ref()?.handles.index(&name)
    }

    /// Number of open heap and index handles.
    pub fn handle_counts(&self) -> (usize, usize) {
        match &self.open {
            Some(db) => (db.handles.heap_count(), db.handles.index_count()),
            None => (0, 0),
        }
    }
}
