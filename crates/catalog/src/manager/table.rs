use {
    super::{validate_table_name, write_meta, CatalogManager, OpenDatabase},
    crate::error::{self, Result},
    def::{
        storage::{HeapStorage, IndexStorage},
        ColumnDef, TableMeta,
    },
    snafu::prelude::*,
    std::collections::HashSet,
    tracing::{debug, warn},
};

impl<S: HeapStorage, X: IndexStorage> CatalogManager<S, X> {
    /// Creates table `name` with `columns` laid out back to back in the given
    /// order, and opens its heap file.
    pub fn create_table(&mut self, name: &str, columns: &[ColumnDef]) -> Result<()> {
        let Self {
            heap_storage, open, ..
        } = self;
        let OpenDatabase {
            dir, meta, handles, ..
        } = open.as_mut().context(error::NoDatabaseOpenSnafu)?;

        validate_table_name(name)?;
        ensure!(!meta.contains_table(name), error::TableExistsSnafu { name });
        check_columns(name, columns)?;

        let table = TableMeta::new(name, columns).map_err(|column| {
            error::InvalidColumnSnafu {
                table: name,
                column,
                reason: format!("record would be longer than {} bytes", u32::MAX),
            }
            .build()
        })?;
        let record_size = table.record_size();
        let path = dir.join(name);

        heap_storage
            .create_file(&path, record_size)
            .map_err(Into::into)
            .context(error::ResourceFailureSnafu {
                action: format!("create heap file {}", path.display()),
            })?;

        let heap = match heap_storage.open_file(&path) {
            Ok(heap) => heap,
            Err(e) => {
                if let Err(cleanup) = heap_storage.destroy_file(&path) {
                    warn!(table = name, error = %cleanup, "failed to remove unopened heap file");
                }

                return Err(e).map_err(Into::into).context(error::ResourceFailureSnafu {
                    action: format!("open heap file {}", path.display()),
                });
            }
        };

        if let Err(heap) = handles.insert_heap(name, heap) {
            if let Err(e) = heap_storage.close_file(heap) {
                warn!(table = name, error = %e, "failed to close unregistered heap file");
            }
            return error::TableExistsSnafu { name }.fail();
        }

        meta.tables.insert(name.to_string(), table);
        debug!(table = name, columns = columns.len(), record_size, "created table");

        write_meta(dir, meta)
    }

    /// Drops table `name`: every index on it first, then its heap file.
    ///
    /// A failure part way is returned after the catalog, which by then reflects
    /// the steps that did complete, has been written. Indexes already removed
    /// stay removed, so a retry picks up where the failure left off.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        let Self {
            heap_storage,
            index_storage,
            open,
            ..
        } = self;
        let db = open.as_mut().context(error::NoDatabaseOpenSnafu)?;

        let indexes = match db.meta.table(name) {
            Some(table) => table
                .indexes
                .iter()
                .map(|index| index.columns.clone())
                .collect::<Vec<_>>(),
            None => return error::TableNotFoundSnafu { name }.fail(),
        };

        let dropped = teardown_table(heap_storage, index_storage, db, name, &indexes);
        if let Err(e) = &dropped {
            warn!(table = name, error = %e, "table was only partly dropped");
        }

        let flushed = write_meta(&db.dir, &db.meta);

        dropped.and(flushed)
    }
}

/// Closes and destroys every index of table `name`, then its heap file.
///
/// Catalog and registry entries leave together: once a handle is taken out of
/// the registry its catalog entry is removed as well, even if closing or
/// destroying the file afterwards fails.
fn teardown_table<S: HeapStorage, X: IndexStorage>(
    heap_storage: &S,
    index_storage: &X,
    db: &mut OpenDatabase<S::Handle, X::Handle>,
    name: &str,
    indexes: &[Vec<String>],
) -> Result<()> {
    for columns in indexes {
        super::index::remove_index(index_storage, db, name, columns)?;
    }

    let heap = db.handles.take_heap(name);
    db.meta.tables.remove(name);

    let closed = match heap {
        Some(heap) => heap_storage
            .close_file(heap)
            .map_err(Into::into)
            .context(error::ResourceFailureSnafu {
                action: format!("close heap file of table `{}`", name),
            }),
        None => {
            warn!(table = name, "table had no open heap file");
            Ok(())
        }
    };

    let path = db.dir.join(name);
    let destroyed = heap_storage
        .destroy_file(&path)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("destroy heap file {}", path.display()),
        });

    closed.and(destroyed)?;
    debug!(table = name, indexes = indexes.len(), "dropped table");

    Ok(())
}

fn check_columns(table: &str, columns: &[ColumnDef]) -> Result<()> {
    ensure!(!columns.is_empty(), error::NoColumnsSnafu { table });

    let mut seen = HashSet::new();
    for column in columns {
        ensure!(
            !column.name.is_empty(),
            error::InvalidColumnSnafu {
                table,
                column: &column.name,
                reason: "empty name",
            }
        );
        ensure!(
            !column.name.contains(|c: char| matches!(c, '/' | '\\' | '\0')),
            error::InvalidColumnSnafu {
                table,
                column: &column.name,
                reason: "name cannot be part of a file name",
            }
        );
        ensure!(
            column.has_valid_len(),
            error::InvalidColumnSnafu {
                table,
                column: &column.name,
                reason: format!("length {} does not fit type {}", column.len, column.ty),
            }
        );
        ensure!(
            seen.insert(column.name.as_str()),
            error::DuplicateColumnSnafu {
                table,
                column: &column.name,
            }
        );
    }

    Ok(())
}
