use {
    super::{write_meta, CatalogManager, OpenDatabase},
    crate::error::{self, Result},
    def::{
        storage::{HeapStorage, IndexStorage},
        ColumnMeta, IndexMeta,
    },
    snafu::prelude::*,
    std::collections::HashSet,
    tracing::{debug, warn},
};

impl<S: HeapStorage, X: IndexStorage> CatalogManager<S, X> {
    /// Creates and opens an index on `columns` of `table`. The order of
    /// `columns` is the order of the key.
    pub fn create_index<C: AsRef<str>>(&mut self, table: &str, columns: &[C]) -> Result<()> {
        let Self {
            index_storage,
            open,
            ..
        } = self;
        let OpenDatabase {
            dir, meta, handles, ..
        } = open.as_mut().context(error::NoDatabaseOpenSnafu)?;

        let table_meta = meta
            .table_mut(table)
            .context(error::TableNotFoundSnafu { name: table })?;
        ensure!(!columns.is_empty(), error::InvalidIndexSnafu { table });

        let mut seen = HashSet::new();
        for column in columns {
            ensure!(
                seen.insert(column.as_ref()),
                error::DuplicateColumnSnafu {
                    table,
                    column: column.as_ref(),
                }
            );
        }

        ensure!(
            table_meta.index(columns).is_none() && !index_storage.index_exists(dir, table, columns),
            error::IndexExistsSnafu {
                table,
                columns: to_strings(columns),
            }
        );

        let key_columns = table_meta
            .resolve_columns(columns)
            .map_err(|column| error::ColumnNotFoundSnafu { table, column }.build())?;

        let name = index_storage.index_name(table, columns);

        index_storage
            .create_index(dir, table, &key_columns)
            .map_err(Into::into)
            .context(error::ResourceFailureSnafu {
                action: format!("create index {}", name),
            })?;

        let handle = match index_storage.open_index(dir, table, &key_columns) {
            Ok(handle) => handle,
            Err(e) => {
                if let Err(cleanup) = index_storage.destroy_index(dir, table, columns) {
                    warn!(index = %name, error = %cleanup, "failed to remove unopened index");
                }

                return Err(e).map_err(Into::into).context(error::ResourceFailureSnafu {
                    action: format!("open index {}", name),
                });
            }
        };

        if let Err(handle) = handles.insert_index(&name, handle) {
            if let Err(e) = index_storage.close_index(handle) {
                warn!(index = %name, error = %e, "failed to close unregistered index");
            }
            return error::IndexExistsSnafu {
                table,
                columns: to_strings(columns),
            }
            .fail();
        }

        let key_len = key_columns.iter().map(|c| c.len).sum();
        table_meta.add_index(IndexMeta {
            table: table.to_string(),
            columns: to_strings(columns),
            key_len,
        });
        debug!(table, index = %name, key_len, "created index");

        write_meta(dir, meta)
    }

    /// Closes and destroys the index on `columns` of `table`.
    ///
    /// If closing or destroying the file fails, the index is already gone from
    /// registry and catalog; the catalog is written before the error is returned.
    pub fn drop_index<C: AsRef<str>>(&mut self, table: &str, columns: &[C]) -> Result<()> {
        let Self {
            index_storage,
            open,
            ..
        } = self;
        let db = open.as_mut().context(error::NoDatabaseOpenSnafu)?;

        ensure!(
            db.meta.contains_table(table),
            error::TableNotFoundSnafu { name: table }
        );

        match remove_index(index_storage, db, table, columns) {
            Err(e @ error::Error::IndexNotFound { .. }) => Err(e),
            removed => {
                if let Err(e) = &removed {
                    warn!(table, error = %e, "index was only partly dropped");
                }
                let flushed = write_meta(&db.dir, &db.meta);

                removed.and(flushed)
            }
        }
    }

    /// Same as [`drop_index`](Self::drop_index) for callers holding resolved columns.
    pub fn drop_index_by_columns(&mut self, table: &str, columns: &[ColumnMeta]) -> Result<()> {
        let names = columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        self.drop_index(table, &names)
    }
}

/// Takes the index on `columns` of `table` out of the registry and the catalog,
/// then closes and destroys it.
///
/// Once the handle has left the registry the catalog entry goes too, so a
/// failure to close or destroy the file does not leave an index that is listed
/// but can no longer be dropped.
pub(super) fn remove_index<H, X: IndexStorage, C: AsRef<str>>(
    index_storage: &X,
    db: &mut OpenDatabase<H, X::Handle>,
    table: &str,
    columns: &[C],
) -> Result<()> {
    let name = index_storage.index_name(table, columns);

    let handle = db
        .handles
        .take_index(&name)
        .context(error::IndexNotFoundSnafu {
            table,
            columns: to_strings(columns),
        })?;
    if let Some(table_meta) = db.meta.table_mut(table) {
        table_meta.remove_index(columns);
    }

    let closed = index_storage
        .close_index(handle)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("close index {}", name),
        });
    let destroyed = index_storage
        .destroy_index(&db.dir, table, columns)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("destroy index {}", name),
        });

    closed.and(destroyed)?;
    debug!(table, index = %name, "dropped index");

    Ok(())
}

fn to_strings<C: AsRef<str>>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_string()).collect()
}
