mod index;
mod listing;
mod table;

pub use listing::ColumnDescription;
use {
    crate::{
        error::{self, Result},
        registry::HandleRegistry,
        LOG_FILE_NAME, META_FILE_NAME, META_TMP_FILE_NAME,
    },
    def::{
        meta::codec::{self, MetaCodec},
        storage::{Encoder, HeapStorage, IndexStorage},
        DatabaseMeta,
    },
    snafu::prelude::*,
    std::{
        fs::{self, File},
        io::{ErrorKind, Write},
        path::{Path, PathBuf},
    },
    tracing::{debug, info, warn},
};

/// Catalog and open handles of the database currently in use.
struct OpenDatabase<H, I> {
    /// Directory name the database was opened under.
    name: String,
    dir: PathBuf,
    meta: DatabaseMeta,
    handles: HandleRegistry<H, I>,
}

/// Owns the catalog of at most one open database and every handle its tables
/// and indexes hold open.
///
/// Each database is a directory under `data_dir` holding the catalog file, a
/// log placeholder, and the heap and index files created through `S` and `X`.
/// Every DDL call validates against the catalog, asks the storage engines for
/// the physical change, updates catalog and registry, then rewrites the
/// catalog file.
pub struct CatalogManager<S: HeapStorage, X: IndexStorage> {
    data_dir: PathBuf,
    heap_storage: S,
    index_storage: X,
    open: Option<OpenDatabase<S::Handle, X::Handle>>,
}

impl<S: HeapStorage, X: IndexStorage> CatalogManager<S, X> {
    pub fn new(data_dir: impl Into<PathBuf>, heap_storage: S, index_storage: X) -> Self {
        Self {
            data_dir: data_dir.into(),
            heap_storage,
            index_storage,
            open: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn heap_storage(&self) -> &S {
        &self.heap_storage
    }

    pub fn index_storage(&self) -> &X {
        &self.index_storage
    }

    /// Creates the directory of database `name` with an empty catalog and log.
    ///
    /// Not atomic: if writing the catalog fails the directory is left behind.
    pub fn create_database(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;

        let dir = self.data_dir.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return error::DatabaseExistsSnafu { name }.fail()
            }
            Err(e) => {
                return Err(e).map_err(Into::into).context(error::ResourceFailureSnafu {
                    action: format!("create directory {}", dir.display()),
                })
            }
        }

        write_meta(&dir, &DatabaseMeta::new(name))?;

        let log = dir.join(LOG_FILE_NAME);
        File::create(&log)
            .map_err(Into::into)
            .context(error::ResourceFailureSnafu {
                action: format!("create {}", log.display()),
            })?;

        info!(database = name, "created database");

        Ok(())
    }

    /// Removes the directory of database `name` with everything in it.
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;

        if let Some(db) = &self.open {
            ensure!(db.name != name, error::DatabaseInUseSnafu { name });
        }

        let dir = self.data_dir.join(name);
        ensure!(dir.is_dir(), error::DatabaseNotFoundSnafu { name });

        fs::remove_dir_all(&dir)
            .map_err(Into::into)
            .context(error::ResourceFailureSnafu {
                action: format!("remove directory {}", dir.display()),
            })?;

        info!(database = name, "dropped database");

        Ok(())
    }

    /// Loads the catalog of `name` and opens the heap file of every table and
    /// every index on it.
    ///
    /// Either everything is opened and registered, or the handles opened so
    /// far are closed again and the error is returned with no database open.
    pub fn open_database(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;

        if let Some(db) = &self.open {
            return error::DatabaseAlreadyOpenSnafu { name: &db.name }.fail();
        }

        let dir = self.data_dir.join(name);
        ensure!(dir.is_dir(), error::DatabaseNotFoundSnafu { name });

        let path = dir.join(META_FILE_NAME);
        let meta = codec::read_file(&path).context(error::MetadataCorruptSnafu { path: &path })?;
        if meta.name != name {
            warn!(database = name, stored = %meta.name, "catalog was written under another name");
        }

        let mut handles = HandleRegistry::new();
        if let Err(e) = self.open_handles(&dir, &meta, &mut handles) {
            warn!(database = name, error = %e, "failed to open database, closing opened handles");

            if let Err(cleanup) = self.release(handles) {
                warn!(database = name, error = %cleanup, "failed to close handles");
            }

            return Err(e);
        }

        info!(
            database = name,
            tables = meta.tables.len(),
            indexes = handles.index_count(),
            "opened database"
        );

        self.open = Some(OpenDatabase {
            name: name.to_string(),
            dir,
            meta,
            handles,
        });

        Ok(())
    }

    /// Writes the catalog, closes every handle and forgets the database.
    ///
    /// All handles are closed even if writing the catalog or closing one of
    /// them fails; the first failure is returned.
    pub fn close_database(&mut self) -> Result<()> {
        let OpenDatabase {
            name,
            dir,
            meta,
            handles,
        } = self.open.take().context(error::NoDatabaseOpenSnafu)?;

        let flushed = write_meta(&dir, &meta);
        let released = self.release(handles);

        info!(database = %name, "closed database");

        flushed.and(released)
    }

    /// Rewrites the catalog file of the open database from memory.
    pub fn flush(&self) -> Result<()> {
        let db = self.open.as_ref().context(error::NoDatabaseOpenSnafu)?;
        write_meta(&db.dir, &db.meta)
    }

    fn open_handles(
        &self,
        dir: &Path,
        meta: &DatabaseMeta,
        handles: &mut HandleRegistry<S::Handle, X::Handle>,
    ) -> Result<()> {
        for table in meta.tables.values() {
            let path = dir.join(&table.name);
            let heap = self
                .heap_storage
                .open_file(&path)
                .map_err(Into::into)
                .context(error::ResourceFailureSnafu {
                    action: format!("open heap file {}", path.display()),
                })?;

            if let Err(heap) = handles.insert_heap(&table.name, heap) {
                self.close_quietly(Some(heap), None);
                return error::TableExistsSnafu { name: &table.name }.fail();
            }

            for index in &table.indexes {
                let columns = table.resolve_columns(&index.columns).map_err(|column| {
                    error::ColumnNotFoundSnafu {
                        table: &table.name,
                        column,
                    }
                    .build()
                })?;

                let name = self.index_storage.index_name(&table.name, &index.columns);
                let handle = self
                    .index_storage
                    .open_index(dir, &table.name, &columns)
                    .map_err(Into::into)
                    .context(error::ResourceFailureSnafu {
                        action: format!("open index {}", name),
                    })?;

                if let Err(handle) = handles.insert_index(name, handle) {
                    self.close_quietly(None, Some(handle));
                    return error::IndexExistsSnafu {
                        table: &table.name,
                        columns: index.columns.clone(),
                    }
                    .fail();
                }
            }

            debug!(table = %table.name, indexes = table.indexes.len(), "opened table");
        }

        Ok(())
    }

    /// Closes every handle in `handles`, indexes first. A failure is logged
    /// and does not stop the remaining closes; the first one is returned.
    fn release(&self, mut handles: HandleRegistry<S::Handle, X::Handle>) -> Result<()> {
        let (heaps, indexes) = handles.drain();
        let mut first = None;

        for (name, handle) in indexes {
            let closed = self
                .index_storage
                .close_index(handle)
                .map_err(Into::into)
                .context(error::ResourceFailureSnafu {
                    action: format!("close index {}", name),
                });

            if let Err(e) = closed {
                warn!(index = %name, error = %e, "failed to close index");
                first.get_or_insert(e);
            }
        }

        for (table, handle) in heaps {
            let closed = self
                .heap_storage
                .close_file(handle)
                .map_err(Into::into)
                .context(error::ResourceFailureSnafu {
                    action: format!("close heap file of table `{}`", table),
                });

            if let Err(e) = closed {
                warn!(table = %table, error = %e, "failed to close heap file");
                first.get_or_insert(e);
            }
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Closes handles that never made it into the registry.
    fn close_quietly(&self, heap: Option<S::Handle>, index: Option<X::Handle>) {
        if let Some(Err(e)) = heap.map(|h| self.heap_storage.close_file(h)) {
            warn!(error = %e, "failed to close unregistered heap file");
        }
        if let Some(Err(e)) = index.map(|h| self.index_storage.close_index(h)) {
            warn!(error = %e, "failed to close unregistered index");
        }
    }
}

impl<S: HeapStorage, X: IndexStorage> Drop for CatalogManager<S, X> {
    fn drop(&mut self) {
        if self.open.is_some() {
            if let Err(e) = self.close_database() {
                warn!(error = %e, "failed to close database on drop");
            }
        }
    }
}

/// Database names become directory names and table names become file names.
fn validate_name(name: &str) -> Result<()> {
    ensure!(
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(|c: char| matches!(c, '/' | '\\' | '\0')),
        error::InvalidNameSnafu { name }
    );

    Ok(())
}

/// Table names share the database directory with the catalog and index files,
/// which all carry an extension.
fn validate_table_name(name: &str) -> Result<()> {
    validate_name(name)?;
    ensure!(!name.contains('.'), error::InvalidNameSnafu { name });

    Ok(())
}

/// Replaces the catalog file in `dir` with the encoding of `meta`. The new image
/// is written to a temporary file first, so the old one stays intact until the
/// rename.
fn write_meta(dir: &Path, meta: &DatabaseMeta) -> Result<()> {
    let bytes = MetaCodec
        .encode(meta)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: "encode catalog",
        })?;

    let tmp = dir.join(META_TMP_FILE_NAME);
    let path = dir.join(META_FILE_NAME);

    let mut file = File::create(&tmp)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("create {}", tmp.display()),
        })?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("write {}", tmp.display()),
        })?;
    fs::rename(&tmp, &path)
        .map_err(Into::into)
        .context(error::ResourceFailureSnafu {
            action: format!("replace {}", path.display()),
        })?;

    debug!(path = %path.display(), bytes = bytes.len(), "flushed catalog");

    Ok(())
}
