use {
    catalog::CatalogManager,
    def::{
        storage::{HeapStorage, IndexStorage},
        ColumnDef, ColumnMeta, ColumnType,
    },
    snafu::prelude::*,
    std::{
        cell::{Cell, RefCell},
        path::Path,
    },
    storage::{HeapFile, HeapFileManager, IndexFile, IndexFileManager},
};

pub type Manager = CatalogManager<HeapFileManager, IndexFileManager>;

pub fn manager(data_dir: &Path) -> Manager {
    CatalogManager::new(data_dir, HeapFileManager, IndexFileManager)
}

pub fn int(name: &str) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Int, 4)
}

pub fn text(name: &str, len: u32) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Char, len)
}

/// Heap storage that counts the handles it hands out and takes back, and
/// refuses to destroy files while `fail_destroy` is set.
#[derive(Debug, Default)]
pub struct CountingHeap {
    inner: HeapFileManager,
    pub fail_destroy: Cell<bool>,
    pub opened: Cell<usize>,
    pub closed: Cell<usize>,
}

impl HeapStorage for CountingHeap {
    type Handle = HeapFile;
    type Error = FlakyError;

    fn create_file(&self, path: &Path, record_size: u32) -> Result<(), Self::Error> {
        self.inner
            .create_file(path, record_size)
            .context(StorageSnafu)
    }

    fn open_file(&self, path: &Path) -> Result<HeapFile, Self::Error> {
        let handle = self.inner.open_file(path).context(StorageSnafu)?;
        self.opened.set(self.opened.get() + 1);

        Ok(handle)
    }

    fn close_file(&self, handle: HeapFile) -> Result<(), Self::Error> {
        self.closed.set(self.closed.get() + 1);
        self.inner.close_file(handle).context(StorageSnafu)
    }

    fn destroy_file(&self, path: &Path) -> Result<(), Self::Error> {
        ensure!(
            !self.fail_destroy.get(),
            InjectedSnafu {
                name: path.display().to_string(),
            }
        );
        self.inner.destroy_file(path).context(StorageSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum FlakyError {
    #[snafu(display("injected failure on {}", name))]
    Injected { name: String },

    #[snafu(display("{}", source))]
    Storage { source: storage::Error },
}

/// Index storage that counts handles, refuses to open the index named in
/// `fail_open` and to destroy the one named in `fail_destroy`.
#[derive(Debug, Default)]
pub struct FlakyIndex {
    inner: IndexFileManager,
    pub fail_open: RefCell<Option<String>>,
    pub fail_destroy: RefCell<Option<String>>,
    pub opened: Cell<usize>,
    pub closed: Cell<usize>,
}

impl FlakyIndex {
    pub fn fail_on(&self, name: &str) {
        *self.fail_open.borrow_mut() = Some(name.to_string());
    }

    pub fn fail_destroy_on(&self, name: &str) {
        *self.fail_destroy.borrow_mut() = Some(name.to_string());
    }

    pub fn heal(&self) {
        *self.fail_open.borrow_mut() = None;
        *self.fail_destroy.borrow_mut() = None;
    }
}

impl IndexStorage for FlakyIndex {
    type Handle = IndexFile;
    type Error = FlakyError;

    fn index_exists<S: AsRef<str>>(&self, dir: &Path, table: &str, columns: &[S]) -> bool {
        self.inner.index_exists(dir, table, columns)
    }

    fn create_index(
        &self,
        dir: &Path,
        table: &str,
        columns: &[ColumnMeta],
    ) -> Result<(), Self::Error> {
        self.inner
            .create_index(dir, table, columns)
            .context(StorageSnafu)
    }

    fn open_index(
        &self,
        dir: &Path,
        table: &str,
        columns: &[ColumnMeta],
    ) -> Result<IndexFile, Self::Error> {
        let names = columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        let name = self.index_name(table, &names);
        ensure!(
            self.fail_open.borrow().as_deref() != Some(name.as_str()),
            InjectedSnafu { name }
        );

        let handle = self
            .inner
            .open_index(dir, table, columns)
            .context(StorageSnafu)?;
        self.opened.set(self.opened.get() + 1);

        Ok(handle)
    }

    fn close_index(&self, handle: IndexFile) -> Result<(), Self::Error> {
        self.closed.set(self.closed.get() + 1);
        self.inner.close_index(handle).context(StorageSnafu)
    }

    fn destroy_index<S: AsRef<str>>(
        &self,
        dir: &Path,
        table: &str,
        columns: &[S],
    ) -> Result<(), Self::Error> {
        let name = self.index_name(table, columns);
        ensure!(
            self.fail_destroy.borrow().as_deref() != Some(name.as_str()),
            InjectedSnafu { name }
        );

        self.inner
            .destroy_index(dir, table, columns)
            .context(StorageSnafu)
    }
}
