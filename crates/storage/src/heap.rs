use {
    crate::{
        error::{self, Error, Result},
        file,
    },
    byteorder::{ByteOrder, LE},
    def::storage::HeapStorage,
    snafu::prelude::*,
    std::{
        fs::File,
        path::{Path, PathBuf},
    },
    tracing::debug,
};

const MAGIC: [u8; 8] = *b"TBHEAP\0\0";
const HEADER_LEN: usize = MAGIC.len() + 4 + 8;

/// An open heap file.
#[derive(Debug)]
pub struct HeapFile {
    path: PathBuf,
    file: File,
    record_size: u32,
    record_count: u64,
}

impl HeapFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }
}

/// Heap files consisting of a fixed header (magic, record size, record count)
/// followed by record data written by the record manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapFileManager;

impl HeapStorage for HeapFileManager {
    type Handle = HeapFile;
    type Error = Error;

    fn create_file(&self, path: &Path, record_size: u32) -> Result<()> {
        ensure!(record_size > 0, error::InvalidRecordSizeSnafu);

        let mut header = [0u8; HEADER_LEN];
        header[..MAGIC.len()].copy_from_slice(&MAGIC);
        LE::write_u32(&mut header[MAGIC.len()..], record_size);
        LE::write_u64(&mut header[MAGIC.len() + 4..], 0);

        file::create_with_header(path, &header)?;
        debug!(path = %path.display(), record_size, "created heap file");

        Ok(())
    }

    fn open_file(&self, path: &Path) -> Result<HeapFile> {
        let (file, header) = file::open_with_header(path, HEADER_LEN)?;
        ensure!(
            header[..MAGIC.len()] == MAGIC,
            error::BadHeaderSnafu { path, kind: "heap" }
        );

        let record_size = LE::read_u32(&header[MAGIC.len()..]);
        let record_count = LE::read_u64(&header[MAGIC.len() + 4..]);

        Ok(HeapFile {
            path: path.to_path_buf(),
            file,
            record_size,
            record_count,
        })
    }

    fn close_file(&self, handle: HeapFile) -> Result<()> {
        let HeapFile { path, file, .. } = handle;
        file.sync_all().context(error::IoSnafu { path })
    }

    fn destroy_file(&self, path: &Path) -> Result<()> {
        file::remove(path)?;
        debug!(path = %path.display(), "destroyed heap file");

        Ok(())
    }
}
