use {
    crate::{
        error::{self, Error, Result},
        file,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    def::{storage::IndexStorage, ColumnMeta, ColumnType},
    snafu::prelude::*,
    std::{
        fs::File,
        io::Cursor,
        path::{Path, PathBuf},
    },
    tracing::debug,
};

const MAGIC: [u8; 8] = *b"TBINDEX\0";
const FIXED_HEADER_LEN: usize = MAGIC.len() + 4 + 2;
const KEY_COLUMN_LEN: usize = 1 + 4 + 4;

/// Type, length and record offset of one key column as stored in the index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColumn {
    pub ty: ColumnType,
    pub len: u32,
    pub offset: u32,
}

/// An open index file.
#[derive(Debug)]
pub struct IndexFile {
    path: PathBuf,
    file: File,
    key_len: u32,
    key_columns: Vec<KeyColumn>,
}

impl IndexFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key_len(&self) -> u32 {
        self.key_len
    }

    pub fn key_columns(&self) -> &[KeyColumn] {
        &self.key_columns
    }
}

/// Index files whose header describes the key. Key comparison and page
/// management belong to the index engine that fills these files.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexFileManager;

impl IndexFileManager {
    fn path<S: AsRef<str>>(&self, dir: &Path, table: &str, columns: &[S]) -> PathBuf {
        dir.join(self.index_name(table, columns))
    }
}

impl IndexStorage for IndexFileManager {
    type Handle = IndexFile;
    type Error = Error;

    fn index_exists<S: AsRef<str>>(&self, dir: &Path, table: &str, columns: &[S]) -> bool {
        self.path(dir, table, columns).is_file()
    }

    fn create_index(&self, dir: &Path, table: &str, columns: &[ColumnMeta]) -> Result<()> {
        ensure!(!columns.is_empty(), error::EmptyKeySnafu);

        let key_len = total_key_len(columns).context(error::KeyTooLargeSnafu)?;
        let path = self.path(dir, table, names(columns).as_slice());
        let header = encode_header(key_len, columns).context(error::IoSnafu { path: &path })?;

        file::create_with_header(&path, &header)?;
        debug!(path = %path.display(), "created index file");

        Ok(())
    }

    fn open_index(&self, dir: &Path, table: &str, columns: &[ColumnMeta]) -> Result<IndexFile> {
        let path = self.path(dir, table, names(columns).as_slice());
        let len = FIXED_HEADER_LEN + KEY_COLUMN_LEN * columns.len();

        let (file, header) = file::open_with_header(&path, len)?;
        let (key_len, key_columns) = match decode_header(&header) {
            Some(decoded) => decoded,
            None => {
                return error::BadHeaderSnafu {
                    path,
                    kind: "index",
                }
                .fail()
            }
        };

        let expected = total_key_len(columns).context(error::KeyTooLargeSnafu)?;
        ensure!(
            key_len == expected && key_columns.len() == columns.len(),
            error::KeyMismatchSnafu {
                path,
                stored: key_len,
                expected,
            }
        );

        Ok(IndexFile {
            path,
            file,
            key_len,
            key_columns,
        })
    }

    fn close_index(&self, handle: IndexFile) -> Result<()> {
        let IndexFile { path, file, .. } = handle;
        file.sync_all().context(error::IoSnafu { path })
    }

    fn destroy_index<S: AsRef<str>>(&self, dir: &Path, table: &str, columns: &[S]) -> Result<()> {
        let path = self.path(dir, table, columns);

        file::remove(&path)?;
        debug!(path = %path.display(), "destroyed index file");

        Ok(())
    }
}

fn names(columns: &[ColumnMeta]) -> Vec<&str> {
    columns.iter().map(|c| c.name.as_str()).collect()
}

/// Sum of the key column lengths, `None` if it does not fit in `u32`.
fn total_key_len(columns: &[ColumnMeta]) -> Option<u32> {
    columns
        .iter()
        .try_fold(0u32, |len, column| len.checked_add(column.len))
}

fn encode_header(key_len: u32, columns: &[ColumnMeta]) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(FIXED_HEADER_LEN + KEY_COLUMN_LEN * columns.len());
    header.extend_from_slice(&MAGIC);
    header.write_u32::<LE>(key_len)?;
    header.write_u16::<LE>(columns.len() as u16)?;

    for column in columns {
        header.write_u8(column.ty.tag())?;
        header.write_u32::<LE>(column.len)?;
        header.write_u32::<LE>(column.offset)?;
    }

    Ok(header)
}

fn decode_header(header: &[u8]) -> Option<(u32, Vec<KeyColumn>)> {
    if header[..MAGIC.len()] != MAGIC {
        return None;
    }

    let mut reader = Cursor::new(&header[MAGIC.len()..]);
    let key_len = reader.read_u32::<LE>().ok()?;
    let count = reader.read_u16::<LE>().ok()?;

    let key_columns = (0..count)
        .map(|_| {
            let ty = ColumnType::from_tag(reader.read_u8().ok()?).ok()?;
            let len = reader.read_u32::<LE>().ok()?;
            let offset = reader.read_u32::<LE>().ok()?;

            Some(KeyColumn { ty, len, offset })
        })
        .collect::<Option<Vec<_>>>()?;

    Some((key_len, key_columns))
}
