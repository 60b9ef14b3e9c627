//! On-disk encoding of a [`DatabaseMeta`].
//!
//! ```text
//! magic (8) | version: u16 | payload_len: u32 | crc32(payload): u32 | payload
//! ```
//!
//! All integers are little-endian and strings are a `u32` byte length followed
//! by UTF-8. The payload holds the database name and then every table with its
//! columns and indexes. Index columns are stored by name and resolved against
//! the owning table when decoding.

use {
    super::{ColumnMeta, DatabaseMeta, IndexMeta, TableMeta},
    crate::{
        storage::{Decoder, Encoder},
        types::{self, ColumnType},
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    snafu::{prelude::*, Backtrace},
    std::{
        collections::BTreeMap,
        fs,
        io::{self, Cursor, Read},
        path::{Path, PathBuf},
        string::FromUtf8Error,
    },
};

pub const MAGIC: [u8; 8] = *b"TBCATLG\0";
pub const VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2 + 4 + 4;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("failed to read metadata file {}: {}", path.display(), source))]
    ReadFile { path: PathBuf, source: io::Error },

    #[snafu(display("not a catalog file"))]
    BadMagic { backtrace: Backtrace },

    #[snafu(display("unsupported catalog version {}", version))]
    UnsupportedVersion { version: u16 },

    #[snafu(display("checksum mismatch: stored {:#010x}, computed {:#010x}", stored, computed))]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[snafu(display("failed to encode catalog: {}", source))]
    Encode { source: io::Error },

    #[snafu(display("catalog data is truncated"))]
    Truncated { source: io::Error },

    #[snafu(display("{} unexpected bytes after the catalog", count))]
    TrailingBytes { count: usize },

    #[snafu(display("{} is too large to encode ({})", what, len))]
    TooLarge { what: &'static str, len: usize },

    Utf8Encoding { source: FromUtf8Error },

    InvalidColumnType {
        #[snafu(backtrace)]
        source: types::Error,
    },

    #[snafu(display("table `{}` is stored twice", table))]
    DuplicateTable { table: String },

    #[snafu(display("column `{}` is stored twice in table `{}`", column, table))]
    DuplicateColumn { table: String, column: String },

    #[snafu(display(
        "column `{}` of table `{}` is at offset {}, expected {}",
        column,
        table,
        offset,
        expected
    ))]
    ColumnOffset {
        table: String,
        column: String,
        offset: u32,
        expected: u32,
    },

    #[snafu(display("columns of table `{}` add up to more than {} bytes", table, u32::MAX))]
    RecordTooLarge { table: String },

    #[snafu(display("index on table `{}` refers to unknown column `{}`", table, column))]
    IndexColumn { table: String, column: String },

    #[snafu(display(
        "index {:?} on table `{}` has key length {}, its columns add up to {}",
        columns,
        table,
        stored,
        computed
    ))]
    KeyLength {
        table: String,
        columns: Vec<String>,
        stored: u32,
        computed: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Encodes and decodes whole catalog images.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetaCodec;

impl Encoder for MetaCodec {
    type Item = DatabaseMeta;
    type Error = Error;

    fn encode(&self, db: &DatabaseMeta) -> Result<Vec<u8>> {
        let mut payload = vec![];
        write_database(&mut payload, db)?;

        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            TooLargeSnafu {
                what: "catalog",
                len: payload.len(),
            }
            .build()
        })?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.write_u16::<LE>(VERSION).context(EncodeSnafu)?;
        bytes.write_u32::<LE>(payload_len).context(EncodeSnafu)?;
        bytes
            .write_u32::<LE>(crc32fast::hash(&payload))
            .context(EncodeSnafu)?;
        bytes.extend_from_slice(&payload);

        Ok(bytes)
    }
}

impl Decoder for MetaCodec {
    type Item = DatabaseMeta;
    type Error = Error;

    fn decode(&self, src: &[u8]) -> Result<(DatabaseMeta, usize)> {
        let mut reader = Cursor::new(src);

        let mut magic = [0u8; MAGIC.len()];
        reader.read_exact(&mut magic).context(TruncatedSnafu)?;
        ensure!(magic == MAGIC, BadMagicSnafu);

        let version = reader.read_u16::<LE>().context(TruncatedSnafu)?;
        ensure!(version == VERSION, UnsupportedVersionSnafu { version });

        let payload_len = reader.read_u32::<LE>().context(TruncatedSnafu)? as usize;
        let stored = reader.read_u32::<LE>().context(TruncatedSnafu)?;

        let rest = &src[HEADER_LEN..];
        if rest.len() < payload_len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof)).context(TruncatedSnafu);
        }
        ensure!(
            rest.len() == payload_len,
            TrailingBytesSnafu {
                count: rest.len() - payload_len
            }
        );

        let computed = crc32fast::hash(rest);
        ensure!(stored == computed, ChecksumMismatchSnafu { stored, computed });

        let mut payload = Cursor::new(rest);
        let db = read_database(&mut payload)?;

        let unread = payload_len - payload.position() as usize;
        ensure!(unread == 0, TrailingBytesSnafu { count: unread });

        Ok((db, src.len()))
    }
}

/// Reads and decodes the catalog stored at `path`.
pub fn read_file(path: &Path) -> Result<DatabaseMeta> {
    let bytes = fs::read(path).context(ReadFileSnafu { path })?;
    MetaCodec.decode(&bytes).map(|(db, _)| db)
}

fn write_database(w: &mut Vec<u8>, db: &DatabaseMeta) -> Result<()> {
    write_string(w, &db.name)?;
    write_len_u32(w, "table list", db.tables.len())?;

    db.tables.values().try_for_each(|table| write_table(w, table))
}

fn write_table(w: &mut Vec<u8>, table: &TableMeta) -> Result<()> {
    write_string(w, &table.name)?;

    write_len_u16(w, "column list", table.columns.len())?;
    for column in &table.columns {
        write_string(w, &column.name)?;
        w.write_u8(column.ty.tag()).context(EncodeSnafu)?;
        w.write_u32::<LE>(column.len).context(EncodeSnafu)?;
        w.write_u32::<LE>(column.offset).context(EncodeSnafu)?;
        w.write_u8(column.indexed as u8).context(EncodeSnafu)?;
    }

    write_len_u16(w, "index list", table.indexes.len())?;
    for index in &table.indexes {
        write_len_u16(w, "index key", index.columns.len())?;
        for column in &index.columns {
            write_string(w, column)?;
        }
        w.write_u32::<LE>(index.key_len).context(EncodeSnafu)?;
    }

    Ok(())
}

fn write_string(w: &mut Vec<u8>, s: &str) -> Result<()> {
    write_len_u32(w, "name", s.len())?;
    w.extend_from_slice(s.as_bytes());

    Ok(())
}

fn write_len_u32(w: &mut Vec<u8>, what: &'static str, len: usize) -> Result<()> {
    let n = u32::try_from(len).map_err(|_| TooLargeSnafu { what, len }.build())?;
    w.write_u32::<LE>(n).context(EncodeSnafu)
}

fn write_len_u16(w: &mut Vec<u8>, what: &'static str, len: usize) -> Result<()> {
    let n = u16::try_from(len).map_err(|_| TooLargeSnafu { what, len }.build())?;
    w.write_u16::<LE>(n).context(EncodeSnafu)
}

fn read_database(r: &mut Cursor<&[u8]>) -> Result<DatabaseMeta> {
    let name = read_string(r)?;
    let table_count = r.read_u32::<LE>().context(TruncatedSnafu)?;

    let mut tables = BTreeMap::new();
    for _ in 0..table_count {
        let table = read_table(r)?;
        ensure!(
            !tables.contains_key(&table.name),
            DuplicateTableSnafu { table: table.name }
        );
        tables.insert(table.name.clone(), table);
    }

    Ok(DatabaseMeta { name, tables })
}

fn read_table(r: &mut Cursor<&[u8]>) -> Result<TableMeta> {
    let name = read_string(r)?;

    let column_count = r.read_u16::<LE>().context(TruncatedSnafu)?;
    let mut columns: Vec<ColumnMeta> = Vec::with_capacity(column_count as usize);
    let mut expected = 0u32;

    for _ in 0..column_count {
        let column = read_column(r, &name)?;

        ensure!(
            columns.iter().all(|c| c.name != column.name),
            DuplicateColumnSnafu {
                table: &name,
                column: column.name
            }
        );
        ensure!(
            column.offset == expected,
            ColumnOffsetSnafu {
                table: &name,
                column: column.name,
                offset: column.offset,
                expected,
            }
        );

        expected = expected
            .checked_add(column.len)
            .context(RecordTooLargeSnafu { table: &name })?;
        columns.push(column);
    }

    let index_count = r.read_u16::<LE>().context(TruncatedSnafu)?;
    let mut indexes = Vec::with_capacity(index_count as usize);

    for _ in 0..index_count {
        let key_count = r.read_u16::<LE>().context(TruncatedSnafu)?;
        let keys = (0..key_count)
            .map(|_| read_string(r))
            .collect::<Result<Vec<_>>>()?;
        let stored = r.read_u32::<LE>().context(TruncatedSnafu)?;

        let mut computed = 0u32;
        for key in &keys {
            let column = columns
                .iter()
                .find(|c| &c.name == key)
                .context(IndexColumnSnafu {
                    table: &name,
                    column: key,
                })?;
            computed = computed
                .checked_add(column.len)
                .context(RecordTooLargeSnafu { table: &name })?;
        }
        ensure!(
            stored == computed,
            KeyLengthSnafu {
                table: &name,
                columns: keys,
                stored,
                computed,
            }
        );

        indexes.push(IndexMeta {
            table: name.clone(),
            columns: keys,
            key_len: stored,
        });
    }

    Ok(TableMeta {
        name,
        columns,
        indexes,
    })
}

fn read_column(r: &mut Cursor<&[u8]>, table: &str) -> Result<ColumnMeta> {
    let name = read_string(r)?;
    let tag = r.read_u8().context(TruncatedSnafu)?;
    let ty = ColumnType::from_tag(tag).context(InvalidColumnTypeSnafu)?;
    let len = r.read_u32::<LE>().context(TruncatedSnafu)?;
    let offset = r.read_u32::<LE>().context(TruncatedSnafu)?;
    let indexed = r.read_u8().context(TruncatedSnafu)? != 0;

    Ok(ColumnMeta {
        table: table.to_string(),
        name,
        ty,
        len,
        offset,
        indexed,
    })
}

fn read_string(r: &mut Cursor<&[u8]>) -> Result<String> {
    let len = r.read_u32::<LE>().context(TruncatedSnafu)? as usize;
    let remaining = r.get_ref().len() - r.position() as usize;
    if len > remaining {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof)).context(TruncatedSnafu);
    }

    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).context(TruncatedSnafu)?;

    String::from_utf8(bytes).context(Utf8EncodingSnafu)
}
