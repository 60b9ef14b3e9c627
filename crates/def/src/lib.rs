pub mod meta;
pub mod storage;
pub mod types;

pub use {
    meta::{ColumnDef, ColumnMeta, DatabaseMeta, IndexMeta, TableMeta},
    types::ColumnType,
};
