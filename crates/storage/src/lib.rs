//! File-backed heap and index storage used by the catalog.
//!
//! Only the file lifecycle lives here: each file starts with a small header
//! describing its layout, written on create and checked on open.

mod error;
mod file;
mod heap;
mod index;

pub use {
    error::{Error, Result},
    heap::{HeapFile, HeapFileManager},
    index::{IndexFile, IndexFileManager, KeyColumn},
};
