pub mod codec;
mod column;
mod database;
mod table;

pub use {column::*, database::*, table::*};
