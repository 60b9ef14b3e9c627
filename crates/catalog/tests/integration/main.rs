mod common;
mod database;
mod index;
mod table;
