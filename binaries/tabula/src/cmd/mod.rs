//! One function per subcommand. Each opens the database it works on, does its
//! job and closes it again.

mod column;
mod error;

pub use {
    column::parse_column,
    error::{Error, Result},
};
use {
    catalog::CatalogManager,
    comfy_table::{presets, Row, Table},
    def::ColumnType,
    snafu::prelude::*,
    std::path::Path,
    storage::{HeapFileManager, IndexFileManager},
};

type Manager = CatalogManager<HeapFileManager, IndexFileManager>;

fn manager(data_dir: &Path) -> Manager {
    CatalogManager::new(data_dir, HeapFileManager, IndexFileManager)
}

fn with_database<T>(
    data_dir: &Path,
    database: &str,
    f: impl FnOnce(&mut Manager) -> catalog::Result<T>,
) -> Result<T> {
    let mut manager = manager(data_dir);
    manager
        .open_database(database)
        .context(error::CatalogSnafu)?;

    let result = f(&mut manager);
    let closed = manager.close_database();

    let value = result.context(error::CatalogSnafu)?;
    closed.context(error::CatalogSnafu)?;

    Ok(value)
}

pub fn create_database(data_dir: &Path, name: &str) -> Result<()> {
    manager(data_dir)
        .create_database(name)
        .context(error::CatalogSnafu)
}

pub fn drop_database(data_dir: &Path, name: &str) -> Result<()> {
    manager(data_dir)
        .drop_database(name)
        .context(error::CatalogSnafu)
}

/// `columns` are `name:type[:length]` specs, see [`parse_column`].
pub fn create_table<S: AsRef<str>>(
    data_dir: &Path,
    database: &str,
    table: &str,
    columns: &[S],
) -> Result<()> {
    let columns = columns
        .iter()
        .map(|spec| parse_column(spec.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    with_database(data_dir, database, |manager| {
        manager.create_table(table, &columns)
    })
}

pub fn drop_table(data_dir: &Path, database: &str, table: &str) -> Result<()> {
    with_database(data_dir, database, |manager| manager.drop_table(table))
}

pub fn create_index<S: AsRef<str>>(
    data_dir: &Path,
    database: &str,
    table: &str,
    columns: &[S],
) -> Result<()> {
    with_database(data_dir, database, |manager| {
        manager.create_index(table, columns)
    })
}

pub fn drop_index<S: AsRef<str>>(
    data_dir: &Path,
    database: &str,
    table: &str,
    columns: &[S],
) -> Result<()> {
    with_database(data_dir, database, |manager| {
        manager.drop_index(table, columns)
    })
}

fn listing(header: impl Into<Row>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_MARKDOWN);
    table.set_header(header);

    table
}

pub fn show_tables(data_dir: &Path, database: &str) -> Result<String> {
    let tables = with_database(data_dir, database, |manager| manager.show_tables())?;

    let mut listing = listing(vec![format!("Tables_in_{}", database)]);
    for table in tables {
        listing.add_row(vec![table]);
    }

    Ok(listing.to_string())
}

pub fn desc_table(data_dir: &Path, database: &str, table: &str) -> Result<String> {
    let columns = with_database(data_dir, database, |manager| manager.desc_table(table))?;

    let mut listing = listing(["Field", "Type", "Offset", "Indexed"]);
    for column in columns {
        let ty = match column.ty {
            ColumnType::Char => format!("{}({})", column.ty, column.len),
            ty => ty.to_string(),
        };
        let indexed = if column.indexed { "YES" } else { "NO" };

        listing.add_row(vec![
            column.name,
            ty,
            column.offset.to_string(),
            indexed.to_string(),
        ]);
    }

    Ok(listing.to_string())
}
