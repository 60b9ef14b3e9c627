use {
    def::meta::codec,
    snafu::{prelude::*, Backtrace},
    std::path::PathBuf,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("database `{}` already exists", name))]
    DatabaseExists { name: String },

    #[snafu(display("database `{}` does not exist", name))]
    DatabaseNotFound { name: String },

    #[snafu(display("database `{}` is already open", name))]
    DatabaseAlreadyOpen { name: String },

    #[snafu(display("database `{}` is open and cannot be dropped", name))]
    DatabaseInUse { name: String },

    #[snafu(display("no database is open"))]
    NoDatabaseOpen { backtrace: Backtrace },

    #[snafu(display("`{}` is not a valid name", name))]
    InvalidName { name: String },

    #[snafu(display("table `{}` already exists", name))]
    TableExists { name: String },

    #[snafu(display("table `{}` does not exist", name))]
    TableNotFound { name: String },

    #[snafu(display("table `{}` needs at least one column", table))]
    NoColumns { table: String },

    #[snafu(display("column `{}` of table `{}`: {}", column, table, reason))]
    InvalidColumn {
        table: String,
        column: String,
        reason: String,
    },

    #[snafu(display("column `{}` appears more than once for table `{}`", column, table))]
    DuplicateColumn { table: String, column: String },

    #[snafu(display("column `{}` does not exist in table `{}`", column, table))]
    ColumnNotFound { table: String, column: String },

    #[snafu(display("an index on table `{}` needs at least one column", table))]
    InvalidIndex { table: String },

    #[snafu(display("index on {}({}) already exists", table, columns.join(", ")))]
    IndexExists { table: String, columns: Vec<String> },

    #[snafu(display("index on {}({}) does not exist", table, columns.join(", ")))]
    IndexNotFound { table: String, columns: Vec<String> },

    #[snafu(display("metadata file {} is corrupt: {}", path.display(), source))]
    MetadataCorrupt {
        path: PathBuf,
        #[snafu(backtrace)]
        source: codec::Error,
    },

    #[snafu(display("failed to {}: {}", action, source))]
    ResourceFailure { action: String, source: BoxError },
}

pub type Result<T> = std::result::Result<T, Error>;
