use {def::types, snafu::prelude::*};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("{}", source))]
    Catalog {
        #[snafu(backtrace)]
        source: catalog::Error,
    },

    #[snafu(display("column `{}` should look like `name:type[:length]`", spec))]
    ColumnSyntax { spec: String },

    #[snafu(display("column `{}`: {}", spec, source))]
    ColumnType { spec: String, source: types::Error },

    #[snafu(display("column `{}`: `{}` is not a length", spec, len))]
    ColumnLength { spec: String, len: String },
}

pub type Result<T> = std::result::Result<T, Error>;
