use {
    super::error::{self, Result},
    def::{ColumnDef, ColumnType},
    snafu::prelude::*,
};

/// Parses `name:type[:length]`. The length defaults to the width of fixed-size
/// types; a `CHAR` column has to spell it out.
pub fn parse_column(spec: &str) -> Result<ColumnDef> {
    let mut parts = spec.split(':');

    let (name, ty) = match (parts.next(), parts.next()) {
        (Some(name), Some(ty)) if !name.is_empty() => (name, ty),
        _ => return error::ColumnSyntaxSnafu { spec }.fail(),
    };
    let ty = ty
        .parse::<ColumnType>()
        .context(error::ColumnTypeSnafu { spec })?;

    let len = match parts.next() {
        Some(len) => len
            .parse::<u32>()
            .ok()
            .context(error::ColumnLengthSnafu { spec, len })?,
        None => match ty.fixed_len() {
            Some(len) => len,
            None => return error::ColumnSyntaxSnafu { spec }.fail(),
        },
    };
    ensure!(parts.next().is_none(), error::ColumnSyntaxSnafu { spec });

    Ok(ColumnDef::new(name, ty, len))
}
