use crate::ColumnType;

/// A column as declared by the caller of `create_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    pub len: u32,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType, len: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            len,
        }
    }

    /// A column of a fixed-width type, `None` for `Char` which needs an explicit length.
    pub fn fixed(name: impl Into<String>, ty: ColumnType) -> Option<Self> {
        ty.fixed_len().map(|len| Self::new(name, ty, len))
    }

    /// Whether the declared length is usable for the column's type.
    pub fn has_valid_len(&self) -> bool {
        match self.ty.fixed_len() {
            Some(len) => self.len == len,
            None => self.len > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub table: String,
    pub name: String,
    pub ty: ColumnType,
    pub len: u32,
    pub offset: u32,
    /// Set while a single-column index exists on this column.
    pub indexed: bool,
}

impl ColumnMeta {
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }
}

/// Places `defs` one after another in declaration order and returns the columns
/// together with the resulting record size.
///
/// A record must fit in `u32` bytes; otherwise the name of the first column
/// that does not fit is returned as the error.
pub fn layout_columns<'a>(
    table: &str,
    defs: &'a [ColumnDef],
) -> Result<(Vec<ColumnMeta>, u32), &'a str> {
    let mut offset = 0u32;
    let mut columns = Vec::with_capacity(defs.len());

    for def in defs {
        let end = offset.checked_add(def.len).ok_or(def.name.as_str())?;
        columns.push(ColumnMeta {
            table: table.to_string(),
            name: def.name.clone(),
            ty: def.ty,
            len: def.len,
            offset,
            indexed: false,
        });
        offset = end;
    }

    Ok((columns, offset))
}
