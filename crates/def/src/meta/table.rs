use super::{layout_columns, ColumnDef, ColumnMeta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMeta {
    pub table: String,
    /// Key columns in declared order.
    pub columns: Vec<String>,
    pub key_len: u32,
}

impl IndexMeta {
    pub fn is_on<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(a, b)| a == b.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub indexes: Vec<IndexMeta>,
}

impl TableMeta {
    /// Lays out `defs` as a new table without indexes. Fails with the name of
    /// the first column that pushes the record size past `u32::MAX`.
    pub fn new<'a>(name: impl Into<String>, defs: &'a [ColumnDef]) -> Result<Self, &'a str> {
        let name = name.into();
        let (columns, _) = layout_columns(&name, defs)?;

        Ok(Self {
            name,
            columns,
            indexes: vec![],
        })
    }

    /// End of the last column. Tables built by [`new`](Self::new) or decoded
    /// from a catalog file always fit.
    pub fn record_size(&self) -> u32 {
        self.columns
            .iter()
            .fold(0u32, |size, column| size.saturating_add(column.len))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index<S: AsRef<str>>(&self, columns: &[S]) -> Option<&IndexMeta> {
        self.indexes.iter().find(|index| index.is_on(columns))
    }

    /// Resolves `names` against this table's columns in the given order.
    /// Returns the first name that does not resolve as the error.
    pub fn resolve_columns<'a, S: AsRef<str>>(
        &self,
        names: &'a [S],
    ) -> Result<Vec<ColumnMeta>, &'a str> {
        names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned().ok_or(name.as_ref()))
            .collect()
    }

    pub fn add_index(&mut self, index: IndexMeta) {
        if let [column] = index.columns.as_slice() {
            self.set_indexed(column, true);
        }
        self.indexes.push(index);
    }

    pub fn remove_index<S: AsRef<str>>(&mut self, columns: &[S]) -> Option<IndexMeta> {
        let pos = self.indexes.iter().position(|index| index.is_on(columns))?;
        let index = self.indexes.remove(pos);

        if let [column] = index.columns.as_slice() {
            self.set_indexed(column, false);
        }

        Some(index)
    }

    fn set_indexed(&mut self, column: &str, indexed: bool) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == column) {
            column.indexed = indexed;
        }
    }
}
