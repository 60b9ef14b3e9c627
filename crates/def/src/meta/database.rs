use {super::TableMeta, std::collections::BTreeMap};

/// The catalog of one database: its tables keyed and ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseMeta {
    pub name: String,
    pub tables: BTreeMap<String, TableMeta>,
}

impl DatabaseMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableMeta> {
        self.tables.get_mut(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}
