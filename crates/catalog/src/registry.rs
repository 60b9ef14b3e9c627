use std::collections::{hash_map::Entry, HashMap};

/// Open handles of the current database: heap files keyed by table name and
/// index files keyed by canonical index name.
///
/// Handles leave the registry only by being taken out, so whoever removes an
/// entry owns the handle and is the one to close it.
#[derive(Debug)]
pub struct HandleRegistry<H, I> {
    heaps: HashMap<String, H>,
    indexes: HashMap<String, I>,
}

impl<H, I> Default for HandleRegistry<H, I> {
    fn default() -> Self {
        Self {
            heaps: HashMap::new(),
            indexes: HashMap::new(),
        }
    }
}

impl<H, I> HandleRegistry<H, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` for `table`. An occupied slot is left untouched and
    /// the handle is given back.
    pub fn insert_heap(&mut self, table: impl Into<String>, handle: H) -> Result<(), H> {
        insert(&mut self.heaps, table.into(), handle)
    }

    pub fn insert_index(&mut self, name: impl Into<String>, handle: I) -> Result<(), I> {
        insert(&mut self.indexes, name.into(), handle)
    }

    pub fn heap(&self, table: &str) -> Option<&H> {
        self.heaps.get(table)
    }

    pub fn index(&self, name: &str) -> Option<&I> {
        self.indexes.get(name)
    }

    pub fn take_heap(&mut self, table: &str) -> Option<H> {
        self.heaps.remove(table)
    }

    pub fn take_index(&mut self, name: &str) -> Option<I> {
        self.indexes.remove(name)
    }

    pub fn heap_count(&self) -> usize {
        self.heaps.len()
    }

    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heaps.is_empty() && self.indexes.is_empty()
    }

    /// Empties the registry, handing every handle to the caller.
    pub fn drain(&mut self) -> (Vec<(String, H)>, Vec<(String, I)>) {
        (self.heaps.drain().collect(), self.indexes.drain().collect())
    }
}

fn insert<T>(map: &mut HashMap<String, T>, key: String, handle: T) -> Result<(), T> {
    match map.entry(key) {
        Entry::Occupied(_) => Err(handle),
        Entry::Vacant(entry) => {
            entry.insert(handle);
            Ok(())
        }
    }
}
