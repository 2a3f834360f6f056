use std::collections::HashMap;

/// Value stored under an identifier: one renderable or an ordered group of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdEntry<R> {
    Single(R),
    Group(Vec<R>),
}

/// Per-pass lookup table from identifier to renderable(s).
///
/// Numeric identifiers are stored under their decimal string form.
#[derive(Clone, Debug)]
pub struct IdTable<R> {
    entries: HashMap<String, IdEntry<R>>,
}

impl<R> Default for IdTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> IdTable<R> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Map `id` to a single renderable, replacing any previous value.
    pub fn insert_single(&mut self, id: impl Into<String>, item: R) -> &mut Self {
        self.entries.insert(id.into(), IdEntry::Single(item));
        self
    }

    pub fn insert_group(&mut self, id: impl Into<String>, items: Vec<R>) -> &mut Self {
        self.entries.insert(id.into(), IdEntry::Group(items));
        self
    }

    pub fn get(&self, id: &str) -> Option<&IdEntry<R>> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> FromIterator<(String, IdEntry<R>)> for IdTable<R> {
    fn from_iter<I: IntoIterator<Item = (String, IdEntry<R>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
