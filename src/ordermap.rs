//! An insertion-order-preserving map keyed by arbitrary `Value`s (§4.6).
//!
//! CBOR map keys can be any item, including arrays and maps, so this can't
//! be a `HashMap` the way the ancestor decoder's string-keyed compound was
//! (`map.rs`'s `Map` trait over `HashMap<String, Tag>`). A plain `Vec` of
//! pairs, linearly scanned, keeps the same "insert/get/iterate" shape that
//! trait offered while supporting non-hashable keys and first-insertion
//! ordering.

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap {
    entries: Vec<(Value, Value)>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a key/value pair. If the key is already present, its value
    /// is overwritten in place (last write wins) and the original insertion
    /// position is kept; the previous value is returned.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(std::mem::replace(&mut slot.1, value))
        } else {
            self.entries.push((key, value));
            None
        }
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(Value, Value)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
