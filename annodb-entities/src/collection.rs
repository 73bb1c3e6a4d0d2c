use std::{collections::HashMap, slice, vec};

use crate::id::Id;

pub trait HasId {
    fn id(&self) -> &Id;
}

/// Entities keyed by their [`Id`] that keep the order in which
/// they have been added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCollection<T> {
    entries: Vec<T>,
    positions: HashMap<Id, usize>,
}

impl<T> Default for IdCollection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: HasId> IdCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Appends the entity.
    ///
    /// An entity with the same id is replaced at its current position
    /// and returned.
    pub fn add(&mut self, entity: T) -> Option<T> {
        let id = *entity.id();
        if let Some(&pos) = self.positions.get(&id) {
            return Some(std::mem::replace(&mut self.entries[pos], entity));
        }
        self.positions.insert(id, self.entries.len());
        self.entries.push(entity);
        None
    }

    pub fn get(&self, id: &Id) -> Option<&T> {
        self.positions.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> + '_ {
        self.entries.iter().map(HasId::id)
    }

    pub fn values(&self) -> slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.values()
    }

    pub fn into_values(self) -> Vec<T> {
        self.entries
    }
}

impl<T: HasId> FromIterator<T> for IdCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut collection = Self::with_capacity(iter.size_hint().0);
        for entity in iter {
            collection.add(entity);
        }
        collection
    }
}

impl<T> IntoIterator for IdCollection<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a IdCollection<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
