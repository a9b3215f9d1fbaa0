//! Row handles.
//!
//! The grid never owns the shape of a row item. It holds each item behind a
//! shared [`Row`] handle, reads through column accessors, and writes back
//! through column setters. Two handles identify the same item iff they point
//! at the same allocation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared handle to one row item.
pub struct Row<T> {
    item: Arc<RwLock<T>>,
}

impl<T> Row<T> {
    /// Wraps an item in a new handle.
    pub fn new(item: T) -> Self {
        Self {
            item: Arc::new(RwLock::new(item)),
        }
    }

    /// Locks the item for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.item.read()
    }

    /// Locks the item for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.item.write()
    }

    /// Returns `true` if both handles refer to the same item.
    pub fn ptr_eq(&self, other: &Row<T>) -> bool {
        Arc::ptr_eq(&self.item, &other.item)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.item) as *const () as usize
    }
}

impl<T> From<T> for Row<T> {
    fn from(item: T) -> Self {
        Self::new(item)
    }
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
        }
    }
}

impl<T> PartialEq for Row<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Row<T> {}

impl<T> Hash for Row<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<T> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({:#x})", self.address())
    }
}

/// Wraps every item of a collection in a row handle.
pub fn rows_from<T>(items: impl IntoIterator<Item = T>) -> Vec<Row<T>> {
    items.into_iter().map(Row::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_by_reference() {
        let a = Row::new(1);
        let b = Row::new(1);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        let set: HashSet<_> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_write_through_handle() {
        let row = Row::new(String::from("a"));
        let alias = row.clone();
        alias.write().push('b');
        assert_eq!(*row.read(), "ab");
    }
}
