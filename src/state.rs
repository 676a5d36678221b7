use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::ListError;

/// Bookkeeping protected by the list lock.
///
/// Holds the item handles in list order and the number of registered
/// producers, plus a counter of item arrivals so waiters can tell that the
/// list became non-empty even if the item is gone again. All positional and
/// pattern-based algorithms live here so the auto-locking `List` methods and
/// the `ListGuard` methods share one implementation.
pub(crate) struct State<T: ?Sized> {
    pub(crate) items: VecDeque<Arc<T>>,
    pub(crate) producers: usize,
    pub(crate) arrivals: u64,
}

impl<T: ?Sized> State<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        State {
            items: VecDeque::with_capacity(capacity),
            producers: 0,
            arrivals: 0,
        }
    }

    pub(crate) fn from_items(items: VecDeque<Arc<T>>) -> Self {
        State {
            items,
            producers: 0,
            arrivals: 0,
        }
    }

    pub(crate) fn push_back(&mut self, item: Arc<T>) {
        self.items.push_back(item);
        self.arrivals = self.arrivals.wrapping_add(1);
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get(&self, pos: usize) -> Result<Arc<T>, ListError> {
        self.items
            .get(pos)
            .cloned()
            .ok_or(ListError::PositionOutOfRange {
                pos,
                len: self.items.len(),
            })
    }

    /// Insert so that `item` ends up at `pos`; `pos == len` appends.
    pub(crate) fn insert(&mut self, pos: usize, item: Arc<T>) -> Result<(), ListError> {
        let len = self.items.len();
        if pos > len {
            return Err(ListError::PositionOutOfRange { pos, len });
        }
        self.items.insert(pos, item);
        self.arrivals = self.arrivals.wrapping_add(1);
        Ok(())
    }

    /// Move `other` to the end, in order.
    pub(crate) fn extend(&mut self, other: VecDeque<Arc<T>>) {
        if !other.is_empty() {
            self.items.extend(other);
            self.arrivals = self.arrivals.wrapping_add(1);
        }
    }

    /// Drop `count` handles starting at `pos`. An empty range is valid at
    /// any `pos <= len`.
    pub(crate) fn delete(&mut self, pos: usize, count: usize) -> Result<(), ListError> {
        let len = self.items.len();
        let end = pos
            .checked_add(count)
            .filter(|&end| end <= len)
            .ok_or(ListError::RangeOutOfBounds { pos, count, len })?;
        self.items.drain(pos..end);
        Ok(())
    }

    /// Remove every item matching `pattern`, keeping the order of the rest.
    /// Returns the number of removed items.
    pub(crate) fn delete_all<P, F>(&mut self, pattern: &P, mut matches: F) -> usize
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !matches(item, pattern));
        before - self.items.len()
    }

    /// Remove every handle pointing at the same allocation as `item`.
    pub(crate) fn delete_equal(&mut self, item: &Arc<T>) -> usize {
        let before = self.items.len();
        self.items.retain(|candidate| !Arc::ptr_eq(candidate, item));
        before - self.items.len()
    }

    /// Split matching items out into a new sequence, in their original
    /// order. Nothing is allocated when no item matches.
    pub(crate) fn extract_all<P, F>(&mut self, pattern: &P, mut matches: F) -> VecDeque<Arc<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        let mut extracted = VecDeque::new();
        self.items.retain(|item| {
            if matches(item, pattern) {
                extracted.push_back(Arc::clone(item));
                false
            } else {
                true
            }
        });
        extracted
    }

    pub(crate) fn search<P, F>(&self, pattern: &P, mut matches: F) -> Option<Arc<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.items
            .iter()
            .find(|item| matches(item, pattern))
            .cloned()
    }

    pub(crate) fn search_all<P, F>(&self, pattern: &P, mut matches: F) -> VecDeque<Arc<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.items
            .iter()
            .filter(|item| matches(item, pattern))
            .cloned()
            .collect()
    }
}
