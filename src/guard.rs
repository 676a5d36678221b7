use std::fmt;
use std::sync::Arc;

use parking_lot::MutexGuard;

use crate::error::ListError;
use crate::list::List;
use crate::state::State;
use crate::trace::{debug, trace};

/// Exclusive critical section over a [`List`], returned by [`List::lock`].
///
/// Every operation on the guard runs under the lock the guard already holds,
/// so a sequence of calls is indivisible with respect to every other thread
/// using the same list. The lock is released when the guard is dropped or
/// passed to [`ListGuard::unlock`].
///
/// The lock is not reentrant: calling any method of the originating `List`
/// from the thread that holds the guard deadlocks. Use the guard's methods
/// instead.
pub struct ListGuard<'a, T: ?Sized> {
    list: &'a List<T>,
    state: MutexGuard<'a, State<T>>,
}

impl<'a, T: ?Sized> ListGuard<'a, T> {
    pub(crate) fn new(list: &'a List<T>, state: MutexGuard<'a, State<T>>) -> Self {
        ListGuard { list, state }
    }

    /// Release the critical section.
    pub fn unlock(self) {
        drop(self);
    }

    /// Number of items in the list
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Check if the list holds no items
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Add `item` at the end of the list.
    pub fn append(&mut self, item: Arc<T>) {
        self.state.push_back(item);
        self.list.nonempty.notify_all();
    }

    /// Insert `item` so that it becomes element `pos`.
    ///
    /// # Panics
    /// Panics if `pos > len()`
    pub fn insert(&mut self, pos: usize, item: Arc<T>) {
        if let Err(e) = self.try_insert(pos, item) {
            panic!("insert: {e}");
        }
    }

    /// Checked form of [`ListGuard::insert`].
    pub fn try_insert(&mut self, pos: usize, item: Arc<T>) -> Result<(), ListError> {
        self.state.insert(pos, item)?;
        self.list.nonempty.notify_all();
        Ok(())
    }

    /// Remove `count` items starting at `pos`. The removed items are only
    /// dropped from the list.
    ///
    /// # Panics
    /// Panics if `pos + count > len()`
    pub fn delete(&mut self, pos: usize, count: usize) {
        if let Err(e) = self.try_delete(pos, count) {
            panic!("delete: {e}");
        }
    }

    /// Checked form of [`ListGuard::delete`].
    pub fn try_delete(&mut self, pos: usize, count: usize) -> Result<(), ListError> {
        self.state.delete(pos, count)
    }

    /// Remove every item for which `matches(item, pattern)` holds. Returns
    /// the number of removed items.
    pub fn delete_all<P, F>(&mut self, pattern: &P, matches: F) -> usize
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.state.delete_all(pattern, matches)
    }

    /// Remove every handle to the same allocation as `item`. Returns the
    /// number of removed handles.
    pub fn delete_equal(&mut self, item: &Arc<T>) -> usize {
        self.state.delete_equal(item)
    }

    /// Item at `pos`.
    ///
    /// # Panics
    /// Panics if `pos >= len()`
    pub fn get(&self, pos: usize) -> Arc<T> {
        match self.state.get(pos) {
            Ok(item) => item,
            Err(e) => panic!("get: {e}"),
        }
    }

    /// Checked form of [`ListGuard::get`].
    pub fn try_get(&self, pos: usize) -> Result<Arc<T>, ListError> {
        self.state.get(pos)
    }

    /// Remove and return the first item, without waiting.
    pub fn extract_first(&mut self) -> Option<Arc<T>> {
        self.state.items.pop_front()
    }

    /// Move every matching item into a new list, keeping their order.
    /// Returns `None` and leaves the list untouched if nothing matches.
    pub fn extract_all<P, F>(&mut self, pattern: &P, matches: F) -> Option<List<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        let extracted = self.state.extract_all(pattern, matches);
        if extracted.is_empty() {
            None
        } else {
            Some(List::from_state(State::from_items(extracted)))
        }
    }

    /// First item, in list order, for which `matches(item, pattern)` holds.
    pub fn search<P, F>(&self, pattern: &P, matches: F) -> Option<Arc<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.state.search(pattern, matches)
    }

    /// New list with every matching item, in list order. The items stay in
    /// this list as well. Returns `None` if nothing matches.
    pub fn search_all<P, F>(&self, pattern: &P, matches: F) -> Option<List<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        let found = self.state.search_all(pattern, matches);
        if found.is_empty() {
            None
        } else {
            Some(List::from_state(State::from_items(found)))
        }
    }

    /// Move every item of `other` to the end of this list, in order.
    /// `other` is destroyed.
    pub fn concatenate(&mut self, mut other: List<T>) {
        let moved = other.take_items();
        if moved.is_empty() {
            return;
        }
        self.state.extend(moved);
        self.list.nonempty.notify_all();
    }

    /// Handles of all items, in list order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.state.items.iter().cloned().collect()
    }

    /// Register a producer.
    pub fn add_producer(&mut self) {
        self.state.producers += 1;
        trace!(producers = self.state.producers, "producer added");
    }

    /// Unregister a producer. When the last producer leaves, every thread
    /// blocked in `consume` wakes up.
    ///
    /// # Panics
    /// Panics if no producer is registered
    pub fn remove_producer(&mut self) {
        if let Err(e) = self.try_remove_producer() {
            panic!("remove_producer: {e}");
        }
    }

    /// Checked form of [`ListGuard::remove_producer`].
    pub fn try_remove_producer(&mut self) -> Result<(), ListError> {
        self.state.producers = self
            .state
            .producers
            .checked_sub(1)
            .ok_or(ListError::NoProducers)?;
        trace!(producers = self.state.producers, "producer removed");
        if self.state.producers == 0 {
            debug!(len = self.state.len(), "last producer gone, waking consumers");
            self.list.nonempty.notify_all();
        }
        Ok(())
    }

    /// Number of registered producers
    pub fn producer_count(&self) -> usize {
        self.state.producers
    }

    /// Append `item` and wake blocked consumers.
    pub fn produce(&mut self, item: Arc<T>) {
        self.append(item);
    }

    /// Remove and return the first item. If the list is empty but producers
    /// are registered, the lock is released while waiting for an item or
    /// for the last producer to leave. Returns `None` once the list is empty
    /// and no producers remain.
    pub fn consume(&mut self) -> Option<Arc<T>> {
        loop {
            if let Some(item) = self.state.items.pop_front() {
                return Some(item);
            }
            if self.state.producers == 0 {
                return None;
            }
            trace!(producers = self.state.producers, "consumer waiting");
            self.list.nonempty.wait(&mut self.state);
        }
    }

    /// Wait until the list has been non-empty at least once since the call.
    ///
    /// The lock is released while waiting and held again on return. If
    /// another thread took the new items before this guard got the lock
    /// back, the list may be empty again on return.
    ///
    /// Returns `true` if the list holds items on return.
    pub fn wait_until_nonempty(&mut self) -> bool {
        let seen = self.state.arrivals;
        while self.state.items.is_empty() && self.state.arrivals == seen {
            trace!("waiting for items");
            self.list.nonempty.wait(&mut self.state);
        }
        !self.state.items.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for ListGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListGuard")
            .field("len", &self.state.len())
            .field("producers", &self.state.producers)
            .finish()
    }
}
