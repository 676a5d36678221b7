use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::ListError;
use crate::guard::ListGuard;
use crate::state::State;
use crate::trace::trace;

/// Thread-safe dynamic list of shared item handles.
///
/// - Every method is atomic with respect to every other call on the same list
/// - [`List::lock`] groups several operations into one critical section
/// - Producers register with [`List::add_producer`]; [`List::consume`] sleeps
///   until an item arrives or the last producer is removed
///
/// Items are stored as `Arc<T>`. `T` may be unsized, so a
/// `List<dyn Any + Send + Sync>` holds items of different types. The list
/// never looks inside an item and dropping the list only drops its own
/// handles.
pub struct List<T: ?Sized> {
    state: Mutex<State<T>>,
    pub(crate) nonempty: Condvar,
}

impl<T: ?Sized> List<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` items before the
    /// buffer grows
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_state(State::with_capacity(capacity))
    }

    pub(crate) fn from_state(state: State<T>) -> Self {
        List {
            state: Mutex::new(state),
            nonempty: Condvar::new(),
        }
    }

    /// Move the items out of a list that is about to be dropped.
    pub(crate) fn take_items(&mut self) -> VecDeque<Arc<T>> {
        std::mem::take(&mut self.state.get_mut().items)
    }

    /// Destroy the list. Only the list's own handles are released; callers
    /// holding other handles to the items keep them alive.
    pub fn destroy(self) {
        drop(self);
    }

    /// Enter a critical section spanning several operations.
    ///
    /// Blocks until no other thread holds the lock. Not reentrant: calling a
    /// `List` method on the same list while holding the guard deadlocks.
    pub fn lock(&self) -> ListGuard<'_, T> {
        ListGuard::new(self, self.state.lock())
    }

    /// Enter a critical section if the lock is free right now.
    pub fn try_lock(&self) -> Option<ListGuard<'_, T>> {
        self.state.try_lock().map(|state| ListGuard::new(self, state))
    }

    /// Number of items in the list
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the list holds no items
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Add `item` at the end of the list.
    pub fn append(&self, item: Arc<T>) {
        self.lock().append(item);
    }

    /// Insert `item` so that it becomes element `pos`. Inserting at `len()`
    /// is the same as appending.
    ///
    /// # Panics
    /// Panics if `pos > len()`
    pub fn insert(&self, pos: usize, item: Arc<T>) {
        self.lock().insert(pos, item);
    }

    /// Checked form of [`List::insert`].
    pub fn try_insert(&self, pos: usize, item: Arc<T>) -> Result<(), ListError> {
        self.lock().try_insert(pos, item)
    }

    /// Remove `count` consecutive items starting at `pos`. The items are
    /// only dropped from the list.
    ///
    /// # Panics
    /// Panics if `pos + count > len()`
    pub fn delete(&self, pos: usize, count: usize) {
        self.lock().delete(pos, count);
    }

    /// Checked form of [`List::delete`].
    pub fn try_delete(&self, pos: usize, count: usize) -> Result<(), ListError> {
        self.lock().try_delete(pos, count)
    }

    /// Remove every item for which `matches(item, pattern)` returns true,
    /// keeping the order of the others. Returns the number of removed items.
    ///
    /// `matches` runs with the list locked and must not call back into it.
    pub fn delete_all<P, F>(&self, pattern: &P, matches: F) -> usize
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.lock().delete_all(pattern, matches)
    }

    /// Remove every handle that points to the same item as `item`
    /// (identity, not value equality). Returns the number of removed handles.
    pub fn delete_equal(&self, item: &Arc<T>) -> usize {
        self.lock().delete_equal(item)
    }

    /// Item at `pos`.
    ///
    /// # Panics
    /// Panics if `pos >= len()`
    pub fn get(&self, pos: usize) -> Arc<T> {
        self.lock().get(pos)
    }

    /// Checked form of [`List::get`].
    pub fn try_get(&self, pos: usize) -> Result<Arc<T>, ListError> {
        self.lock().try_get(pos)
    }

    /// Remove and return the first item, or `None` if the list is empty.
    /// Unlike [`List::consume`] this never waits.
    pub fn extract_first(&self) -> Option<Arc<T>> {
        self.lock().extract_first()
    }

    /// Move every matching item into a new list, preserving their order.
    /// Returns `None` if nothing matched; no list is created in that case.
    pub fn extract_all<P, F>(&self, pattern: &P, matches: F) -> Option<List<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.lock().extract_all(pattern, matches)
    }

    /// First item, in list order, for which `matches(item, pattern)` holds.
    pub fn search<P, F>(&self, pattern: &P, matches: F) -> Option<Arc<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.lock().search(pattern, matches)
    }

    /// New list holding every matching item, in order. The items also stay
    /// in this list. Returns `None` if nothing matched.
    pub fn search_all<P, F>(&self, pattern: &P, matches: F) -> Option<List<T>>
    where
        P: ?Sized,
        F: FnMut(&T, &P) -> bool,
    {
        self.lock().search_all(pattern, matches)
    }

    /// Append all items of `other` after the items of this list. `other`
    /// is consumed.
    pub fn concatenate(&self, other: List<T>) -> &Self {
        self.lock().concatenate(other);
        self
    }

    /// Handles of all items, in list order, taken atomically.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.lock().snapshot()
    }

    /// Register a producer.
    pub fn add_producer(&self) {
        self.lock().add_producer();
    }

    /// Unregister a producer. If this was the last one, every thread
    /// sleeping in [`List::consume`] wakes up.
    ///
    /// # Panics
    /// Panics if no producer is registered
    pub fn remove_producer(&self) {
        self.lock().remove_producer();
    }

    /// Checked form of [`List::remove_producer`].
    pub fn try_remove_producer(&self) -> Result<(), ListError> {
        self.lock().try_remove_producer()
    }

    /// Number of registered producers
    pub fn producer_count(&self) -> usize {
        self.lock().producer_count()
    }

    /// Add `item` at the end of the list and wake sleeping consumers.
    pub fn produce(&self, item: Arc<T>) {
        self.lock().produce(item);
    }

    /// Remove and return the first item.
    ///
    /// If the list is empty and producers are registered, sleeps without
    /// holding the lock until an item is produced or the last producer is
    /// removed. Returns `None` when the list is empty and no producers
    /// remain. There is no timeout.
    pub fn consume(&self) -> Option<Arc<T>> {
        self.lock().consume()
    }

    /// Sleep until the list has had at least one item since the call.
    ///
    /// Returns whether the list still held items when the wait ended;
    /// another thread may have taken them first. Use
    /// [`ListGuard::wait_until_nonempty`] to keep the lock across the wait.
    pub fn wait_until_nonempty(&self) -> bool {
        self.lock().wait_until_nonempty()
    }
}

impl<T: ?Sized> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> FromIterator<Arc<T>> for List<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self::from_state(State::from_items(iter.into_iter().collect()))
    }
}

impl<T: ?Sized> Drop for List<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if !state.items.is_empty() || state.producers > 0 {
            trace!(
                len = state.items.len(),
                producers = state.producers,
                "list dropped while in use"
            );
        }
    }
}

impl<T: ?Sized> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_lock() {
            Some(state) => f
                .debug_struct("List")
                .field("len", &state.len())
                .field("producers", &state.producers)
                .finish(),
            None => f.debug_struct("List").field("state", &"<locked>").finish(),
        }
    }
}
