//! Memo cell used by operation nodes to keep their last computed value.

use std::cell::Cell;

/// Stores at most one `Copy` value.
///
/// If the cache holds a value, [`Cache::get_or_else`] returns it. Otherwise
/// the value is computed with the provided closure and stored until the next
/// [`Cache::invalidate`].
#[derive(Debug)]
pub struct Cache<T: Copy> {
    val: Cell<Option<T>>,
}

impl<T: Copy> Cache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { val: Cell::new(None) }
    }

    /// Returns the stored value, computing and storing it with `f` if the
    /// cache is empty.
    ///
    /// The cell is not borrowed while `f` runs, so `f` may freely evaluate
    /// other nodes.
    pub fn get_or_else(&self, f: impl FnOnce() -> T) -> T {
        if let Some(v) = self.val.get() {
            return v;
        }
        let v = f();
        self.val.set(Some(v));
        v
    }

    /// Returns the stored value without computing anything.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.val.get()
    }

    /// Whether a value is currently stored.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.val.get().is_some()
    }

    /// Drops the stored value so the next request recomputes it.
    pub fn invalidate(&self) {
        self.val.set(None);
    }
}

impl<T: Copy> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}
