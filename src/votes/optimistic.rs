use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A shared value that can be changed before the server confirms it.
///
/// [`Optimistic::apply`] changes the value right away and hands back a
/// [`Pending`] change holding a snapshot of what was there before. The
/// pending change only keeps a weak reference, so once every clone of
/// the value is gone the outcome of the change is simply dropped.
#[derive(Debug, Default)]
pub struct Optimistic<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Optimistic<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> Optimistic<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Overwrites the value, e.g. with freshly fetched data.
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    pub fn apply(&self, change: impl FnOnce(&mut T)) -> Pending<T> {
        let mut value = self.lock();
        let snapshot = value.clone();
        change(&mut value);

        Pending {
            target: Arc::downgrade(&self.inner),
            snapshot,
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An optimistic change waiting for its outcome.
#[derive(Debug)]
#[must_use = "a pending change should be committed or reverted"]
pub struct Pending<T> {
    target: Weak<Mutex<T>>,
    snapshot: T,
}

impl<T> Pending<T> {
    /// The value before the change was applied.
    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Whether the value this change belongs to is gone.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.target.strong_count() == 0
    }

    /// Keeps the change. It stays until the value is overwritten.
    pub fn commit(self) {}

    /// Undoes the change with `revert`, which receives the current value
    /// and the snapshot. Returns `false` if the value is gone.
    pub fn revert_with(self, revert: impl FnOnce(&mut T, T)) -> bool {
        let Some(target) = self.target.upgrade() else {
            return false;
        };

        let mut value = target.lock().unwrap_or_else(PoisonError::into_inner);
        revert(&mut value, self.snapshot);
        true
    }

    /// Puts the snapshot back.
    pub fn revert(self) -> bool {
        self.revert_with(|value, snapshot| *value = snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_revert() {
        let value = Optimistic::new(5);
        let pending = value.apply(|v| *v += 1);
        assert_eq!(value.get(), 6);
        assert_eq!(*pending.snapshot(), 5);

        assert!(pending.revert());
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn commit_keeps_the_change() {
        let value = Optimistic::new(String::from("draft"));
        value.apply(|v| v.push('!')).commit();
        assert_eq!(value.get(), "draft!");
    }

    #[test]
    fn revert_after_value_is_gone() {
        let value = Optimistic::new(1);
        let pending = value.apply(|v| *v = 2);

        let clone = value.clone();
        drop(value);
        assert!(!pending.is_detached());
        drop(clone);

        assert!(pending.is_detached());
        assert!(!pending.revert());
    }

    #[test]
    fn revert_with_custom_rule() {
        let value = Optimistic::new((true, 10));
        let pending = value.apply(|v| v.1 += 1);
        value.set((true, 20));

        pending.revert_with(|current, snapshot| current.1 = snapshot.1);
        assert_eq!(value.get(), (true, 10));
    }
}
