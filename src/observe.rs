//! Minimal single-threaded observer list shared by the stores in this crate.
//!
//! Everything runs on the browser's UI thread, so subscribers are plain
//! `FnMut` closures behind a `RefCell`, the same ownership shape the render
//! loop uses for its frame closure.

use std::cell::{Cell, RefCell};

/// Handle returned by [`Subscribers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

pub struct Subscribers<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Box::new(callback)));
        id
    }

    /// Returns `false` when the id was unknown (already removed).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every subscriber in registration order.
    ///
    /// Subscribers must not subscribe or notify on the same list from inside
    /// their callback.
    pub fn notify(&self, value: &T) {
        for (_, callback) in self.entries.borrow_mut().iter_mut() {
            callback(value);
        }
    }
}
