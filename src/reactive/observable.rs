//! Observable - A value that notifies handlers before every write commits.
//!
//! # Write ordering
//!
//! `set` snapshots the subscriber list, invokes every handler with
//! `(new, old)` and only then stores the new value. No borrow is held while
//! handlers run, so a handler may write the same observable again:
//!
//! ```text
//! outer set → handler → nested set → nested handler → nested commit → outer commit
//! ```
//!
//! There is no equality check, batching or deferral. A handler error aborts
//! the write before it commits and propagates to the caller of `set`.
//!
//! # Example
//!
//! ```ignore
//! use zenithic::reactive::Observable;
//!
//! let count = Observable::new(0);
//! let sub = count.subscribe(|new, old| {
//!     println!("{old} -> {new}");
//!     Ok(())
//! });
//!
//! count.set(1)?; // prints "0 -> 1"
//! sub.unsubscribe();
//! count.set(2)?; // silent
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;

/// Handler invoked with `(new, old)` before a write commits.
pub type ChangeHandler<T> = Rc<dyn Fn(&T, &T) -> Result<()>>;

// =============================================================================
// Observable
// =============================================================================

struct ObservableInner<T> {
    value: RefCell<T>,
    handlers: RefCell<Vec<(usize, ChangeHandler<T>)>>,
    next_id: Cell<usize>,
}

/// Shared handle to an observed value. Clones observe the same storage.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Last committed value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Run every handler, then commit `value`.
    pub fn set(&self, value: T) -> Result<()> {
        let old = self.get();
        let handlers: Vec<ChangeHandler<T>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler(&value, &old)?;
        }

        *self.inner.value.borrow_mut() = value;
        Ok(())
    }

    /// Register a handler. It stays attached until unsubscribed or cleared.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T, &T) -> Result<()> + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));

        let weak: Weak<ObservableInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .handlers
                    .borrow_mut()
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    /// Detach every handler, leaving plain storage. Returns how many were removed.
    pub fn clear_subscribers(&self) -> usize {
        let mut handlers = self.inner.handlers.borrow_mut();
        let count = handlers.len();
        handlers.clear();
        count
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.handlers.borrow().len())
            .finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Token returned by [`Observable::subscribe`].
///
/// Dropping the token does not detach the handler; call
/// [`unsubscribe`](Subscription::unsubscribe).
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the handler this token was issued for.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
