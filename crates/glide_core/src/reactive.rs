//! Observable state cells
//!
//! Each motion component owns the state it derives from the scroll signal and
//! publishes the result through an [`Observable<T>`]. Renderers read the latest
//! value synchronously with [`Observable::get`] and re-render on change by
//! subscribing.
//!
//! Like the signals of a reactive graph, an observable keeps a version counter
//! and a subscriber list, and only notifies when the value actually changes.
//! Subscribers are snapshotted before notification, so a callback may
//! subscribe, unsubscribe, or read the cell without re-entrancy panics.
//!
//! ```rust
//! use glide_core::reactive::Observable;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let label = Observable::new(None::<String>);
//! let renders = Rc::new(Cell::new(0));
//!
//! let r = renders.clone();
//! let sub = label.subscribe(move |_| r.set(r.get() + 1));
//!
//! label.set(Some("Services".into()));
//! label.set(Some("Services".into())); // unchanged, no notification
//! assert_eq!(renders.get(), 1);
//!
//! drop(sub);
//! label.set(None);
//! assert_eq!(renders.get(), 1);
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Unique identifier for a subscriber
    pub struct SubscriptionId;
}

/// Boxed subscriber callback
pub type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Handle returned by every `subscribe` in Glide
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) detaches the
/// callback. Components rely on this for teardown: a forgotten handle would
/// keep updating detached state.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `detach` exactly once on teardown
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to detach
    pub fn empty() -> Self {
        Self { detach: None }
    }

    /// Detach now
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    /// Whether the callback is still attached
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct ObservableInner<T> {
    value: T,
    /// Version counter for change detection
    version: u64,
    subscribers: SlotMap<SubscriptionId, Subscriber<T>>,
}

/// A shared, observable value (cheap to clone, clones share state)
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value: initial,
                version: 0,
                subscribers: SlotMap::with_key(),
            })),
        }
    }

    /// Get the current value
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of changes published so far
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Replace the value, notifying subscribers if it changed
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let subscribers: SmallVec<[Subscriber<T>; 4]> = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value.clone();
            inner.version += 1;
            inner.subscribers.values().cloned().collect()
        };

        for subscriber in subscribers {
            subscriber(&value);
        }
        true
    }

    /// Update the value in place, notifying subscribers if it changed
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Subscribe to changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self
            .inner
            .borrow_mut()
            .subscribers
            .insert(Rc::new(callback));

        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                // Drop the callback outside the borrow
                let removed = inner.borrow_mut().subscribers.remove(id);
                drop(removed);
            }
        })
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}
