//! Timer scheduler
//!
//! Deferred work in the motion layer (idle decay, notifier hide and cooldown,
//! the reveal pulse, delayed navigation) is expressed as cancellable
//! callbacks on a [`TimerScheduler`]:
//!
//! - `schedule(delay_ms, callback)` returns a [`TimerId`]
//! - `cancel(id)` drops the callback if it has not fired
//! - `advance_to(now_ms)` fires every due callback in deadline order
//!
//! Time is driven by the host. The scheduler never reads a clock, so tests
//! step time deterministically and production hosts forward their frame
//! timestamps.
//!
//! A host that only produces frames on request installs a wake callback
//! with [`TimerScheduler::set_wake_callback`]; it runs whenever a timer is
//! armed, so pending deadlines are reached without further input.
//!
//! Components hold a [`SchedulerHandle`] (weak) and keep their pending timer
//! in a [`TimerSlot`], which cancels the previous timer before arming a new one
//! and cancels on drop.
//!
//! ```rust
//! use glide_animation::scheduler::TimerScheduler;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = TimerScheduler::new();
//! let fired = Rc::new(Cell::new(false));
//!
//! let f = fired.clone();
//! scheduler.schedule(150.0, move || f.set(true));
//!
//! scheduler.advance_to(100.0);
//! assert!(!fired.get());
//! scheduler.advance_to(150.0);
//! assert!(fired.get());
//! ```

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// Deferred callback
pub type TimerCallback = Box<dyn FnOnce()>;

/// Callback to wake up the host when a timer is armed
pub type WakeCallback = Rc<dyn Fn()>;

struct Timer {
    deadline_ms: f64,
    /// Scheduling order, breaks deadline ties
    seq: u64,
    callback: TimerCallback,
}

/// Internal state of the scheduler
struct SchedulerInner {
    timers: SlotMap<TimerId, Timer>,
    now_ms: f64,
    next_seq: u64,
    fired: u64,
    wake: Option<WakeCallback>,
}

impl SchedulerInner {
    /// Remove the earliest timer due at or before `now_ms`
    fn pop_due(&mut self, now_ms: f64) -> Option<(f64, TimerCallback)> {
        let (id, _) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.deadline_ms
                    .total_cmp(&b.deadline_ms)
                    .then(a.seq.cmp(&b.seq))
            })?;

        self.timers
            .remove(id)
            .map(|timer| (timer.deadline_ms, timer.callback))
    }
}

/// Owner of all pending timers for one motion runtime
///
/// Cheap to clone; clones share the same timer table.
#[derive(Clone)]
pub struct TimerScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a scheduler whose clock starts at `now_ms`
    pub fn starting_at(now_ms: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                timers: SlotMap::with_key(),
                now_ms,
                next_seq: 0,
                fired: 0,
                wake: None,
            })),
        }
    }

    /// Set a callback that runs every time a timer is armed
    ///
    /// Use this to request a frame from a host that only delivers frames on
    /// demand. The callback runs after the timer is stored, outside any
    /// borrow of the scheduler.
    pub fn set_wake_callback<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.inner.borrow_mut().wake = Some(Rc::new(callback));
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Current scheduler time
    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Run `callback` once, `delay_ms` after the current scheduler time
    pub fn schedule<F>(&self, delay_ms: f64, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        schedule_on(&self.inner, delay_ms, Box::new(callback))
    }

    /// Cancel a pending timer
    ///
    /// Returns `true` if the timer was still pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        // Dropped after the borrow ends; its captures may touch the scheduler
        let removed = self.inner.borrow_mut().timers.remove(id);
        removed.is_some()
    }

    /// Check whether a timer has neither fired nor been cancelled
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().timers.contains_key(id)
    }

    /// Number of timers waiting to fire
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Total number of callbacks fired
    pub fn fired_count(&self) -> u64 {
        self.inner.borrow().fired
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner
            .borrow()
            .timers
            .values()
            .map(|t| t.deadline_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Advance the clock to `now_ms`, firing every timer due by then
    ///
    /// Timers fire in deadline order; ties fire in scheduling order. The
    /// clock reads each timer's deadline while its callback runs, so timers
    /// scheduled from a callback are relative to that deadline. Time never
    /// moves backwards: an earlier `now_ms` is ignored.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance_to(&self, now_ms: f64) -> usize {
        let mut fired = 0;

        loop {
            // Borrow is released before the callback runs
            let due = {
                let mut inner = self.inner.borrow_mut();
                let due = inner.pop_due(now_ms);
                if let Some((deadline, _)) = &due {
                    inner.now_ms = inner.now_ms.max(*deadline);
                    inner.fired += 1;
                }
                due
            };

            match due {
                Some((_, callback)) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.now_ms = inner.now_ms.max(now_ms);

        if fired > 0 {
            tracing::trace!(
                "TimerScheduler: fired {} timer(s) at {:.1}ms, {} pending",
                fired,
                inner.now_ms,
                inner.timers.len()
            );
        }
        fired
    }

    /// Advance the clock by `dt_ms`
    pub fn advance_by(&self, dt_ms: f64) -> usize {
        let target = self.now_ms() + dt_ms.max(0.0);
        self.advance_to(target)
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerScheduler")
            .field("now_ms", &inner.now_ms)
            .field("pending", &inner.timers.len())
            .finish()
    }
}

fn schedule_on(inner: &RefCell<SchedulerInner>, delay_ms: f64, callback: TimerCallback) -> TimerId {
    let (id, wake) = {
        let mut inner = inner.borrow_mut();
        let deadline_ms = inner.now_ms + delay_ms.max(0.0);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let id = inner.timers.insert(Timer {
            deadline_ms,
            seq,
            callback,
        });
        (id, inner.wake.clone())
    };

    if let Some(wake) = wake {
        wake();
    }
    id
}

/// A weak handle to the timer scheduler
///
/// This is passed to components that need to schedule timers.
/// It won't keep the scheduler alive; once the scheduler is dropped every
/// operation becomes a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Schedule a timer, `None` if the scheduler is gone
    pub fn schedule<F>(&self, delay_ms: f64, callback: F) -> Option<TimerId>
    where
        F: FnOnce() + 'static,
    {
        self.inner
            .upgrade()
            .map(|inner| schedule_on(&inner, delay_ms, Box::new(callback)))
    }

    /// Cancel a timer
    pub fn cancel(&self, id: TimerId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().timers.remove(id);
        removed.is_some()
    }

    /// Check whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let pending = inner.borrow().timers.contains_key(id);
        pending
    }

    /// Current scheduler time, `None` if the scheduler is gone
    pub fn now_ms(&self) -> Option<f64> {
        let inner = self.inner.upgrade()?;
        let now_ms = inner.borrow().now_ms;
        Some(now_ms)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Holder for at most one pending timer
///
/// Arming the slot cancels whatever it held before; dropping the slot cancels
/// the pending timer.
#[derive(Debug)]
pub struct TimerSlot {
    scheduler: SchedulerHandle,
    id: Option<TimerId>,
}

impl TimerSlot {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self {
            scheduler,
            id: None,
        }
    }

    /// Cancel the pending timer (if any) and schedule a new one
    pub fn set<F>(&mut self, delay_ms: f64, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.clear();
        self.id = self.scheduler.schedule(delay_ms, callback);
    }

    /// Cancel the pending timer
    ///
    /// Returns `true` if a timer was pending.
    pub fn clear(&mut self) -> bool {
        match self.id.take() {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        }
    }

    /// Check whether the slot holds a timer that has not fired yet
    pub fn is_armed(&self) -> bool {
        self.id.is_some_and(|id| self.scheduler.is_pending(id))
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
