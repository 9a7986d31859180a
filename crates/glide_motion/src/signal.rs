//! Scroll signal source
//!
//! One [`ScrollSignal`] exists per document. Hosts forward every raw scroll
//! event to [`ScrollSignal::on_scroll_event`] and every animation frame to
//! [`ScrollSignal::on_frame`]. However many raw events arrive within a frame,
//! subscribers are notified at most once per frame with a single
//! [`ScrollSample`], and the scroll offset is read from the host once per
//! frame.
//!
//! The signal owns the host's only scroll listener: it is attached when the
//! first subscriber arrives and detached when the last one leaves.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glide_core::{DocumentHost, Subscription, Viewport};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

/// Shared host document
pub type SharedHost = Rc<dyn DocumentHost>;

/// Callback receiving each coalesced scroll sample
pub type SampleCallback = Rc<dyn Fn(&ScrollSample)>;

new_key_type! {
    /// Handle to a signal subscriber
    pub struct SampleSubscriberId;
}

/// Vertical scroll direction derived from the sign of a position delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Position increased
    Down,
    /// Position decreased
    Up,
    /// No movement
    #[default]
    Idle,
}

impl Direction {
    pub fn from_delta(delta: f32) -> Self {
        if delta > 0.0 {
            Direction::Down
        } else if delta < 0.0 {
            Direction::Up
        } else {
            Direction::Idle
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, Direction::Idle)
    }
}

/// One coalesced reading of the scroll position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSample {
    /// Vertical scroll offset (0 when there is no scroll container)
    pub position: f32,
    /// Frame timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Viewport height read in the same frame
    pub viewport_height: f32,
}

impl ScrollSample {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.position, self.viewport_height)
    }
}

struct SignalInner {
    latest: ScrollSample,
    frame_pending: bool,
    subscribers: SlotMap<SampleSubscriberId, SampleCallback>,
    raw_events: u64,
    frames: u64,
}

/// The single scroll signal of a document (cheap to clone, clones share state)
#[derive(Clone)]
pub struct ScrollSignal {
    host: SharedHost,
    inner: Rc<RefCell<SignalInner>>,
}

impl ScrollSignal {
    /// Create the signal, taking an initial reading from the host
    pub fn new(host: SharedHost) -> Self {
        let latest = ScrollSample {
            position: host.scroll_offset().unwrap_or(0.0),
            timestamp_ms: 0.0,
            viewport_height: host.viewport_height(),
        };

        Self {
            host,
            inner: Rc::new(RefCell::new(SignalInner {
                latest,
                frame_pending: false,
                subscribers: SlotMap::with_key(),
                raw_events: 0,
                frames: 0,
            })),
        }
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    /// Latest sample, without touching the host
    pub fn current(&self) -> ScrollSample {
        self.inner.borrow().latest
    }

    /// Raw scroll event from the host
    ///
    /// Returns `true` if this event requested a new frame, `false` if it was
    /// coalesced into an already pending one.
    pub fn on_scroll_event(&self) -> bool {
        let request = {
            let mut inner = self.inner.borrow_mut();
            inner.raw_events += 1;
            !std::mem::replace(&mut inner.frame_pending, true)
        };

        if request {
            self.host.request_frame();
        }
        request
    }

    /// Request a sample on the next frame without a scroll event
    /// (layout changed, viewport resized)
    pub fn invalidate(&self) -> bool {
        let request = !std::mem::replace(&mut self.inner.borrow_mut().frame_pending, true);
        if request {
            self.host.request_frame();
        }
        request
    }

    /// Animation frame from the host
    ///
    /// If a frame is pending, reads the scroll offset once and notifies every
    /// subscriber once, in subscription order. Returns `true` if a sample
    /// was published.
    pub fn on_frame(&self, now_ms: f64) -> bool {
        let (sample, subscribers) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.frame_pending {
                return false;
            }
            inner.frame_pending = false;
            inner.frames += 1;

            let sample = ScrollSample {
                position: self.host.scroll_offset().unwrap_or(0.0),
                timestamp_ms: now_ms,
                viewport_height: self.host.viewport_height(),
            };
            inner.latest = sample;

            let subscribers: SmallVec<[(SampleSubscriberId, SampleCallback); 8]> = inner
                .subscribers
                .iter()
                .map(|(id, cb)| (id, Rc::clone(cb)))
                .collect();
            (sample, subscribers)
        };

        tracing::trace!(
            "ScrollSignal: frame at {:.1}ms, position={:.1}, {} subscriber(s)",
            now_ms,
            sample.position,
            subscribers.len()
        );

        for (id, callback) in subscribers {
            // Skip subscribers detached earlier in this frame
            if !self.inner.borrow().subscribers.contains_key(id) {
                continue;
            }
            callback(&sample);
        }
        true
    }

    /// Subscribe to coalesced samples
    ///
    /// The returned [`Subscription`] detaches on drop; the host listener is
    /// released with the last subscription.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ScrollSample) + 'static,
    {
        let (first, id) = {
            let mut inner = self.inner.borrow_mut();
            let first = inner.subscribers.is_empty();
            (first, inner.subscribers.insert(Rc::new(callback)))
        };

        if first {
            tracing::debug!("ScrollSignal: attaching scroll listener");
            self.host.set_scroll_listening(true);
        }

        let weak: Weak<RefCell<SignalInner>> = Rc::downgrade(&self.inner);
        let host = Rc::clone(&self.host);
        Subscription::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let (removed, now_empty) = {
                let mut inner = inner.borrow_mut();
                let removed = inner.subscribers.remove(id);
                (removed, inner.subscribers.is_empty())
            };
            if removed.is_some() && now_empty {
                tracing::debug!("ScrollSignal: detaching scroll listener");
                host.set_scroll_listening(false);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Raw events received so far
    pub fn raw_event_count(&self) -> u64 {
        self.inner.borrow().raw_events
    }

    /// Samples published so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }
}

impl fmt::Debug for ScrollSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ScrollSignal")
            .field("latest", &inner.latest)
            .field("frame_pending", &inner.frame_pending)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_core::testing::MockDocument;
    use std::cell::Cell;

    fn setup() -> (Rc<MockDocument>, ScrollSignal) {
        let doc = Rc::new(MockDocument::new(800.0, 4000.0));
        let signal = ScrollSignal::new(doc.clone());
        (doc, signal)
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(3.0), Direction::Down);
        assert_eq!(Direction::from_delta(-0.5), Direction::Up);
        assert_eq!(Direction::from_delta(0.0), Direction::Idle);
        assert!(!Direction::Idle.is_moving());
    }

    #[test]
    fn test_coalesces_events_into_one_frame() {
        let (doc, signal) = setup();
        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        let _sub = signal.subscribe(move |_| n.set(n.get() + 1));

        let reads_before = doc.layout_reads();
        assert!(signal.on_scroll_event());
        for y in [10.0, 20.0, 30.0] {
            doc.set_scroll_y(y);
            assert!(!signal.on_scroll_event());
        }
        assert_eq!(doc.frame_requests(), 1);

        assert!(signal.on_frame(16.0));
        assert_eq!(notified.get(), 1);
        assert_eq!(doc.layout_reads() - reads_before, 1);
        assert_eq!(signal.current().position, 30.0);
        assert_eq!(signal.current().timestamp_ms, 16.0);
        assert_eq!(signal.raw_event_count(), 4);
    }

    #[test]
    fn test_frame_without_events_is_a_noop() {
        let (doc, signal) = setup();
        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        let _sub = signal.subscribe(move |_| n.set(n.get() + 1));

        let reads_before = doc.layout_reads();
        assert!(!signal.on_frame(16.0));
        assert_eq!(notified.get(), 0);
        assert_eq!(doc.layout_reads(), reads_before);
    }

    #[test]
    fn test_listener_follows_subscriber_count() {
        let (doc, signal) = setup();
        assert!(!doc.is_listening());

        let a = signal.subscribe(|_| {});
        let b = signal.subscribe(|_| {});
        assert!(doc.is_listening());
        assert_eq!(doc.listener_toggles(), 1);

        drop(a);
        assert!(doc.is_listening());
        b.unsubscribe();
        assert!(!doc.is_listening());
        assert_eq!(doc.listener_toggles(), 2);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_missing_scroll_container_reads_zero() {
        let doc = Rc::new(MockDocument::without_scroll_container(600.0));
        let signal = ScrollSignal::new(doc.clone());
        signal.on_scroll_event();
        signal.on_frame(16.0);
        assert_eq!(signal.current().position, 0.0);
        assert_eq!(signal.current().viewport_height, 600.0);
    }

    #[test]
    fn test_subscriber_detached_mid_frame_is_skipped() {
        let (doc, signal) = setup();
        let second_runs = Rc::new(Cell::new(0));

        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let v = victim.clone();
        let _first = signal.subscribe(move |_| {
            let sub = v.borrow_mut().take();
            drop(sub);
        });
        let r = second_runs.clone();
        *victim.borrow_mut() = Some(signal.subscribe(move |_| r.set(r.get() + 1)));

        doc.set_scroll_y(100.0);
        signal.on_scroll_event();
        signal.on_frame(16.0);
        assert_eq!(second_runs.get(), 0);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn test_invalidate_requests_frame() {
        let (doc, signal) = setup();
        assert!(signal.invalidate());
        assert!(!signal.on_scroll_event());
        assert_eq!(doc.frame_requests(), 1);
        assert!(signal.on_frame(16.0));
    }
}
