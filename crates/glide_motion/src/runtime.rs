//! Motion runtime
//!
//! [`MotionRuntime`] ties a host document to the shared pieces every
//! component needs: the document's single [`ScrollSignal`] and a
//! [`TimerScheduler`] clocked by the host's frames. Components are created
//! from the runtime and torn down by dropping them.
//!
//! # Host integration
//!
//! ```text
//! scroll event    -> runtime.on_scroll_event()  (coalesced, requests a frame)
//! animation frame -> runtime.on_frame(now_ms)   (fires due timers, then samples)
//! layout change   -> runtime.invalidate()
//! ```
//!
//! The host only needs to deliver the frames it is asked for. Arming a timer
//! requests a frame, and every frame requests another while timers are
//! pending, so idle decay, label hiding and marker removal run after scroll
//! input stops. Hosts with their own timer facility can instead sleep until
//! [`MotionRuntime::next_deadline`].

use std::rc::{Rc, Weak};

use glide_animation::{ScrollTransform, SchedulerHandle, TimerScheduler};
use glide_core::{ConfigError, DocumentHost, SmoothScroller};

use crate::anchor::AnchorNavigator;
use crate::config::MotionConfig;
use crate::fill::DirectionalFill;
use crate::notifier::SectionNotifier;
use crate::progress::{ScrollLinked, ScrollProgress};
use crate::reveal::RevealObserver;
use crate::section::{SectionDescriptor, SectionTracker};
use crate::signal::{ScrollSignal, SharedHost};
use crate::velocity::VelocityEstimator;

/// Entry point for scroll-driven motion on one document
pub struct MotionRuntime {
    host: SharedHost,
    scheduler: TimerScheduler,
    signal: ScrollSignal,
    config: MotionConfig,
}

impl MotionRuntime {
    /// Create a runtime with the default tunables
    pub fn new(host: Rc<dyn DocumentHost>) -> Self {
        Self::build(host, MotionConfig::default())
    }

    /// Create a runtime with custom tunables
    pub fn with_config(host: Rc<dyn DocumentHost>, config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(host, config))
    }

    fn build(host: SharedHost, config: MotionConfig) -> Self {
        let signal = ScrollSignal::new(Rc::clone(&host));
        let scheduler = TimerScheduler::new();

        let wake: Weak<dyn DocumentHost> = Rc::downgrade(&host);
        scheduler.set_wake_callback(move || {
            if let Some(host) = wake.upgrade() {
                host.request_frame();
            }
        });

        tracing::debug!(
            "MotionRuntime: created (viewport {:.0}px, offset {:.0}px)",
            signal.current().viewport_height,
            signal.current().position
        );
        Self {
            host,
            scheduler,
            signal,
            config,
        }
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn signal(&self) -> &ScrollSignal {
        &self.signal
    }

    pub fn scheduler(&self) -> &TimerScheduler {
        &self.scheduler
    }

    pub fn scheduler_handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Forward a raw scroll event
    pub fn on_scroll_event(&self) -> bool {
        self.signal.on_scroll_event()
    }

    /// Ask for a fresh sample on the next frame (resize, content change)
    pub fn invalidate(&self) -> bool {
        self.signal.invalidate()
    }

    /// Forward an animation frame
    ///
    /// Timers due by `now_ms` fire first, then the pending scroll sample (if
    /// any) is published. If timers are still pending afterwards another
    /// frame is requested. Returns `true` if a sample was published.
    pub fn on_frame(&self, now_ms: f64) -> bool {
        self.scheduler.advance_to(now_ms);
        let published = self.signal.on_frame(now_ms);

        if self.scheduler.pending_count() > 0 {
            tracing::trace!(
                "MotionRuntime: {} timer(s) pending, next at {:?}",
                self.scheduler.pending_count(),
                self.scheduler.next_deadline()
            );
            self.host.request_frame();
        }
        published
    }

    /// Advance the timer clock without a frame
    pub fn advance_to(&self, now_ms: f64) -> usize {
        self.scheduler.advance_to(now_ms)
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    /// Earliest pending timer deadline, for hosts that schedule their own
    /// wake-ups
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn velocity(&self) -> VelocityEstimator {
        VelocityEstimator::attach(&self.signal, self.scheduler.handle(), self.config.velocity)
    }

    pub fn reveal(&self, element_id: impl Into<String>) -> RevealObserver {
        RevealObserver::observe(&self.signal, element_id, self.config.reveal)
    }

    pub fn section_tracker(&self, sections: impl Into<Vec<SectionDescriptor>>) -> SectionTracker {
        SectionTracker::attach(&self.signal, sections, self.config.section)
    }

    pub fn section_notifier(&self, sections: impl Into<Vec<SectionDescriptor>>) -> SectionNotifier {
        SectionNotifier::attach(
            &self.signal,
            self.scheduler.handle(),
            sections,
            self.config.notifier,
        )
    }

    pub fn directional_fill(&self, element_id: impl Into<String>) -> DirectionalFill {
        DirectionalFill::attach(&self.signal, element_id)
    }

    pub fn scroll_linked(&self, source: ScrollProgress, transform: ScrollTransform) -> ScrollLinked {
        ScrollLinked::attach(&self.signal, source, transform)
    }

    /// Navigator using the host's native smooth scroll
    pub fn anchor_navigator(&self) -> AnchorNavigator {
        AnchorNavigator::new(
            Rc::clone(&self.host),
            self.scheduler.handle(),
            self.config.anchor,
        )
    }

    /// Navigator routing scrolls through `engine`
    pub fn anchor_navigator_with(&self, engine: Rc<dyn SmoothScroller>) -> AnchorNavigator {
        AnchorNavigator::with_engine(
            Rc::clone(&self.host),
            self.scheduler.handle(),
            self.config.anchor,
            engine,
        )
    }
}
