//! Section crossing notifications
//!
//! Announces a section's label briefly when the reader scrolls into it. The
//! announcement fires when a section's crossing window
//! (`top ..= top + crossing_window`) contains the viewport's midpoint line.
//!
//! Two timers govern the label: a hide timer clears it after `display_ms`,
//! and a separate cooldown blocks new announcements for `cooldown_ms`. The
//! same section is never announced twice in a row.

use std::cell::RefCell;
use std::rc::Rc;

use glide_animation::{SchedulerHandle, TimerSlot};
use glide_core::{ConfigError, Observable, Subscription, Viewport};

use crate::section::SectionDescriptor;
use crate::signal::{ScrollSignal, SharedHost};

/// Height of the band below a section's top that triggers the notifier
pub const CROSSING_WINDOW: f32 = 250.0;

/// Position of the trigger line, as a fraction of viewport height
pub const MIDPOINT_RATIO: f32 = 0.45;

/// How long the label stays visible
pub const LABEL_DISPLAY_MS: f64 = 1400.0;

/// Quiet period after an announcement
pub const NOTIFY_COOLDOWN_MS: f64 = 2000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotifierConfig {
    pub crossing_window: f32,
    pub midpoint_ratio: f32,
    pub display_ms: f64,
    /// Must be at least `display_ms`
    pub cooldown_ms: f64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            crossing_window: CROSSING_WINDOW,
            midpoint_ratio: MIDPOINT_RATIO,
            display_ms: LABEL_DISPLAY_MS,
            cooldown_ms: NOTIFY_COOLDOWN_MS,
        }
    }
}

impl NotifierConfig {
    pub fn with_crossing_window(mut self, window: f32) -> Self {
        self.crossing_window = window;
        self
    }

    pub fn with_midpoint_ratio(mut self, ratio: f32) -> Self {
        self.midpoint_ratio = ratio;
        self
    }

    /// Set the label display time and the cooldown together
    pub fn with_timing(mut self, display_ms: f64, cooldown_ms: f64) -> Self {
        self.display_ms = display_ms;
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("crossing_window", self.crossing_window as f64)?;
        ConfigError::check_range("midpoint_ratio", self.midpoint_ratio as f64, 0.0, 1.0)?;
        ConfigError::check_positive("display_ms", self.display_ms)?;
        ConfigError::check_range("cooldown_ms", self.cooldown_ms, self.display_ms, f64::MAX)
    }
}

/// Notifier state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifierState {
    /// Last section announced
    pub last_shown_id: Option<String>,
    pub cooldown_active: bool,
    /// Label currently on screen
    pub visible_label: Option<String>,
}

impl NotifierState {
    /// Section to announce for this viewport, if any
    ///
    /// Nothing is announced while the cooldown is active. Otherwise the
    /// first section (in order) whose crossing window contains the midpoint
    /// line and which differs from the last announcement wins.
    pub fn evaluate<'a, F>(
        &self,
        sections: &'a [SectionDescriptor],
        viewport: Viewport,
        config: &NotifierConfig,
        top_of: F,
    ) -> Option<&'a SectionDescriptor>
    where
        F: Fn(&str) -> Option<f32>,
    {
        if self.cooldown_active {
            return None;
        }

        let midpoint = viewport.line_at(config.midpoint_ratio);
        sections.iter().find(|s| {
            if self.last_shown_id.as_deref() == Some(s.id.as_str()) {
                return false;
            }
            top_of(&s.id)
                .is_some_and(|top| midpoint >= top && midpoint <= top + config.crossing_window)
        })
    }

    /// Start announcing `section`
    pub fn show(&mut self, section: &SectionDescriptor) {
        self.last_shown_id = Some(section.id.clone());
        self.visible_label = Some(section.label.clone());
        self.cooldown_active = true;
    }

    pub fn hide(&mut self) {
        self.visible_label = None;
    }

    pub fn end_cooldown(&mut self) {
        self.cooldown_active = false;
    }
}

struct NotifierTimers {
    hide: TimerSlot,
    cooldown: TimerSlot,
}

/// Live section notifier attached to a [`ScrollSignal`]
///
/// Dropping the notifier detaches it and cancels both timers.
pub struct SectionNotifier {
    state: Observable<NotifierState>,
    timers: Rc<RefCell<NotifierTimers>>,
    _subscription: Subscription,
}

impl SectionNotifier {
    pub fn attach(
        signal: &ScrollSignal,
        scheduler: SchedulerHandle,
        sections: impl Into<Vec<SectionDescriptor>>,
        config: NotifierConfig,
    ) -> Self {
        let sections: Rc<[SectionDescriptor]> = sections.into().into();
        let host: SharedHost = Rc::clone(signal.host());
        let state = Observable::new(NotifierState::default());
        let timers = Rc::new(RefCell::new(NotifierTimers {
            hide: TimerSlot::new(scheduler.clone()),
            cooldown: TimerSlot::new(scheduler),
        }));

        let subscription = {
            let state = state.clone();
            let timers = Rc::clone(&timers);
            signal.subscribe(move |sample| {
                let next = state.with(|s| {
                    s.evaluate(&sections, sample.viewport(), &config, |id| {
                        host.element_bounds(id).map(|b| b.top())
                    })
                    .cloned()
                });
                let Some(section) = next else {
                    return;
                };

                tracing::debug!("SectionNotifier: entering `{}`", section.label);
                state.update(|s| s.show(&section));

                let mut timers = timers.borrow_mut();
                let hide = state.clone();
                timers.hide.set(config.display_ms, move || {
                    tracing::debug!("SectionNotifier: label hidden");
                    hide.update(NotifierState::hide);
                });
                let release = state.clone();
                timers.cooldown.set(config.cooldown_ms, move || {
                    tracing::debug!("SectionNotifier: cooldown over");
                    release.update(NotifierState::end_cooldown);
                });
            })
        };

        Self {
            state,
            timers,
            _subscription: subscription,
        }
    }

    pub fn current(&self) -> NotifierState {
        self.state.get()
    }

    /// Label to display, if any
    pub fn visible_label(&self) -> Option<String> {
        self.state.with(|s| s.visible_label.clone())
    }

    pub fn cooldown_active(&self) -> bool {
        self.state.with(|s| s.cooldown_active)
    }

    /// Whether either timer is still pending
    pub fn has_pending_timers(&self) -> bool {
        let timers = self.timers.borrow();
        timers.hide.is_armed() || timers.cooldown.is_armed()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&NotifierState) + 'static,
    {
        self.state.subscribe(callback)
    }
}
