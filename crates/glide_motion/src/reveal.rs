//! One-shot reveal on first visibility
//!
//! A [`RevealObserver`] watches one element and flips to revealed the first
//! time at least `threshold` of its height is inside the viewport, with the
//! viewport's bottom edge pulled in by `bottom_margin`. Once revealed it stays
//! revealed and stops observing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glide_core::{ConfigError, Observable, Subscription};

use crate::signal::{ScrollSample, ScrollSignal, SharedHost};

/// Visible fraction that triggers a reveal
pub const REVEAL_THRESHOLD: f32 = 0.15;

/// Adjustment to the viewport's bottom edge (negative shrinks it)
pub const REVEAL_BOTTOM_MARGIN: f32 = -50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Fraction of the element that must be visible, in `[0, 1]`
    pub threshold: f32,
    /// Pixels added to the viewport's bottom edge before intersecting
    pub bottom_margin: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: REVEAL_THRESHOLD,
            bottom_margin: REVEAL_BOTTOM_MARGIN,
        }
    }
}

impl RevealConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.bottom_margin = margin;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_range("threshold", self.threshold as f64, 0.0, 1.0)?;
        ConfigError::check_finite("bottom_margin", self.bottom_margin as f64)
    }
}

/// Reveal latch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealState {
    revealed: bool,
}

impl RevealState {
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Feed one visibility measurement
    ///
    /// Returns `true` only for the check that reveals; every later check
    /// returns `false` whatever the measurement.
    pub fn check(&mut self, visible_fraction: f32, threshold: f32) -> bool {
        if self.revealed {
            return false;
        }
        if visible_fraction > 0.0 && visible_fraction >= threshold {
            self.revealed = true;
            return true;
        }
        false
    }
}

struct RevealInner {
    host: SharedHost,
    element_id: String,
    config: RevealConfig,
    state: RevealState,
    revealed: Observable<bool>,
}

impl RevealInner {
    fn check(&mut self, sample: &ScrollSample) -> bool {
        let Some(bounds) = self.host.element_bounds(&self.element_id) else {
            return false;
        };
        let fraction = sample
            .viewport()
            .visible_fraction(&bounds, self.config.bottom_margin);

        if self.state.check(fraction, self.config.threshold) {
            tracing::debug!(
                "RevealObserver: `{}` revealed at {:.0}% visible",
                self.element_id,
                fraction * 100.0
            );
            return true;
        }
        false
    }
}

/// Live reveal observer for one element
///
/// Missing elements are skipped until they appear. Dropping the observer
/// detaches it from the signal.
pub struct RevealObserver {
    element_id: String,
    revealed: Observable<bool>,
    subscription: Rc<RefCell<Option<Subscription>>>,
}

impl RevealObserver {
    pub fn observe(signal: &ScrollSignal, element_id: impl Into<String>, config: RevealConfig) -> Self {
        let element_id = element_id.into();
        let revealed = Observable::new(false);
        let inner = Rc::new(RefCell::new(RevealInner {
            host: Rc::clone(signal.host()),
            element_id: element_id.clone(),
            config,
            state: RevealState::default(),
            revealed: revealed.clone(),
        }));
        let subscription = Rc::new(RefCell::new(None));

        // Elements already in view reveal without waiting for a scroll
        if fire(&inner, &signal.current()) {
            return Self {
                element_id,
                revealed,
                subscription,
            };
        }

        let slot: Weak<RefCell<Option<Subscription>>> = Rc::downgrade(&subscription);
        let sub = signal.subscribe(move |sample| {
            if fire(&inner, sample) {
                if let Some(slot) = slot.upgrade() {
                    let done = slot.borrow_mut().take();
                    drop(done);
                }
            }
        });
        *subscription.borrow_mut() = Some(sub);

        Self {
            element_id,
            revealed,
            subscription,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.get()
    }

    /// Whether the observer is still listening to the signal
    pub fn is_observing(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Subscribe to the reveal (fires at most once, with `true`)
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&bool) + 'static,
    {
        self.revealed.subscribe(callback)
    }
}

fn fire(inner: &RefCell<RevealInner>, sample: &ScrollSample) -> bool {
    let published = {
        let mut inner = inner.borrow_mut();
        inner.check(sample).then(|| inner.revealed.clone())
    };
    match published {
        Some(revealed) => {
            revealed.set(true);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fires_once() {
        let mut state = RevealState::default();
        assert!(!state.check(0.1, REVEAL_THRESHOLD));
        assert!(state.check(0.2, REVEAL_THRESHOLD));
        assert!(state.is_revealed());

        assert!(!state.check(0.9, REVEAL_THRESHOLD));
        assert!(!state.check(0.0, REVEAL_THRESHOLD));
        assert!(state.is_revealed());
    }

    #[test]
    fn test_exact_threshold_reveals() {
        let mut state = RevealState::default();
        assert!(state.check(0.15, 0.15));
    }

    #[test]
    fn test_zero_threshold_needs_some_visibility() {
        let mut state = RevealState::default();
        assert!(!state.check(0.0, 0.0));
        assert!(state.check(0.01, 0.0));
    }

    #[test]
    fn test_config_validation() {
        assert!(RevealConfig::default().validate().is_ok());
        assert!(RevealConfig::default().with_threshold(1.2).validate().is_err());
        assert!(RevealConfig::default()
            .with_bottom_margin(f32::INFINITY)
            .validate()
            .is_err());
    }
}
