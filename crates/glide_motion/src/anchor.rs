//! Anchor navigation
//!
//! Smooth-scrolls to a section by id and pulses the section's first heading
//! so the reader sees where they landed. An external smooth-scroll engine is
//! used when one is installed; otherwise the host's native smooth scroll.
//!
//! Unknown ids are a no-op. A delayed navigation replaces any navigation
//! still waiting, and every pending timer is cancelled when the navigator
//! is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glide_animation::{SchedulerHandle, TimerSlot};
use glide_core::{ConfigError, ScrollBehavior, ScrollToOptions, SmoothScroller};
use rustc_hash::FxHashMap;

use crate::signal::SharedHost;

/// Gap kept above the target when scrolling to it
pub const ANCHOR_OFFSET: f32 = -20.0;

/// How long the heading pulse marker stays on
pub const REVEAL_PULSE_MS: f64 = 700.0;

/// Marker toggled on the heading for the pulse
pub const REVEAL_PULSE_MARKER: &str = "reveal-pulse";

/// Duration requested from an external smooth-scroll engine
pub const SMOOTH_SCROLL_DURATION_MS: f64 = 1200.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorConfig {
    /// Added to the target's top (negative stops above it)
    pub offset: f32,
    pub pulse_ms: f64,
    pub pulse_marker: &'static str,
    /// Passed to the engine, `None` for its own default
    pub scroll_duration_ms: Option<f64>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            offset: ANCHOR_OFFSET,
            pulse_ms: REVEAL_PULSE_MS,
            pulse_marker: REVEAL_PULSE_MARKER,
            scroll_duration_ms: Some(SMOOTH_SCROLL_DURATION_MS),
        }
    }
}

impl AnchorConfig {
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_pulse(mut self, marker: &'static str, pulse_ms: f64) -> Self {
        self.pulse_marker = marker;
        self.pulse_ms = pulse_ms;
        self
    }

    pub fn with_scroll_duration(mut self, duration_ms: Option<f64>) -> Self {
        self.scroll_duration_ms = duration_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("offset", self.offset as f64)?;
        ConfigError::check_positive("pulse_ms", self.pulse_ms)?;
        if let Some(duration) = self.scroll_duration_ms {
            ConfigError::check_positive("scroll_duration_ms", duration)?;
        }
        Ok(())
    }
}

/// Result of [`AnchorNavigator::navigate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// A scroll was issued
    Scrolled,
    /// The navigation will run after the delay
    Scheduled,
    /// No element has that id; nothing happened
    Missing,
}

struct NavigatorCore {
    host: SharedHost,
    scheduler: SchedulerHandle,
    engine: Option<Rc<dyn SmoothScroller>>,
    config: AnchorConfig,
    /// Pulse removal timer per heading
    pulses: RefCell<FxHashMap<String, TimerSlot>>,
}

impl NavigatorCore {
    fn scroll_to(&self, id: &str) -> Navigation {
        let Some(bounds) = self.host.element_bounds(id) else {
            tracing::debug!("AnchorNavigator: no element `{}`, ignoring", id);
            return Navigation::Missing;
        };

        match &self.engine {
            Some(engine) => {
                tracing::debug!("AnchorNavigator: `{}` via smooth-scroll engine", id);
                engine.scroll_to(
                    id,
                    ScrollToOptions {
                        offset: self.config.offset,
                        duration_ms: self.config.scroll_duration_ms,
                    },
                );
            }
            None => {
                let max = (self.host.document_height() - self.host.viewport_height()).max(0.0);
                let y = (bounds.top() + self.config.offset).clamp(0.0, max);
                tracing::debug!("AnchorNavigator: `{}` via native scroll to {:.0}", id, y);
                self.host.scroll_to(y, ScrollBehavior::Smooth);
            }
        }

        if let Some(heading) = self.host.first_heading(id) {
            self.pulse(heading);
        }
        Navigation::Scrolled
    }

    /// Restart the pulse animation on `heading`
    fn pulse(&self, heading: String) {
        let marker = self.config.pulse_marker;

        // Remove and flush first so re-adding restarts the animation
        self.host.remove_marker(&heading, marker);
        self.host.force_reflow(&heading);
        self.host.add_marker(&heading, marker);

        let host = Rc::clone(&self.host);
        let target = heading.clone();
        let mut pulses = self.pulses.borrow_mut();
        pulses
            .entry(heading)
            .or_insert_with(|| TimerSlot::new(self.scheduler.clone()))
            .set(self.config.pulse_ms, move || {
                host.remove_marker(&target, marker);
            });
    }
}

impl Drop for NavigatorCore {
    fn drop(&mut self) {
        // Pulses cut short by teardown still lose their marker
        for (heading, slot) in self.pulses.get_mut().iter_mut() {
            if slot.clear() {
                self.host.remove_marker(heading, self.config.pulse_marker);
            }
        }
    }
}

/// Smooth anchor navigation with a heading pulse
pub struct AnchorNavigator {
    core: Rc<NavigatorCore>,
    pending: RefCell<TimerSlot>,
}

impl AnchorNavigator {
    pub fn new(host: SharedHost, scheduler: SchedulerHandle, config: AnchorConfig) -> Self {
        Self::build(host, scheduler, config, None)
    }

    /// Route scrolls through an external smooth-scroll engine
    pub fn with_engine(
        host: SharedHost,
        scheduler: SchedulerHandle,
        config: AnchorConfig,
        engine: Rc<dyn SmoothScroller>,
    ) -> Self {
        Self::build(host, scheduler, config, Some(engine))
    }

    fn build(
        host: SharedHost,
        scheduler: SchedulerHandle,
        config: AnchorConfig,
        engine: Option<Rc<dyn SmoothScroller>>,
    ) -> Self {
        Self {
            core: Rc::new(NavigatorCore {
                host,
                scheduler: scheduler.clone(),
                engine,
                config,
                pulses: RefCell::new(FxHashMap::default()),
            }),
            pending: RefCell::new(TimerSlot::new(scheduler)),
        }
    }

    pub fn has_engine(&self) -> bool {
        self.core.engine.is_some()
    }

    /// Navigate to the element `id`
    ///
    /// With a positive `delay_ms` the navigation is scheduled, replacing any
    /// navigation still waiting. Otherwise it runs now and cancels a waiting
    /// one.
    pub fn navigate(&self, id: &str, delay_ms: Option<f64>) -> Navigation {
        match delay_ms {
            Some(delay) if delay > 0.0 => {
                let core: Weak<NavigatorCore> = Rc::downgrade(&self.core);
                let id = id.to_string();
                self.pending.borrow_mut().set(delay, move || {
                    if let Some(core) = core.upgrade() {
                        core.scroll_to(&id);
                    }
                });
                Navigation::Scheduled
            }
            _ => {
                self.pending.borrow_mut().clear();
                self.core.scroll_to(id)
            }
        }
    }

    /// Whether a delayed navigation is waiting
    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_armed()
    }

    /// Drop a waiting delayed navigation
    pub fn cancel_pending(&self) -> bool {
        self.pending.borrow_mut().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnchorConfig::default();
        assert_eq!(config.offset, -20.0);
        assert_eq!(config.pulse_ms, 700.0);
        assert_eq!(config.pulse_marker, "reveal-pulse");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = AnchorConfig {
            scroll_duration_ms: Some(0.0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = AnchorConfig {
            pulse_ms: f64::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
