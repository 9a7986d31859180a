//! Active section tracking
//!
//! Given an ordered list of page sections, tracks which one the reader is
//! in: the last section whose top has crossed `scroll_y + lookahead`. Also
//! exposes whether the navigation chrome should be shown, which happens once
//! the page has scrolled past `nav_reveal_distance`.

use std::rc::Rc;

use glide_core::{ConfigError, DocumentHost, Observable, Subscription};

use crate::signal::{ScrollSample, ScrollSignal, SharedHost};

/// Distance below the viewport top at which a section counts as entered
pub const SECTION_LOOKAHEAD: f32 = 200.0;

/// Scroll offset past which the navigation is shown
pub const NAV_REVEAL_DISTANCE: f32 = 200.0;

/// A page section, in document order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub id: String,
    pub label: String,
}

impl SectionDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionConfig {
    pub lookahead: f32,
    pub nav_reveal_distance: f32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            lookahead: SECTION_LOOKAHEAD,
            nav_reveal_distance: NAV_REVEAL_DISTANCE,
        }
    }
}

impl SectionConfig {
    pub fn with_lookahead(mut self, lookahead: f32) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_nav_reveal_distance(mut self, distance: f32) -> Self {
        self.nav_reveal_distance = distance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("lookahead", self.lookahead as f64)?;
        ConfigError::check_range(
            "nav_reveal_distance",
            self.nav_reveal_distance as f64,
            0.0,
            f64::MAX,
        )
    }
}

/// Which section is active and whether the navigation is visible
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveSection {
    /// `None` only when there are no sections
    pub current_id: Option<String>,
    pub nav_visible: bool,
}

/// Pick the active section
///
/// Sections are scanned in order and the last one whose top is at or above
/// `scroll_y + lookahead` wins. Sections whose top cannot be measured are
/// skipped. Before any section is crossed the first section is active.
pub fn find_active<'a, F>(
    sections: &'a [SectionDescriptor],
    scroll_y: f32,
    lookahead: f32,
    top_of: F,
) -> Option<&'a SectionDescriptor>
where
    F: Fn(&str) -> Option<f32>,
{
    let line = scroll_y + lookahead;
    sections
        .iter()
        .filter(|s| top_of(&s.id).is_some_and(|top| top <= line))
        .last()
        .or_else(|| sections.first())
}

/// Compute the full tracker output for one scroll position
pub fn compute_active(
    host: &dyn DocumentHost,
    sections: &[SectionDescriptor],
    scroll_y: f32,
    config: &SectionConfig,
) -> ActiveSection {
    let current = find_active(sections, scroll_y, config.lookahead, |id| {
        host.element_bounds(id).map(|b| b.top())
    });

    ActiveSection {
        current_id: current.map(|s| s.id.clone()),
        nav_visible: scroll_y > config.nav_reveal_distance,
    }
}

/// Live section tracker attached to a [`ScrollSignal`]
pub struct SectionTracker {
    sections: Rc<[SectionDescriptor]>,
    state: Observable<ActiveSection>,
    _subscription: Subscription,
}

impl SectionTracker {
    pub fn attach(
        signal: &ScrollSignal,
        sections: impl Into<Vec<SectionDescriptor>>,
        config: SectionConfig,
    ) -> Self {
        let sections: Rc<[SectionDescriptor]> = sections.into().into();
        let host: SharedHost = Rc::clone(signal.host());

        let initial = compute_active(&*host, &sections, signal.current().position, &config);
        let state = Observable::new(initial);

        let subscription = {
            let sections = Rc::clone(&sections);
            let state = state.clone();
            signal.subscribe(move |sample: &ScrollSample| {
                let next = compute_active(&*host, &sections, sample.position, &config);
                let previous = state.with(|s| s.current_id.clone());
                if previous != next.current_id {
                    tracing::debug!(
                        "SectionTracker: active section {:?} -> {:?}",
                        previous,
                        next.current_id
                    );
                }
                state.set(next);
            })
        };

        Self {
            sections,
            state,
            _subscription: subscription,
        }
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn current(&self) -> ActiveSection {
        self.state.get()
    }

    pub fn current_id(&self) -> Option<String> {
        self.state.with(|s| s.current_id.clone())
    }

    /// The active section's descriptor
    pub fn current_section(&self) -> Option<&SectionDescriptor> {
        let id = self.current_id()?;
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn nav_visible(&self) -> bool {
        self.state.with(|s| s.nav_visible)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ActiveSection) + 'static,
    {
        self.state.subscribe(callback)
    }
}
