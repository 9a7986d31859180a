//! Direction-aware progress fill
//!
//! A bar that fills as an element travels through the viewport. Unlike a
//! plain progress value it only advances in the direction of travel:
//! scrolling down can only grow the fill, scrolling up can only shrink it.
//! The anchor side follows the direction so the bar grows from the left on
//! the way down and retracts toward the right on the way up.
//!
//! The raw ratio is 0 when the element's bottom meets the viewport bottom
//! and 1 when its top meets the viewport top. For elements taller than the
//! viewport the two points swap, and the window runs from the top alignment
//! to the bottom alignment instead.

use std::cell::RefCell;
use std::rc::Rc;

use glide_core::{Bounds, Observable, Subscription, Viewport};

use crate::signal::{Direction, ScrollSample, ScrollSignal, SharedHost};

/// Side the fill grows from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillAnchor {
    #[default]
    Left,
    Right,
}

/// What a renderer needs to draw the fill
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FillOutput {
    /// Fill amount in `[0, 1]`
    pub progress: f32,
    /// Last non-idle direction
    pub direction: Direction,
    pub anchor: FillAnchor,
}

/// Raw pass-through ratio of `bounds` for the given viewport, in `[0, 1]`
pub fn fill_ratio(bounds: &Bounds, viewport: Viewport) -> f32 {
    // Scroll offsets at which each alignment happens
    let bottom_aligned = bounds.bottom() - viewport.height;
    let top_aligned = bounds.top();

    let (start, end) = if top_aligned >= bottom_aligned {
        (bottom_aligned, top_aligned)
    } else {
        (top_aligned, bottom_aligned)
    };

    let span = end - start;
    if span <= f32::EPSILON {
        return if viewport.scroll_y >= start { 1.0 } else { 0.0 };
    }
    ((viewport.scroll_y - start) / span).clamp(0.0, 1.0)
}

/// Monotonic fill state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FillState {
    progress: f32,
    last_direction: Direction,
    last_position: Option<f32>,
}

impl FillState {
    /// Start at zero fill, measuring direction from `position`
    pub fn starting_at(position: f32) -> Self {
        Self {
            last_position: Some(position),
            ..Self::default()
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Track a scroll position without a ratio
    ///
    /// Runs on every sample, including ones where the element is missing, so
    /// the direction of the next ratio is measured against the latest
    /// position rather than the last one the element was seen at.
    pub fn observe_position(&mut self, position: f32) -> Direction {
        let direction = match self.last_position {
            Some(previous) => Direction::from_delta(position - previous),
            None => Direction::Idle,
        };
        self.last_position = Some(position);
        if direction.is_moving() {
            self.last_direction = direction;
        }
        direction
    }

    /// Apply a raw ratio observed while moving in `direction`
    ///
    /// Returns `true` if the progress changed. Progress only follows `raw`
    /// when moving down to a larger value or up to a smaller one; idle
    /// ticks hold.
    pub fn apply_ratio(&mut self, direction: Direction, raw: f32) -> bool {
        if raw.is_nan() {
            return false;
        }
        let raw = raw.clamp(0.0, 1.0);

        let advance = match direction {
            Direction::Down => raw > self.progress,
            Direction::Up => raw < self.progress,
            Direction::Idle => false,
        };
        if advance {
            self.progress = raw;
        }
        advance
    }

    /// Feed a scroll position and its raw ratio
    pub fn update(&mut self, position: f32, raw: f32) -> bool {
        let direction = self.observe_position(position);
        self.apply_ratio(direction, raw)
    }

    pub fn output(&self) -> FillOutput {
        FillOutput {
            progress: self.progress,
            direction: self.last_direction,
            anchor: match self.last_direction {
                Direction::Up => FillAnchor::Right,
                _ => FillAnchor::Left,
            },
        }
    }
}

/// Live directional fill for one element
pub struct DirectionalFill {
    element_id: String,
    output: Observable<FillOutput>,
    _subscription: Subscription,
}

impl DirectionalFill {
    pub fn attach(signal: &ScrollSignal, element_id: impl Into<String>) -> Self {
        let element_id = element_id.into();
        let host: SharedHost = Rc::clone(signal.host());
        let state = Rc::new(RefCell::new(FillState::starting_at(signal.current().position)));
        let output = Observable::new(state.borrow().output());

        let subscription = {
            let id = element_id.clone();
            let output = output.clone();
            signal.subscribe(move |sample: &ScrollSample| {
                let next = {
                    let mut state = state.borrow_mut();
                    let direction = state.observe_position(sample.position);
                    if let Some(bounds) = host.element_bounds(&id) {
                        state.apply_ratio(direction, fill_ratio(&bounds, sample.viewport()));
                    }
                    state.output()
                };
                output.set(next);
            })
        };

        Self {
            element_id,
            output,
            _subscription: subscription,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn current(&self) -> FillOutput {
        self.output.get()
    }

    pub fn progress(&self) -> f32 {
        self.output.with(|o| o.progress)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FillOutput) + 'static,
    {
        self.output.subscribe(callback)
    }
}
