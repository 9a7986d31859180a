//! Scroll-linked progress and transforms
//!
//! [`ScrollProgress`] measures how far the reader has scrolled through a
//! target, either the whole document or one element between two
//! element/viewport edge alignments. The value is *not* clamped: it runs
//! below 0 before the range and above 1 after it, and the interpolation
//! tables downstream clamp their own output.
//!
//! [`ScrollLinked`] binds a progress source to a
//! [`ScrollTransform`](glide_animation::ScrollTransform) and publishes the
//! evaluated channels every frame.
//!
//! # Example
//!
//! ```rust
//! use glide_motion::progress::{Edge, ScrollOffset, ScrollProgress, ScrollRange};
//!
//! // 0 when the hero's top is at the viewport top,
//! // 1 when its bottom is at the viewport top
//! let hero = ScrollProgress::element("hero").with_range(ScrollRange::new(
//!     ScrollOffset::new(Edge::Start, Edge::Start),
//!     ScrollOffset::new(Edge::End, Edge::Start),
//! ));
//! # let _ = hero;
//! ```

use std::rc::Rc;

use glide_animation::{ScrollTransform, TransformOutput};
use glide_core::{Bounds, DocumentHost, Observable, Subscription};

use crate::signal::{ScrollSample, ScrollSignal, SharedHost};

/// An edge of the element or the viewport
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Top edge
    Start,
    Center,
    /// Bottom edge
    End,
}

impl Edge {
    /// Position of the edge as a fraction of the box height
    pub fn fraction(&self) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => 0.5,
            Edge::End => 1.0,
        }
    }
}

/// "When `element` edge meets `viewport` edge"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollOffset {
    pub element: Edge,
    pub viewport: Edge,
}

impl ScrollOffset {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the alignment happens
    pub fn scroll_position(&self, bounds: &Bounds, viewport_height: f32) -> f32 {
        bounds.top() + bounds.height * self.element.fraction()
            - viewport_height * self.viewport.fraction()
    }
}

/// The alignments mapped to progress 0 and 1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRange {
    pub start: ScrollOffset,
    pub end: ScrollOffset,
}

impl ScrollRange {
    pub const fn new(start: ScrollOffset, end: ScrollOffset) -> Self {
        Self { start, end }
    }

    /// From the element entering at the bottom to leaving at the top
    pub const fn enter_exit() -> Self {
        Self::new(
            ScrollOffset::new(Edge::Start, Edge::End),
            ScrollOffset::new(Edge::End, Edge::Start),
        )
    }

    /// While the element's top travels from the viewport bottom to its top
    pub const fn entering() -> Self {
        Self::new(
            ScrollOffset::new(Edge::Start, Edge::End),
            ScrollOffset::new(Edge::Start, Edge::Start),
        )
    }

    /// While the element scrolls out past the viewport top
    pub const fn exiting() -> Self {
        Self::new(
            ScrollOffset::new(Edge::Start, Edge::Start),
            ScrollOffset::new(Edge::End, Edge::Start),
        )
    }
}

impl Default for ScrollRange {
    fn default() -> Self {
        Self::enter_exit()
    }
}

/// What a progress source measures
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressTarget {
    /// Scroll offset over the scrollable height
    Document,
    /// One element over a [`ScrollRange`]
    Element(String),
}

/// Progress through an element's range, unclamped
///
/// A zero-length range acts as a step at its position.
pub fn element_progress(bounds: &Bounds, sample: &ScrollSample, range: &ScrollRange) -> f32 {
    let start = range.start.scroll_position(bounds, sample.viewport_height);
    let end = range.end.scroll_position(bounds, sample.viewport_height);
    let span = end - start;
    if span.abs() <= f32::EPSILON {
        return if sample.position >= start { 1.0 } else { 0.0 };
    }
    (sample.position - start) / span
}

/// Progress through the whole document, unclamped
///
/// Documents that do not scroll read as 0.
pub fn document_progress(scroll_y: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    scroll_y / scrollable
}

/// A progress source
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollProgress {
    target: ProgressTarget,
    range: ScrollRange,
}

impl ScrollProgress {
    pub fn document() -> Self {
        Self {
            target: ProgressTarget::Document,
            range: ScrollRange::default(),
        }
    }

    pub fn element(id: impl Into<String>) -> Self {
        Self {
            target: ProgressTarget::Element(id.into()),
            range: ScrollRange::default(),
        }
    }

    /// Range used for element targets
    pub fn with_range(mut self, range: ScrollRange) -> Self {
        self.range = range;
        self
    }

    pub fn target(&self) -> &ProgressTarget {
        &self.target
    }

    pub fn range(&self) -> &ScrollRange {
        &self.range
    }

    /// Measure progress for `sample`, `None` if the target element is missing
    pub fn measure(&self, host: &dyn DocumentHost, sample: &ScrollSample) -> Option<f32> {
        match &self.target {
            ProgressTarget::Document => Some(document_progress(
                sample.position,
                host.document_height(),
                sample.viewport_height,
            )),
            ProgressTarget::Element(id) => {
                let bounds = host.element_bounds(id)?;
                Some(element_progress(&bounds, sample, &self.range))
            }
        }
    }
}

/// Transform channels driven by a progress source
///
/// Publishes both the raw progress and the evaluated channels. Frames where
/// the target element is missing keep the previous values.
pub struct ScrollLinked {
    progress: Observable<f32>,
    output: Observable<TransformOutput>,
    _subscription: Subscription,
}

impl ScrollLinked {
    pub fn attach(signal: &ScrollSignal, source: ScrollProgress, transform: ScrollTransform) -> Self {
        let host: SharedHost = Rc::clone(signal.host());
        let initial = source.measure(&*host, &signal.current()).unwrap_or(0.0);
        let progress = Observable::new(initial);
        let output = Observable::new(transform.evaluate(initial));

        let subscription = {
            let progress = progress.clone();
            let output = output.clone();
            signal.subscribe(move |sample| {
                let Some(value) = source.measure(&*host, sample) else {
                    return;
                };
                if progress.set(value) {
                    output.set(transform.evaluate(value));
                }
            })
        };

        Self {
            progress,
            output,
            _subscription: subscription,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    pub fn current(&self) -> TransformOutput {
        self.output.get()
    }

    /// Read a numeric channel
    pub fn number(&self, channel: &str) -> Option<f32> {
        self.output.with(|o| o.number(channel))
    }

    /// Read a text channel
    pub fn text(&self, channel: &str) -> Option<String> {
        self.output.with(|o| o.text(channel).map(str::to_owned))
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TransformOutput) + 'static,
    {
        self.output.subscribe(callback)
    }
}
