//! Host document abstraction
//!
//! The motion layer never touches a real document directly. A host (a browser
//! binding, a native scroll view, or [`MockDocument`](crate::testing::MockDocument)
//! in tests) implements [`DocumentHost`] and forwards its scroll events and
//! animation frames to the motion runtime.
//!
//! Every query degrades gracefully: a missing scroll container reads as
//! `None` (treated as offset 0), and a missing element reads as `None` so
//! callers skip it.

/// Scroll animation behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Instant scroll (no animation)
    #[default]
    Auto,
    /// Smooth animated scroll
    Smooth,
}

/// Options passed to an external smooth-scroll engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollToOptions {
    /// Pixels added to the target's top edge (negative stops above it)
    pub offset: f32,
    /// Animation duration in milliseconds, `None` for the engine default
    pub duration_ms: Option<f64>,
}

/// The document a motion runtime observes and scrolls
///
/// All methods take `&self`: hosts are shared behind `Rc` and use interior
/// mutability for whatever they record.
pub trait DocumentHost {
    /// Current vertical scroll offset, `None` if there is no scroll container
    fn scroll_offset(&self) -> Option<f32>;

    /// Visible height of the scroll container
    fn viewport_height(&self) -> f32;

    /// Total scrollable height of the document
    fn document_height(&self) -> f32;

    /// Bounds of an element in document coordinates
    fn element_bounds(&self, id: &str) -> Option<crate::Bounds>;

    /// Id of the first heading-level descendant of an element
    fn first_heading(&self, id: &str) -> Option<String>;

    /// Scroll the document to an absolute vertical offset
    fn scroll_to(&self, y: f32, behavior: ScrollBehavior);

    /// Add a transient marker (class) to an element
    fn add_marker(&self, id: &str, marker: &str);

    /// Remove a marker from an element
    fn remove_marker(&self, id: &str, marker: &str);

    /// Force a synchronous style/layout flush for an element so a re-added
    /// marker restarts its transition
    fn force_reflow(&self, id: &str);

    /// Ask the host to deliver one animation frame
    fn request_frame(&self);

    /// Attach (`true`) or detach (`false`) the host's single passive scroll
    /// listener
    fn set_scroll_listening(&self, enabled: bool);
}

/// An external smooth-scroll engine (e.g. an inertial scroller)
pub trait SmoothScroller {
    /// Scroll so the element's top edge lands at `options.offset`
    fn scroll_to(&self, element_id: &str, options: ScrollToOptions);
}
