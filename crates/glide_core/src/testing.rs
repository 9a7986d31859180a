//! In-memory document for tests and demos
//!
//! [`MockDocument`] implements [`DocumentHost`] over a table of element bounds
//! and records every side effect the motion layer asks for, so tests can
//! assert on listener registration, layout reads, scrolls and marker toggles.

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;

use crate::geometry::Bounds;
use crate::host::{DocumentHost, ScrollBehavior, ScrollToOptions, SmoothScroller};

/// A marker operation recorded by [`MockDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOp {
    Add(String, String),
    Remove(String, String),
    Reflow(String),
}

#[derive(Debug, Default)]
struct MockState {
    scroll_y: Option<f32>,
    viewport_height: f32,
    document_height: f32,
    elements: FxHashMap<String, Bounds>,
    headings: FxHashMap<String, String>,
    markers: FxHashMap<String, Vec<String>>,
    marker_log: Vec<MarkerOp>,
    scrolls: Vec<(f32, ScrollBehavior)>,
    listening: bool,
    listener_toggles: u32,
}

/// In-memory [`DocumentHost`]
#[derive(Debug)]
pub struct MockDocument {
    state: RefCell<MockState>,
    frame_requests: Cell<u32>,
    layout_reads: Cell<u32>,
}

impl MockDocument {
    /// A document with a scroll container at offset 0
    pub fn new(viewport_height: f32, document_height: f32) -> Self {
        Self {
            state: RefCell::new(MockState {
                scroll_y: Some(0.0),
                viewport_height,
                document_height,
                ..Default::default()
            }),
            frame_requests: Cell::new(0),
            layout_reads: Cell::new(0),
        }
    }

    /// A document without a scroll container
    pub fn without_scroll_container(viewport_height: f32) -> Self {
        let doc = Self::new(viewport_height, viewport_height);
        doc.state.borrow_mut().scroll_y = None;
        doc
    }

    pub fn set_scroll_y(&self, y: f32) {
        self.state.borrow_mut().scroll_y = Some(y);
    }

    pub fn set_viewport_height(&self, height: f32) {
        self.state.borrow_mut().viewport_height = height;
    }

    /// Insert or move an element
    pub fn insert_element(&self, id: &str, bounds: Bounds) {
        self.state
            .borrow_mut()
            .elements
            .insert(id.to_string(), bounds);
    }

    /// Insert a full-width element by top offset and height
    pub fn insert_section(&self, id: &str, top: f32, height: f32) {
        self.insert_element(id, Bounds::vertical(top, height));
    }

    pub fn remove_element(&self, id: &str) {
        self.state.borrow_mut().elements.remove(id);
    }

    /// Declare `heading` as the first heading inside `id`
    pub fn set_heading(&self, id: &str, heading: &str) {
        self.state
            .borrow_mut()
            .headings
            .insert(id.to_string(), heading.to_string());
    }

    pub fn has_marker(&self, id: &str, marker: &str) -> bool {
        self.state
            .borrow()
            .markers
            .get(id)
            .is_some_and(|m| m.iter().any(|x| x == marker))
    }

    pub fn marker_log(&self) -> Vec<MarkerOp> {
        self.state.borrow().marker_log.clone()
    }

    /// Every `scroll_to` issued so far
    pub fn scrolls(&self) -> Vec<(f32, ScrollBehavior)> {
        self.state.borrow().scrolls.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.state.borrow().listening
    }

    /// Number of listener attach/detach transitions
    pub fn listener_toggles(&self) -> u32 {
        self.state.borrow().listener_toggles
    }

    pub fn frame_requests(&self) -> u32 {
        self.frame_requests.get()
    }

    /// Number of scroll offset reads (each one is a forced layout in a browser)
    pub fn layout_reads(&self) -> u32 {
        self.layout_reads.get()
    }
}

impl DocumentHost for MockDocument {
    fn scroll_offset(&self) -> Option<f32> {
        self.layout_reads.set(self.layout_reads.get() + 1);
        self.state.borrow().scroll_y
    }

    fn viewport_height(&self) -> f32 {
        self.state.borrow().viewport_height
    }

    fn document_height(&self) -> f32 {
        self.state.borrow().document_height
    }

    fn element_bounds(&self, id: &str) -> Option<Bounds> {
        self.state.borrow().elements.get(id).copied()
    }

    fn first_heading(&self, id: &str) -> Option<String> {
        self.state.borrow().headings.get(id).cloned()
    }

    fn scroll_to(&self, y: f32, behavior: ScrollBehavior) {
        let mut state = self.state.borrow_mut();
        state.scrolls.push((y, behavior));
        state.scroll_y = Some(y);
    }

    fn add_marker(&self, id: &str, marker: &str) {
        let mut state = self.state.borrow_mut();
        let markers = state.markers.entry(id.to_string()).or_default();
        if !markers.iter().any(|m| m == marker) {
            markers.push(marker.to_string());
        }
        state
            .marker_log
            .push(MarkerOp::Add(id.to_string(), marker.to_string()));
    }

    fn remove_marker(&self, id: &str, marker: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(markers) = state.markers.get_mut(id) {
            markers.retain(|m| m != marker);
        }
        state
            .marker_log
            .push(MarkerOp::Remove(id.to_string(), marker.to_string()));
    }

    fn force_reflow(&self, id: &str) {
        self.state
            .borrow_mut()
            .marker_log
            .push(MarkerOp::Reflow(id.to_string()));
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }

    fn set_scroll_listening(&self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        if state.listening != enabled {
            state.listening = enabled;
            state.listener_toggles += 1;
        }
    }
}

/// A [`SmoothScroller`] that records its calls
#[derive(Debug, Default)]
pub struct RecordingScroller {
    calls: RefCell<Vec<(String, ScrollToOptions)>>,
}

impl RecordingScroller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, ScrollToOptions)> {
        self.calls.borrow().clone()
    }
}

impl SmoothScroller for RecordingScroller {
    fn scroll_to(&self, element_id: &str, options: ScrollToOptions) {
        self.calls
            .borrow_mut()
            .push((element_id.to_string(), options));
    }
}
