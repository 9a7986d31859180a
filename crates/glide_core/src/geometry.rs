//! Document-space geometry
//!
//! All positions are measured from the top of the scrollable document, not
//! from the viewport. The viewport is a window `[scroll_y, scroll_y + height]`
//! sliding over that space.

/// Element bounds in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// X position (absolute, after layout)
    pub x: f32,
    /// Y position (absolute, after layout)
    pub y: f32,
    /// Computed width
    pub width: f32,
    /// Computed height
    pub height: f32,
}

impl Bounds {
    /// Create new bounds
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full-width bounds from a top offset and height
    pub fn vertical(top: f32, height: f32) -> Self {
        Self::new(0.0, top, 0.0, height)
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// The visible window over the document
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Current vertical scroll offset
    pub scroll_y: f32,
    /// Visible height
    pub height: f32,
}

impl Viewport {
    pub fn new(scroll_y: f32, height: f32) -> Self {
        Self { scroll_y, height }
    }

    pub fn top(&self) -> f32 {
        self.scroll_y
    }

    pub fn bottom(&self) -> f32 {
        self.scroll_y + self.height
    }

    /// Vertical point at `ratio` of the viewport height (0.5 = middle)
    pub fn line_at(&self, ratio: f32) -> f32 {
        self.scroll_y + self.height * ratio
    }

    /// Fraction of `bounds` height inside the viewport.
    ///
    /// `bottom_margin` grows (positive) or shrinks (negative) the bottom edge
    /// of the viewport before intersecting, like an intersection root margin.
    /// Zero-height elements count as fully visible when their top lies inside.
    pub fn visible_fraction(&self, bounds: &Bounds, bottom_margin: f32) -> f32 {
        let top = self.top();
        let bottom = self.bottom() + bottom_margin;
        if bottom <= top {
            return 0.0;
        }

        if bounds.height <= 0.0 {
            return if bounds.top() >= top && bounds.top() <= bottom {
                1.0
            } else {
                0.0
            };
        }

        let visible = bounds.bottom().min(bottom) - bounds.top().max(top);
        (visible / bounds.height).clamp(0.0, 1.0)
    }
}
