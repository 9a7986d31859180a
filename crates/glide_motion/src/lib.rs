//! Glide Motion
//!
//! Scroll-driven motion orchestration: the reactive layer that turns a
//! document's scroll position into animation state for renderers.
//!
//! # Components
//!
//! - [`ScrollSignal`]: the document's single, frame-coalesced scroll source
//! - [`VelocityEstimator`]: smoothed speed, pressure and direction with idle decay
//! - [`RevealObserver`]: one-shot reveal when an element first becomes visible
//! - [`SectionTracker`]: active section and navigation visibility
//! - [`SectionNotifier`]: brief label when a section is entered, with cooldown
//! - [`DirectionalFill`]: progress bar that only moves with the scroll direction
//! - [`ScrollLinked`]: progress through a target mapped onto transform channels
//! - [`AnchorNavigator`]: smooth scroll to a section with a heading pulse
//!
//! Components are created from a [`MotionRuntime`], publish their output as
//! observable state, and detach from the signal (cancelling their timers)
//! when dropped.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use glide_core::testing::MockDocument;
//! use glide_motion::{MotionRuntime, SectionDescriptor};
//!
//! let doc = Rc::new(MockDocument::new(800.0, 3000.0));
//! doc.insert_section("hero", 0.0, 800.0);
//! doc.insert_section("services", 800.0, 1200.0);
//!
//! let runtime = MotionRuntime::new(doc.clone());
//! let tracker = runtime.section_tracker(vec![
//!     SectionDescriptor::new("hero", "Home"),
//!     SectionDescriptor::new("services", "Services"),
//! ]);
//!
//! doc.set_scroll_y(650.0);
//! runtime.on_scroll_event();
//! runtime.on_frame(16.0);
//!
//! assert_eq!(tracker.current_id().as_deref(), Some("services"));
//! assert!(tracker.nav_visible());
//! ```

pub mod anchor;
pub mod config;
pub mod fill;
pub mod notifier;
pub mod progress;
pub mod reveal;
pub mod runtime;
pub mod section;
pub mod signal;
pub mod velocity;

pub use anchor::{AnchorConfig, AnchorNavigator, Navigation};
pub use config::MotionConfig;
pub use fill::{fill_ratio, DirectionalFill, FillAnchor, FillOutput, FillState};
pub use notifier::{NotifierConfig, NotifierState, SectionNotifier};
pub use progress::{Edge, ProgressTarget, ScrollLinked, ScrollOffset, ScrollProgress, ScrollRange};
pub use reveal::{RevealConfig, RevealObserver, RevealState};
pub use runtime::MotionRuntime;
pub use section::{ActiveSection, SectionConfig, SectionDescriptor, SectionTracker};
pub use signal::{Direction, ScrollSample, ScrollSignal, SharedHost};
pub use velocity::{MotionState, VelocityConfig, VelocityEstimator};

// Re-export the crates components are built from
pub use glide_animation;
pub use glide_core;
