//! Glide Core
//!
//! Foundational primitives shared by the Glide motion crates:
//!
//! - **Host abstraction**: [`DocumentHost`] and [`SmoothScroller`] describe the
//!   document the motion layer measures and scrolls
//! - **Geometry**: document-space [`Bounds`] and the scrolled [`Viewport`]
//! - **Observable state**: [`Observable<T>`] cells that publish derived values
//!   to re-rendering subscribers
//! - **Color**: linear RGBA colors for interpolated color channels
//!
//! Everything here is single-threaded. Hosts deliver scroll events, frames and
//! timer ticks on one thread, so shared state uses `Rc<RefCell<_>>`.
//!
//! # Example
//!
//! ```rust
//! use glide_core::reactive::Observable;
//!
//! let progress = Observable::new(0.0_f32);
//! let _sub = progress.subscribe(|p| println!("progress is now {p}"));
//!
//! progress.set(0.5);
//! assert_eq!(progress.get(), 0.5);
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod host;
pub mod reactive;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use color::Color;
pub use error::ConfigError;
pub use geometry::{Bounds, Viewport};
pub use host::{DocumentHost, ScrollBehavior, ScrollToOptions, SmoothScroller};
pub use reactive::{Observable, Subscription, SubscriptionId};
