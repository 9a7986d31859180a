//! Glide Animation System
//!
//! Timing and interpolation primitives for scroll-driven motion.
//!
//! # Features
//!
//! - **Timer Scheduler**: host-clocked, cancellable deferred callbacks with
//!   weak handles and single-timer slots
//! - **Interpolation Ranges**: piecewise-linear, clamped mapping tables for
//!   numbers and colors
//! - **Scroll Transforms**: many named channels with independent domains,
//!   including text channels composed from numeric ones

pub mod interpolate;
pub mod scheduler;
pub mod transform;

pub use interpolate::{remap, Interpolate, InterpolationRange, RangeError};
pub use scheduler::{
    SchedulerHandle, TimerCallback, TimerId, TimerScheduler, TimerSlot, WakeCallback,
};
pub use transform::{
    ChannelValue, CompositeFormat, ScrollTransform, ScrollTransformBuilder, TransformError,
    TransformOutput,
};
