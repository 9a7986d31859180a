//! Scroll velocity estimation
//!
//! Derives a smoothed speed, a normalized "pressure" in `[0, 1]` and a
//! direction from the scroll signal. Pressure drives effects that intensify
//! with scroll speed (blur, skew, parallax depth).
//!
//! Smoothing is a first-order low-pass filter over the instantaneous speed:
//!
//! ```text
//! raw      = |dp| / max(dt, min_dt)
//! smoothed = smoothed + (raw - smoothed) * alpha
//! pressure = min(smoothed / max_velocity, 1)
//! ```
//!
//! When no sample arrives for `idle_timeout_ms`, the state decays to rest.

use std::cell::RefCell;
use std::rc::Rc;

use glide_animation::{SchedulerHandle, TimerSlot};
use glide_core::{ConfigError, Observable, Subscription};

use crate::signal::{Direction, ScrollSample, ScrollSignal};

/// Low-pass smoothing factor
pub const SMOOTHING_ALPHA: f32 = 0.3;

/// Speed at which pressure saturates, in px/ms
pub const MAX_VELOCITY_PX_PER_MS: f32 = 2.0;

/// Quiet period after which motion is considered over
pub const IDLE_TIMEOUT_MS: f64 = 150.0;

/// Smallest time step used when dividing by elapsed time
pub const MIN_FRAME_DT_MS: f64 = 1.0;

/// Velocity estimator tunables
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityConfig {
    /// Low-pass smoothing factor, in `(0, 1]`
    pub smoothing: f32,
    /// Speed mapped to full pressure (px/ms)
    pub max_velocity: f32,
    /// Quiet period before resetting to idle (ms)
    pub idle_timeout_ms: f64,
    /// Lower bound on the time step (ms)
    pub min_dt_ms: f64,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            smoothing: SMOOTHING_ALPHA,
            max_velocity: MAX_VELOCITY_PX_PER_MS,
            idle_timeout_ms: IDLE_TIMEOUT_MS,
            min_dt_ms: MIN_FRAME_DT_MS,
        }
    }
}

impl VelocityConfig {
    /// Heavier smoothing, for effects that should not flicker
    pub fn gentle() -> Self {
        Self {
            smoothing: 0.15,
            ..Self::default()
        }
    }

    /// Light smoothing, for effects that should follow the finger closely
    pub fn responsive() -> Self {
        Self {
            smoothing: 0.6,
            idle_timeout_ms: 100.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("smoothing", self.smoothing as f64)?;
        ConfigError::check_range("smoothing", self.smoothing as f64, 0.0, 1.0)?;
        ConfigError::check_positive("max_velocity", self.max_velocity as f64)?;
        ConfigError::check_positive("idle_timeout_ms", self.idle_timeout_ms)?;
        ConfigError::check_positive("min_dt_ms", self.min_dt_ms)?;
        Ok(())
    }
}

/// Smoothed scroll motion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    pub last_position: f32,
    pub last_timestamp_ms: f64,
    /// Smoothed speed in px/ms (never negative)
    pub smoothed_velocity: f32,
    /// `smoothed_velocity / max_velocity`, capped at 1
    pub pressure: f32,
    pub direction: Direction,
    /// True between a sample and the following idle timeout
    pub is_active: bool,
}

impl MotionState {
    /// Rest state anchored at `sample`
    pub fn at_rest(sample: &ScrollSample) -> Self {
        Self {
            last_position: sample.position,
            last_timestamp_ms: sample.timestamp_ms,
            smoothed_velocity: 0.0,
            pressure: 0.0,
            direction: Direction::Idle,
            is_active: false,
        }
    }

    /// Fold one sample into the estimate
    pub fn apply(&mut self, sample: &ScrollSample, config: &VelocityConfig) {
        let delta = sample.position - self.last_position;
        let dt = (sample.timestamp_ms - self.last_timestamp_ms).max(config.min_dt_ms);
        let raw = delta.abs() / dt as f32;

        self.smoothed_velocity += (raw - self.smoothed_velocity) * config.smoothing;
        self.smoothed_velocity = self.smoothed_velocity.max(0.0);
        self.pressure = (self.smoothed_velocity / config.max_velocity).clamp(0.0, 1.0);
        self.direction = Direction::from_delta(delta);
        self.is_active = true;

        self.last_position = sample.position;
        self.last_timestamp_ms = sample.timestamp_ms;
    }

    /// Decay to rest, keeping the last position for the next delta
    pub fn settle(&mut self) {
        self.smoothed_velocity = 0.0;
        self.pressure = 0.0;
        self.direction = Direction::Idle;
        self.is_active = false;
    }
}

/// Live velocity estimator attached to a [`ScrollSignal`]
///
/// Dropping the estimator detaches it and cancels the pending idle timer.
pub struct VelocityEstimator {
    state: Observable<MotionState>,
    idle: Rc<RefCell<TimerSlot>>,
    _subscription: Subscription,
}

impl VelocityEstimator {
    pub fn attach(signal: &ScrollSignal, scheduler: SchedulerHandle, config: VelocityConfig) -> Self {
        let state = Observable::new(MotionState::at_rest(&signal.current()));
        let idle = Rc::new(RefCell::new(TimerSlot::new(scheduler)));

        let subscription = {
            let state = state.clone();
            let idle = Rc::clone(&idle);
            signal.subscribe(move |sample| {
                state.update(|s| s.apply(sample, &config));

                let settled = state.clone();
                idle.borrow_mut().set(config.idle_timeout_ms, move || {
                    tracing::trace!("VelocityEstimator: idle");
                    settled.update(MotionState::settle);
                });
            })
        };

        Self {
            state,
            idle,
            _subscription: subscription,
        }
    }

    /// Latest motion state
    pub fn current(&self) -> MotionState {
        self.state.get()
    }

    pub fn pressure(&self) -> f32 {
        self.state.with(|s| s.pressure)
    }

    pub fn direction(&self) -> Direction {
        self.state.with(|s| s.direction)
    }

    pub fn is_active(&self) -> bool {
        self.state.with(|s| s.is_active)
    }

    /// Whether an idle reset is pending
    pub fn is_settling(&self) -> bool {
        self.idle.borrow().is_armed()
    }

    /// Subscribe to motion state changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MotionState) + 'static,
    {
        self.state.subscribe(callback)
    }
}
