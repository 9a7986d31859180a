//! Multi-channel scroll transforms
//!
//! A [`ScrollTransform`] maps one progress value to several named output
//! channels at once. Each channel has its own domain, so opacity can ramp over
//! `[0, 0.25]` while a vertical offset ramps over the whole `[0, 1]`. Text
//! channels are composed from numeric channels evaluated in the same pass,
//! e.g. a CSS filter built from an interpolated blur and brightness.
//!
//! ```rust
//! use glide_animation::transform::ScrollTransform;
//!
//! let transform = ScrollTransform::builder()
//!     .number("opacity", [0.0, 0.25], [0.0, 1.0])
//!     .number("y", [0.0, 1.0], [60.0, -60.0])
//!     .number("blur", [0.0, 0.3], [8.0, 0.0])
//!     .number("brightness", [0.0, 0.3], [0.6, 1.0])
//!     .composite("filter", ["blur", "brightness"], |v| {
//!         format!("blur({:.1}px) brightness({:.2})", v[0], v[1])
//!     })
//!     .build()
//!     .unwrap();
//!
//! let out = transform.evaluate(0.5);
//! assert_eq!(out.number("opacity"), Some(1.0));
//! assert_eq!(out.text("filter"), Some("blur(0.0px) brightness(1.00)"));
//! ```

use std::fmt;
use std::rc::Rc;

use glide_core::Color;
use smallvec::SmallVec;
use thiserror::Error;

use crate::interpolate::{InterpolationRange, RangeError};

/// Formatter for a composite text channel
pub type CompositeFormat = Rc<dyn Fn(&[f32]) -> String>;

/// Value of one output channel
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelValue {
    Number(f32),
    Color(Color),
    Text(String),
}

impl ChannelValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ChannelValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ChannelValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChannelValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Why a transform could not be built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("channel `{channel}`: {source}")]
    InvalidRange {
        channel: String,
        #[source]
        source: RangeError,
    },

    #[error("channel `{0}` is defined twice")]
    DuplicateChannel(String),

    #[error("composite `{channel}` reads unknown channel `{input}`")]
    UnknownInput { channel: String, input: String },

    #[error("composite `{channel}` reads `{input}`, which is not numeric")]
    NonNumericInput { channel: String, input: String },
}

enum Channel {
    Number(InterpolationRange<f32>),
    Color(InterpolationRange<Color>),
    Composite {
        /// Indices of numeric channels, in formatter argument order
        inputs: SmallVec<[usize; 4]>,
        format: CompositeFormat,
    },
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Number(range) => f.debug_tuple("Number").field(range).finish(),
            Channel::Color(range) => f.debug_tuple("Color").field(range).finish(),
            Channel::Composite { inputs, .. } => f
                .debug_struct("Composite")
                .field("inputs", inputs)
                .finish_non_exhaustive(),
        }
    }
}

/// A set of named channels driven by one progress value
#[derive(Debug, Clone)]
pub struct ScrollTransform {
    names: Rc<[String]>,
    channels: Rc<[Channel]>,
}

impl ScrollTransform {
    pub fn builder() -> ScrollTransformBuilder {
        ScrollTransformBuilder::default()
    }

    /// Channel names in definition order
    pub fn channel_names(&self) -> &[String] {
        &self.names
    }

    /// Evaluate every channel at `progress`
    ///
    /// Pure: the same input always yields the same output. Out-of-range
    /// inputs clamp at each channel's own domain.
    pub fn evaluate(&self, progress: f32) -> TransformOutput {
        let mut values: Vec<ChannelValue> = self
            .channels
            .iter()
            .map(|channel| match channel {
                Channel::Number(range) => ChannelValue::Number(range.sample(progress)),
                Channel::Color(range) => ChannelValue::Color(range.sample(progress)),
                // Filled in the second pass
                Channel::Composite { .. } => ChannelValue::Text(String::new()),
            })
            .collect();

        for (i, channel) in self.channels.iter().enumerate() {
            if let Channel::Composite { inputs, format } = channel {
                let args: SmallVec<[f32; 4]> = inputs
                    .iter()
                    .map(|&idx| values[idx].as_number().unwrap_or(0.0))
                    .collect();
                values[i] = ChannelValue::Text(format(&args));
            }
        }

        TransformOutput {
            names: Rc::clone(&self.names),
            values,
        }
    }
}

enum PendingChannel {
    Number(Vec<f32>, Vec<f32>),
    Color(Vec<f32>, Vec<Color>),
    Composite(Vec<String>, CompositeFormat),
}

/// Builder for [`ScrollTransform`]
///
/// Tables are validated in [`build`](Self::build), which reports the first
/// invalid channel.
#[derive(Default)]
pub struct ScrollTransformBuilder {
    pending: Vec<(String, PendingChannel)>,
}

impl ScrollTransformBuilder {
    /// Add a numeric channel
    pub fn number(
        mut self,
        name: impl Into<String>,
        domain: impl Into<Vec<f32>>,
        values: impl Into<Vec<f32>>,
    ) -> Self {
        self.pending.push((
            name.into(),
            PendingChannel::Number(domain.into(), values.into()),
        ));
        self
    }

    /// Add a color channel
    pub fn color(
        mut self,
        name: impl Into<String>,
        domain: impl Into<Vec<f32>>,
        values: impl Into<Vec<Color>>,
    ) -> Self {
        self.pending.push((
            name.into(),
            PendingChannel::Color(domain.into(), values.into()),
        ));
        self
    }

    /// Add a text channel computed from numeric channels
    ///
    /// `format` receives the input channel values in the order given.
    pub fn composite<I, S, F>(mut self, name: impl Into<String>, inputs: I, format: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[f32]) -> String + 'static,
    {
        let inputs = inputs.into_iter().map(Into::into).collect();
        self.pending.push((
            name.into(),
            PendingChannel::Composite(inputs, Rc::new(format)),
        ));
        self
    }

    pub fn build(self) -> Result<ScrollTransform, TransformError> {
        let mut names: Vec<String> = Vec::with_capacity(self.pending.len());
        for (name, _) in &self.pending {
            if names.contains(name) {
                return Err(TransformError::DuplicateChannel(name.clone()));
            }
            names.push(name.clone());
        }

        let is_numeric: Vec<bool> = self
            .pending
            .iter()
            .map(|(_, p)| matches!(p, PendingChannel::Number(..)))
            .collect();

        let mut channels = Vec::with_capacity(self.pending.len());
        for (name, pending) in self.pending {
            let invalid = |source| TransformError::InvalidRange {
                channel: name.clone(),
                source,
            };

            let channel = match pending {
                PendingChannel::Number(domain, values) => {
                    Channel::Number(InterpolationRange::new(domain, values).map_err(invalid)?)
                }
                PendingChannel::Color(domain, values) => {
                    Channel::Color(InterpolationRange::new(domain, values).map_err(invalid)?)
                }
                PendingChannel::Composite(inputs, format) => {
                    let mut indices = SmallVec::new();
                    for input in inputs {
                        let idx = names.iter().position(|n| *n == input).ok_or_else(|| {
                            TransformError::UnknownInput {
                                channel: name.clone(),
                                input: input.clone(),
                            }
                        })?;
                        if !is_numeric[idx] {
                            return Err(TransformError::NonNumericInput {
                                channel: name,
                                input,
                            });
                        }
                        indices.push(idx);
                    }
                    Channel::Composite {
                        inputs: indices,
                        format,
                    }
                }
            };
            channels.push(channel);
        }

        Ok(ScrollTransform {
            names: names.into(),
            channels: channels.into(),
        })
    }
}

/// The channel values produced by one [`ScrollTransform::evaluate`]
#[derive(Clone, Debug, PartialEq)]
pub struct TransformOutput {
    names: Rc<[String]>,
    values: Vec<ChannelValue>,
}

impl TransformOutput {
    pub fn get(&self, name: &str) -> Option<&ChannelValue> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(ChannelValue::as_number)
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(ChannelValue::as_color)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ChannelValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelValue)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
