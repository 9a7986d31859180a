//! Runtime configuration
//!
//! [`MotionConfig`] gathers the tunables of every component. Each field
//! defaults to the reference constants, and [`MotionConfig::validate`]
//! rejects values no component could work with.

use glide_core::ConfigError;

use crate::anchor::AnchorConfig;
use crate::notifier::NotifierConfig;
use crate::reveal::RevealConfig;
use crate::section::SectionConfig;
use crate::velocity::VelocityConfig;

/// Tunables for a [`MotionRuntime`](crate::MotionRuntime)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionConfig {
    pub velocity: VelocityConfig,
    pub reveal: RevealConfig,
    pub section: SectionConfig,
    pub notifier: NotifierConfig,
    pub anchor: AnchorConfig,
}

impl MotionConfig {
    pub fn with_velocity(mut self, velocity: VelocityConfig) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_reveal(mut self, reveal: RevealConfig) -> Self {
        self.reveal = reveal;
        self
    }

    pub fn with_section(mut self, section: SectionConfig) -> Self {
        self.section = section;
        self
    }

    pub fn with_notifier(mut self, notifier: NotifierConfig) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorConfig) -> Self {
        self.anchor = anchor;
        self
    }

    /// Check every component's tunables
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.velocity.validate()?;
        self.reveal.validate()?;
        self.section.validate()?;
        self.notifier.validate()?;
        self.anchor.validate()
    }
}
