//! Configuration errors
//!
//! Runtime geometry never fails in Glide: missing elements are skipped and
//! degenerate inputs are clamped. The only errors are tunables rejected when a
//! component or runtime is constructed.

use thiserror::Error;

/// A tunable that failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
}

impl ConfigError {
    /// Check that `value` is finite and inside `min..=max`
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { field });
        }
        if value < min || value > max {
            return Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Check that `value` is finite and strictly positive
    pub fn check_positive(field: &'static str, value: f64) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { field });
        }
        if value <= 0.0 {
            return Err(Self::NonPositive { field, value });
        }
        Ok(())
    }

    /// Check that `value` is finite (any sign)
    pub fn check_finite(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NonFinite { field })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_check() {
        assert!(ConfigError::check_range("threshold", 0.15, 0.0, 1.0).is_ok());
        assert_eq!(
            ConfigError::check_range("threshold", 1.5, 0.0, 1.0),
            Err(ConfigError::OutOfRange {
                field: "threshold",
                value: 1.5,
                min: 0.0,
                max: 1.0
            })
        );
        assert_eq!(
            ConfigError::check_range("threshold", f64::NAN, 0.0, 1.0),
            Err(ConfigError::NonFinite { field: "threshold" })
        );
    }

    #[test]
    fn test_positive_check() {
        assert!(ConfigError::check_positive("idle_ms", 150.0).is_ok());
        assert!(matches!(
            ConfigError::check_positive("idle_ms", 0.0),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::NonPositive {
            field: "cooldown_ms",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "cooldown_ms must be positive, got -1");
    }
}
