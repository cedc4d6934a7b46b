//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// A trait for validating configuration parameters.
///
/// Stage configurations implement [`validate`](ConfigValidator::validate) and
/// get range checks for the common shapes of tunables (ratios, kernel sizes)
/// from the provided helper methods.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a fraction lies in `[0.0, 1.0]`.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name used in the error message.
    /// * `value` - The fraction to validate.
    fn validate_ratio(&self, name: &str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must be between 0.0 and 1.0, got {value}"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a value is finite and strictly positive.
    fn validate_positive(&self, name: &str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must be positive, got {value}"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a `[low, high]` range.
    fn validate_range(&self, name: &str, low: f64, high: f64) -> Result<(), ConfigError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} range is empty: [{low}, {high}]"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a structuring-element or window size.
    fn validate_kernel(&self, name: &str, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} kernel must be non-empty, got {width}x{height}"),
            })
        } else {
            Ok(())
        }
    }
}
