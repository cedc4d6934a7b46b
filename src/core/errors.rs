//! Error types for the diagram detection pipeline.
//!
//! Detection itself never fails: an unreadable page or a stage that produces
//! nothing simply yields an empty result. The errors defined here cover the
//! edges of the pipeline, namely configuration loading, image decoding when the
//! caller asks for it explicitly, and writing crops to disk.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::config::ConfigError;

/// Enum representing the errors that can occur around the detection pipeline.
#[derive(Error, Debug)]
pub enum DiagramError {
    /// Error occurred while decoding a page image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred while encoding or writing a cropped diagram.
    #[error("failed to save image to {}", path.display())]
    ImageSave {
        /// Destination that could not be written.
        path: PathBuf,
        /// The underlying encoder error.
        #[source]
        source: image::ImageError,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error while reading or writing JSON.
    #[error("serialization")]
    Serialization(#[from] serde_json::Error),
}

impl DiagramError {
    /// Creates an `InvalidInput` error from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an `ImageSave` error for the given destination.
    pub fn image_save(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageSave {
            path: path.into(),
            source,
        }
    }
}

/// Convenient result alias for diagram operations.
pub type DiagramResult<T> = Result<T, DiagramError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_input_message() {
        let err = DiagramError::invalid_input("page has zero width");
        assert_eq!(err.to_string(), "invalid input: page has zero width");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: DiagramError = ConfigError::InvalidConfig {
            message: "max_detections must be positive".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: max_detections must be positive"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: DiagramError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(err.source().is_some());
    }
}
