//! Utility functions for the diagram pipeline.
//!
//! This module provides page loading, a debugging overlay and logging setup.

pub mod image;
pub mod visualization;

pub use image::{load_image, load_image_from_memory};
pub use visualization::draw_detections;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with an environment filter read
/// from `RUST_LOG` and a formatting layer. It's typically called at the start of
/// an application to enable logging. Calling it again after a subscriber is
/// installed has no effect.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
