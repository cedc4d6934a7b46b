//! Configuration validation shared by every pipeline stage.
//!
//! The stage structs themselves carry their tunables; this module only defines
//! the error type and the [`ConfigValidator`] trait used to check them.

pub mod errors;

pub use errors::{ConfigError, ConfigValidator};
