//! Core shared library for the Eventide platform.
//!
//! This crate exposes the primitives every service depends on: the common
//! error type, configuration loading and logging setup.

pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{EventideError, Result as CoreResult};
