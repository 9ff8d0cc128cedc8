//! Scan configuration and environment parsing.
//!
//! A [`ScanContext`](crate::ScanContext) may leave the cursor type as
//! [`CursorType::Default`]. Factories then fall back to the process-level
//! [`ScanConfig::default_cursor_type`].
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TSDB_DEFAULT_CURSOR_TYPE` | Protocol used when a scan does not choose one (`array`, `batch`) | `array` |
//!
//! # Example
//!
//! ```rust
//! use tsdb_cursor::{CursorType, config::ScanConfig};
//! use std::env;
//!
//! unsafe {
//!     env::set_var("TSDB_DEFAULT_CURSOR_TYPE", "batch");
//! }
//! let config = ScanConfig::from_env().unwrap();
//! assert_eq!(config.default_cursor_type(), CursorType::Batch);
//! # unsafe { env::remove_var("TSDB_DEFAULT_CURSOR_TYPE"); }
//! ```

use crate::CursorType;
use std::env;
use thiserror::Error;

/// Environment variable name for the fallback cursor type.
pub const ENV_DEFAULT_CURSOR_TYPE: &str = "TSDB_DEFAULT_CURSOR_TYPE";

/// Process-level scan configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    default_cursor_type: CursorType,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfig {
    /// Create a configuration that falls back to the array protocol.
    pub const fn new() -> Self {
        Self { default_cursor_type: CursorType::Array }
    }

    /// Load configuration from environment variables.
    ///
    /// A missing variable keeps the built-in default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCursorType`] if the variable cannot be
    /// parsed, or [`ConfigError::UnresolvedDefault`] if it is set to
    /// `default`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(ENV_DEFAULT_CURSOR_TYPE) {
            Ok(value) => Self::new().with_default_cursor_type(value.parse()?),
            Err(_) => Ok(Self::new()),
        }
    }

    /// Set the fallback cursor type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedDefault`] for [`CursorType::Default`],
    /// which cannot be its own fallback.
    pub const fn with_default_cursor_type(
        mut self,
        cursor_type: CursorType,
    ) -> Result<Self, ConfigError> {
        if matches!(cursor_type, CursorType::Default) {
            return Err(ConfigError::UnresolvedDefault);
        }
        self.default_cursor_type = cursor_type;
        Ok(self)
    }

    /// The cursor type used when a scan requests [`CursorType::Default`].
    pub const fn default_cursor_type(&self) -> CursorType {
        self.default_cursor_type
    }

    /// Resolve the cursor type requested by a scan against this
    /// configuration.
    pub const fn resolve(&self, requested: CursorType) -> CursorType {
        requested.resolve(self.default_cursor_type)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid cursor type string.
    #[error("invalid cursor type: {0} (expected: array, batch, default)")]
    InvalidCursorType(String),

    /// `default` was configured as the fallback cursor type.
    #[error("the fallback cursor type must be array or batch")]
    UnresolvedDefault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_array() {
        assert_eq!(ScanConfig::default().default_cursor_type(), CursorType::Array);
        assert_eq!(ScanConfig::default().resolve(CursorType::Default), CursorType::Array);
        assert_eq!(ScanConfig::default().resolve(CursorType::Batch), CursorType::Batch);
    }

    #[test]
    fn rejects_default_fallback() {
        assert!(ScanConfig::new().with_default_cursor_type(CursorType::Default).is_err());
    }

    #[test]
    fn from_env() {
        // SAFETY: Test environment, single-threaded test execution
        unsafe {
            env::remove_var(ENV_DEFAULT_CURSOR_TYPE);
        }
        assert_eq!(ScanConfig::from_env().unwrap(), ScanConfig::new());

        // SAFETY: Test environment, single-threaded test execution
        unsafe {
            env::set_var(ENV_DEFAULT_CURSOR_TYPE, "batch");
        }
        assert_eq!(ScanConfig::from_env().unwrap().default_cursor_type(), CursorType::Batch);

        // SAFETY: Test environment, single-threaded test execution
        unsafe {
            env::set_var(ENV_DEFAULT_CURSOR_TYPE, "bogus");
        }
        assert!(matches!(ScanConfig::from_env(), Err(ConfigError::InvalidCursorType(_))));

        // SAFETY: Test environment, single-threaded test execution
        unsafe {
            env::set_var(ENV_DEFAULT_CURSOR_TYPE, "default");
        }
        assert!(matches!(ScanConfig::from_env(), Err(ConfigError::UnresolvedDefault)));

        // SAFETY: Test environment, single-threaded test execution
        unsafe {
            env::remove_var(ENV_DEFAULT_CURSOR_TYPE);
        }
    }
}
