//! Shard collaborator contract.
//!
//! The cursor layer does not know how shards store data. It only asks each
//! shard for a [`CursorIterator`] and reacts to the shard's error
//! classification: [`ErrorClass::Recoverable`] errors mean the shard is
//! legitimately unavailable and can be left out of a scan, while
//! [`ErrorClass::Fatal`] errors fail the scan.

use crate::{CursorIterator, ScanContext};

/// Result type alias for shard operations.
pub type ShardResult<T, E = ShardError> = Result<T, E>;

/// How the fan-out builder should react to a [`ShardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The shard is unavailable for a benign reason. Omit it.
    Recoverable,
    /// The shard failed. Abort the build.
    Fatal,
}

/// Error type for shard operations.
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
    /// The shard's storage engine has been closed, typically because the
    /// shard was removed after the query was planned.
    #[error("engine is closed")]
    EngineClosed,

    /// The shard is disabled and does not serve reads.
    #[error("shard is disabled")]
    ShardDisabled,

    /// An error occurred in the storage backend.
    #[error("backend error: {0}")]
    Backend(#[from] Box<dyn core::error::Error + Send + Sync + 'static>),
}

impl ShardError {
    /// Create a new backend error from any error type.
    pub fn backend<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }

    /// Classify the error.
    pub const fn classify(&self) -> ErrorClass {
        match self {
            Self::EngineClosed | Self::ShardDisabled => ErrorClass::Recoverable,
            Self::Backend(_) => ErrorClass::Fatal,
        }
    }

    /// Returns `true` if the error is [`ErrorClass::Recoverable`].
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.classify(), ErrorClass::Recoverable)
    }
}

/// A horizontal partition of the storage engine.
///
/// Implementations must be safe to share across the workers of a scan.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait Shard: Send + Sync {
    /// The shard's identifier, used in logs and errors.
    fn id(&self) -> u64;

    /// Create a cursor factory bound to this shard.
    ///
    /// # Errors
    ///
    /// - [`ShardError::EngineClosed`] or [`ShardError::ShardDisabled`] if the
    ///   shard is unavailable. These are classified as recoverable.
    /// - [`ShardError::Backend`] for any other failure.
    fn create_cursor_iterator(&self, ctx: &ScanContext) -> ShardResult<Box<dyn CursorIterator>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(ShardError::EngineClosed.classify(), ErrorClass::Recoverable);
        assert_eq!(ShardError::ShardDisabled.classify(), ErrorClass::Recoverable);
        let err = ShardError::backend(std::io::Error::other("corrupt index"));
        assert_eq!(err.classify(), ErrorClass::Fatal);
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "backend error: corrupt index");
    }
}
