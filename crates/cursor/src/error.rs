//! Error types for cursor construction and terminal scan failures.

/// Result type alias for cursor operations.
pub type CursorResult<T, E = CursorError> = Result<T, E>;

/// Error type for cursor construction and scanning.
///
/// During a scan this is only ever observed through a cursor's error slot,
/// never returned from a pull.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// An error occurred in the shard's storage backend.
    #[error("backend error: {0}")]
    Backend(#[from] Box<dyn core::error::Error + Send + Sync + 'static>),

    /// The scan context was cancelled.
    #[error("scan cancelled")]
    Cancelled,
}

impl CursorError {
    /// Create a new backend error from any error type.
    pub fn backend<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }

    /// Create a new backend error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Backend(message.into())
    }

    /// Returns `true` if this error is [`CursorError::Cancelled`].
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A cursor's terminal error slot.
///
/// The slot is written at most once: the first error recorded is the one
/// every later [`get`](Self::get) returns.
#[derive(Debug, Default)]
pub struct ErrorSlot(Option<CursorError>);

impl ErrorSlot {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self(None)
    }

    /// Record `err` if the slot is empty. Returns `false` and discards `err`
    /// if an error was already recorded.
    pub fn set(&mut self, err: CursorError) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(err);
        true
    }

    /// The recorded error, if any.
    pub const fn get(&self) -> Option<&CursorError> {
        self.0.as_ref()
    }

    /// Returns `true` if an error has been recorded.
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }
}
