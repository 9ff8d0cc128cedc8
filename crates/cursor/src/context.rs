//! Request-scoped scan context and cursor protocol negotiation.
//!
//! A [`ScanContext`] travels with a scan from the query layer down to each
//! shard's cursor factory. It carries two things:
//!
//! - The [`CursorType`] the caller wants factories to build. This lets the
//!   query engine move from the batch protocol to the array protocol one call
//!   site at a time.
//! - A [`CancellationToken`] that factories and cursors check cooperatively.
//!
//! Contexts are immutable. [`ScanContext::with_cursor_type`] returns a new
//! context, and [`ScanContext::child`] derives one that keeps the cursor type
//! and can be cancelled independently of its parent.

use crate::config::ConfigError;
use core::{fmt, str::FromStr};
use tokio_util::sync::CancellationToken;

/// The cursor protocol a factory should produce.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CursorType {
    /// Buffer-reusing [`ArrayCursor`](crate::ArrayCursor)s.
    Array,
    /// Slice-returning [`BatchCursor`](crate::BatchCursor)s.
    Batch,
    /// No preference; the factory chooses.
    #[default]
    Default,
}

impl CursorType {
    /// Replace [`CursorType::Default`] with `fallback`.
    pub const fn resolve(self, fallback: Self) -> Self {
        match self {
            Self::Default => fallback,
            other => other,
        }
    }

    /// The lowercase name of this cursor type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Batch => "batch",
            Self::Default => "default",
        }
    }
}

impl FromStr for CursorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(Self::Array),
            "batch" => Ok(Self::Batch),
            "default" => Ok(Self::Default),
            _ => Err(ConfigError::InvalidCursorType(s.to_owned())),
        }
    }
}

impl fmt::Display for CursorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-scoped configuration for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    cursor_type: Option<CursorType>,
    cancel: CancellationToken,
}

impl ScanContext {
    /// Create a context with no cursor type and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token.
    pub const fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cursor_type: None, cancel }
    }

    /// Return a copy of this context carrying `cursor_type`.
    ///
    /// The copy shares this context's cancellation token.
    #[must_use]
    pub fn with_cursor_type(&self, cursor_type: CursorType) -> Self {
        Self { cursor_type: Some(cursor_type), cancel: self.cancel.clone() }
    }

    /// The cursor type carried by this context, or [`CursorType::Default`]
    /// if none was set.
    pub fn cursor_type(&self) -> CursorType {
        self.cursor_type.unwrap_or_default()
    }

    /// Derive a child context.
    ///
    /// The child keeps this context's cursor type. Cancelling the parent
    /// cancels the child, but not the other way round.
    #[must_use]
    pub fn child(&self) -> Self {
        Self { cursor_type: self.cursor_type, cancel: self.cancel.child_token() }
    }

    /// The context's cancellation token.
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the scan.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` if the scan has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
