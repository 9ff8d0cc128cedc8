//! Cursor traits.
//!
//! Every cursor implements the lifecycle trait [`Cursor`]. Data is pulled
//! through one of two protocols:
//!
//! - [`BatchCursor`]: each pull returns freshly allocated, equal-length
//!   timestamp and value vectors.
//! - [`ArrayCursor`]: each pull returns a reference to a buffer owned by the
//!   cursor. The buffer is refilled by the next pull, which the borrow checker
//!   enforces by tying the reference to `&mut self`.
//!
//! In both protocols an empty result means the cursor is exhausted. Pulls
//! never fail: a scan that stops early records the reason in the cursor's
//! error slot, which callers must inspect via [`Cursor::err`] once the
//! cursor reports exhaustion.
//!
//! ## Value Families
//!
//! | Value type | Batch protocol | Array protocol | Buffer |
//! |------------|----------------|----------------|--------|
//! | `i64` | [`IntegerBatchCursor`] | [`IntegerArrayCursor`] | [`IntegerArray`] |
//! | `f64` | [`FloatBatchCursor`] | [`FloatArrayCursor`] | [`FloatArray`] |
//! | `u64` | [`UnsignedBatchCursor`] | [`UnsignedArrayCursor`] | [`UnsignedArray`] |
//! | `String` | [`StringBatchCursor`] | [`StringArrayCursor`] | [`StringArray`] |
//! | `bool` | [`BooleanBatchCursor`] | [`BooleanArrayCursor`] | [`BooleanArray`] |
//!
//! The traits are generic over the element type, so a concrete cursor is
//! monomorphised per family. [`TypedCursor`] erases the family at the factory
//! boundary; callers recover the protocol they expect with
//! [`TypedCursor::into_batch`] or [`TypedCursor::into_array`].
//!
//! [`IntegerArray`]: tsdb_types::IntegerArray
//! [`FloatArray`]: tsdb_types::FloatArray
//! [`UnsignedArray`]: tsdb_types::UnsignedArray
//! [`StringArray`]: tsdb_types::StringArray
//! [`BooleanArray`]: tsdb_types::BooleanArray

mod typed;
pub use typed::{CursorValue, TypedCursor};

use crate::CursorError;
use tsdb_types::{TimeArray, Value};

/// Lifecycle contract shared by all cursors.
///
/// A cursor is owned by exactly one component at a time. Implementations
/// release their shard resources in [`close`](Self::close) and must make it
/// idempotent, and should also release them on drop so that a cursor
/// abandoned on an error path does not leak.
#[auto_impl::auto_impl(&mut, Box)]
pub trait Cursor: Send + core::fmt::Debug {
    /// Release the resources held by the cursor.
    ///
    /// Pulling after `close` is a caller error. Implementations must not
    /// corrupt shared state when it happens, but need not detect it.
    fn close(&mut self);

    /// The terminal error of the scan.
    ///
    /// Only meaningful once the cursor reports exhaustion or the caller stops
    /// early. `None` means the scan ran to completion.
    fn err(&self) -> Option<&CursorError>;
}

/// Batch-protocol cursor over values of type `V`.
#[auto_impl::auto_impl(&mut, Box)]
pub trait BatchCursor<V: Value>: Cursor {
    /// Pull the next batch of points.
    ///
    /// Both vectors always have the same length. An empty pair means the
    /// cursor is exhausted, and every later call returns an empty pair too.
    fn next(&mut self) -> (Vec<i64>, Vec<V>);
}

/// Array-protocol cursor over values of type `V`.
#[auto_impl::auto_impl(&mut, Box)]
pub trait ArrayCursor<V: Value>: Cursor {
    /// Pull the next batch of points into the cursor's buffer.
    ///
    /// The returned array is reused by the next call. An empty array means
    /// the cursor is exhausted, and every later call returns an empty array.
    fn next(&mut self) -> &TimeArray<V>;
}

/// Batch cursor over signed integers.
pub type IntegerBatchCursor = dyn BatchCursor<i64>;
/// Batch cursor over floats.
pub type FloatBatchCursor = dyn BatchCursor<f64>;
/// Batch cursor over unsigned integers.
pub type UnsignedBatchCursor = dyn BatchCursor<u64>;
/// Batch cursor over strings.
pub type StringBatchCursor = dyn BatchCursor<String>;
/// Batch cursor over booleans.
pub type BooleanBatchCursor = dyn BatchCursor<bool>;

/// Array cursor over signed integers.
pub type IntegerArrayCursor = dyn ArrayCursor<i64>;
/// Array cursor over floats.
pub type FloatArrayCursor = dyn ArrayCursor<f64>;
/// Array cursor over unsigned integers.
pub type UnsignedArrayCursor = dyn ArrayCursor<u64>;
/// Array cursor over strings.
pub type StringArrayCursor = dyn ArrayCursor<String>;
/// Array cursor over booleans.
pub type BooleanArrayCursor = dyn ArrayCursor<bool>;
