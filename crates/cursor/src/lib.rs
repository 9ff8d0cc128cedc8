//! Cursor layer of the tsdb storage engine.
//!
//! This crate defines how the query layer scans `(timestamp, value)` points
//! for one field of one series across a set of shards, independent of the
//! field's value type.
//!
//! # Quick Start
//!
//! ```ignore
//! use tsdb_cursor::{CursorRequest, CursorType, ScanContext, create_cursor_iterators};
//!
//! let ctx = ScanContext::new().with_cursor_type(CursorType::Array);
//! let req = CursorRequest::builder()
//!     .name("cpu")
//!     .tags(tags)
//!     .field("usage")
//!     .ascending(true)
//!     .range(start, end)
//!     .build()?;
//!
//! // One factory per available shard, in shard order.
//! let mut iterators = create_cursor_iterators(&ctx, &shards)?;
//! for cursor in iterators.next_cursors(&ctx, &req)? {
//!     let mut cursor = cursor.into_array::<f64>().unwrap();
//!     loop {
//!         let arr = cursor.next();
//!         if arr.is_empty() {
//!             break;
//!         }
//!         consume(arr.timestamps(), arr.values());
//!     }
//!     if let Some(err) = cursor.err() {
//!         // the scan stopped early
//!     }
//!     cursor.close();
//! }
//! ```
//!
//! # Trait Hierarchy
//!
//! ```text
//! Shard                                  ← Collaborator: one partition
//!   └─ create_cursor_iterator() → CursorIterator   ← Per-shard factory
//!                                   └─ next_cursor() → TypedCursor
//!                                                       ├─ BatchCursor<V>  ← fresh Vecs
//!                                                       └─ ArrayCursor<V>  ← reused buffer
//!                                                            └─ Cursor     ← close / err
//! ```
//!
//! ## Protocol Negotiation
//!
//! The [`ScanContext`] carries a [`CursorType`]. Factories build batch or
//! array cursors accordingly, and fall back to their
//! [`ScanConfig`](config::ScanConfig) when the scan asks for
//! [`CursorType::Default`]. Child contexts keep the parent's cursor type.
//!
//! ## Shard Fan-Out
//!
//! [`create_cursor_iterators`] asks every shard for a factory. Shards that
//! report a recoverable error (closed engine, disabled shard) are left out;
//! a fatal error fails the build. No contributing shards means no data, not
//! an error.
//!
//! # Feature Flags
//!
//! - **`in-memory`**: Enables the [`mem`] module, providing an in-memory
//!   [`Shard`] for testing.
//! - **`test-utils`**: Enables the [`conformance`] module with shard
//!   conformance tests. Implies `in-memory`.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Conformance tests for shard implementations.
#[cfg(any(test, feature = "test-utils"))]
pub mod conformance;

pub mod config;

mod context;
pub use context::{CursorType, ScanContext};

mod cursor;
pub use cursor::{
    ArrayCursor, BatchCursor, BooleanArrayCursor, BooleanBatchCursor, Cursor, CursorValue,
    FloatArrayCursor, FloatBatchCursor, IntegerArrayCursor, IntegerBatchCursor,
    StringArrayCursor, StringBatchCursor, TypedCursor, UnsignedArrayCursor, UnsignedBatchCursor,
};

mod error;
pub use error::{CursorError, CursorResult, ErrorSlot};

mod fanout;
pub use fanout::{FanOutError, create_cursor_iterators};

mod iterator;
pub use iterator::{CursorIterator, CursorIterators};

mod request;
pub use request::{CursorRequest, CursorRequestBuilder, RequestError};

pub mod shard;
pub use shard::{ErrorClass, Shard, ShardError, ShardResult};

#[cfg(any(test, feature = "in-memory"))]
pub mod mem;

// Re-export shared types for convenience
pub use tsdb_types::{
    BooleanArray, Direction, EOF, FieldType, FloatArray, IntegerArray, StringArray, Tag, Tags,
    TimeArray, UnsignedArray, Value,
};
pub use tokio_util::sync::CancellationToken;
