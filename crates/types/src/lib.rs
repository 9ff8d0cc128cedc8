//! Types shared by the tsdb cursor crates.
//!
//! These are low-level types used on both sides of the cursor boundary: the
//! series identity a scan targets, the five value types a field may hold, and
//! the reusable buffer handed out by array-style cursors.

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

mod array;
pub use array::{BooleanArray, FloatArray, IntegerArray, StringArray, TimeArray, UnsignedArray};

mod direction;
pub use direction::Direction;

mod tags;
pub use tags::{Tag, Tags, TagsError, series_key};

mod time;
pub use time::{EOF, ZERO_TIME, is_eof};

mod value;
pub use value::{FieldType, Value};
