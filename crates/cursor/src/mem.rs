//! In-memory shard implementation.
//!
//! This is not a good implementation for production use, but is useful for
//! testing. Points are held in [`BTreeMap`]s keyed by timestamp, one column
//! per series field. Cursors copy the requested range out of the shard when
//! they are created, so a scan never holds the shard lock.

use crate::{
    ArrayCursor, BatchCursor, Cursor, CursorError, CursorIterator, CursorRequest, CursorResult,
    CursorType, CursorValue, ErrorSlot, ScanContext, Shard, ShardError, ShardResult, TypedCursor,
    config::ScanConfig,
};
use bytes::Bytes;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::trace;
use tsdb_types::{EOF, FieldType, Tags, TimeArray, series_key};

/// Default number of points returned per pull.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Errors from writing to a [`MemShard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemShardError {
    /// A point used the reserved [`EOF`] timestamp.
    #[error("timestamp {EOF} is reserved and cannot be stored")]
    EofTimestamp,
}

/// Availability of a [`MemShard`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardState {
    /// Serving reads.
    #[default]
    Open,
    /// Disabled; factory creation reports [`ShardError::ShardDisabled`].
    Disabled,
    /// Engine closed; factory creation reports [`ShardError::EngineClosed`].
    Closed,
}

mod column {
    use std::collections::BTreeMap;

    /// A column of typed points for one field.
    #[derive(Debug, Clone)]
    pub enum Column {
        Integer(BTreeMap<i64, i64>),
        Float(BTreeMap<i64, f64>),
        Unsigned(BTreeMap<i64, u64>),
        String(BTreeMap<i64, String>),
        Boolean(BTreeMap<i64, bool>),
    }

    /// Access to the column variant matching a value type.
    pub trait ColumnValue: Sized {
        fn column_mut(column: &mut Column) -> Option<&mut BTreeMap<i64, Self>>;

        fn new_column() -> Column;
    }
}

use column::{Column, ColumnValue};

/// A value that can be stored in a [`MemShard`]. Implemented for the five
/// value types.
pub trait MemValue: CursorValue + ColumnValue {}

impl<V: CursorValue + ColumnValue> MemValue for V {}

macro_rules! mem_value {
    ($($ty:ty => $variant:ident;)+) => {
        $(
            impl ColumnValue for $ty {
                fn column_mut(column: &mut Column) -> Option<&mut BTreeMap<i64, Self>> {
                    match column {
                        Column::$variant(points) => Some(points),
                        _ => None,
                    }
                }

                fn new_column() -> Column {
                    Column::$variant(BTreeMap::new())
                }
            }
        )+

        impl Column {
            const fn field_type(&self) -> FieldType {
                match self {
                    $(Self::$variant(_) => <$ty as tsdb_types::Value>::FIELD_TYPE,)+
                }
            }

            fn cursor(&self, req: &CursorRequest, opts: CursorOptions) -> TypedCursor {
                match self {
                    $(Self::$variant(points) => build_cursor(points, req, opts),)+
                }
            }
        }
    };
}

mem_value! {
    i64 => Integer;
    f64 => Float;
    u64 => Unsigned;
    String => String;
    bool => Boolean;
}

type Fields = BTreeMap<String, Column>;
type Store = BTreeMap<Bytes, Fields>;

#[derive(Debug, Default)]
struct MemShardInner {
    store: RwLock<Store>,
    state: RwLock<ShardState>,
    failure: RwLock<Option<String>>,
    fail_scans_after: RwLock<Option<usize>>,
    open_cursors: Arc<AtomicUsize>,
}

/// A shard holding its points in memory.
///
/// Cloning a `MemShard` yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct MemShard {
    id: u64,
    config: ScanConfig,
    batch_size: usize,
    inner: Arc<MemShardInner>,
}

impl MemShard {
    /// Create an empty, open shard with the default [`ScanConfig`].
    pub fn new(id: u64) -> Self {
        Self::with_config(id, ScanConfig::default())
    }

    /// Create an empty, open shard with `config`.
    pub fn with_config(id: u64, config: ScanConfig) -> Self {
        Self { id, config, batch_size: DEFAULT_BATCH_SIZE, inner: Default::default() }
    }

    /// Set the maximum number of points returned per pull. Clamped to at
    /// least one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The shard's scan configuration.
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Write points to a field of a series.
    ///
    /// A point at an existing timestamp replaces the old value. Writing a
    /// value type different from the one stored replaces the whole column.
    ///
    /// # Errors
    ///
    /// Returns [`MemShardError::EofTimestamp`] if any point uses the [`EOF`]
    /// timestamp. Nothing is written in that case.
    pub fn write<V: MemValue>(
        &self,
        name: impl AsRef<[u8]>,
        tags: &Tags,
        field: &str,
        points: impl IntoIterator<Item = (i64, V)>,
    ) -> Result<(), MemShardError> {
        let points: Vec<_> = points.into_iter().collect();
        if points.iter().any(|(ts, _)| *ts == EOF) {
            return Err(MemShardError::EofTimestamp);
        }

        let mut store = self.inner.store.write();
        let fields = store.entry(series_key(name.as_ref(), tags)).or_default();
        let column = fields.entry(field.to_owned()).or_insert_with(V::new_column);
        if V::column_mut(column).is_none() {
            *column = V::new_column();
        }
        if let Some(col) = V::column_mut(column) {
            col.extend(points);
        }
        Ok(())
    }

    /// The value type stored for a field, if the field exists.
    pub fn field_type(
        &self,
        name: impl AsRef<[u8]>,
        tags: &Tags,
        field: &str,
    ) -> Option<FieldType> {
        let store = self.inner.store.read();
        store.get(&series_key(name.as_ref(), tags))?.get(field).map(Column::field_type)
    }

    /// Set the shard's availability.
    pub fn set_state(&self, state: ShardState) {
        *self.inner.state.write() = state;
    }

    /// The shard's availability.
    pub fn state(&self) -> ShardState {
        *self.inner.state.read()
    }

    /// Make factory creation fail with a fatal backend error carrying
    /// `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.inner.failure.write() = Some(message.into());
    }

    /// Make cursors created after this call stop after `points` points and
    /// record a backend error in their error slot.
    ///
    /// The error is recorded on the first pull after `points` points were
    /// returned, even if the range held no more data.
    pub fn fail_scans_after(&self, points: usize) {
        *self.inner.fail_scans_after.write() = Some(points);
    }

    /// Clear all injected failures.
    pub fn clear_failures(&self) {
        *self.inner.failure.write() = None;
        *self.inner.fail_scans_after.write() = None;
    }

    /// Number of cursors created by this shard that have not yet been
    /// released.
    pub fn open_cursors(&self) -> usize {
        self.inner.open_cursors.load(Ordering::Acquire)
    }
}

impl Shard for MemShard {
    fn id(&self) -> u64 {
        self.id
    }

    fn create_cursor_iterator(&self, ctx: &ScanContext) -> ShardResult<Box<dyn CursorIterator>> {
        match self.state() {
            ShardState::Open => {}
            ShardState::Disabled => return Err(ShardError::ShardDisabled),
            ShardState::Closed => return Err(ShardError::EngineClosed),
        }
        if let Some(message) = self.inner.failure.read().clone() {
            return Err(ShardError::Backend(message.into()));
        }
        trace!(shard_id = self.id, cursor_type = %ctx.cursor_type(), "created cursor iterator");
        Ok(Box::new(MemCursorIterator { shard: self.clone() }))
    }
}

/// Cursor factory for a [`MemShard`].
#[derive(Debug)]
pub struct MemCursorIterator {
    shard: MemShard,
}

impl CursorIterator for MemCursorIterator {
    fn next_cursor(
        &mut self,
        ctx: &ScanContext,
        req: &CursorRequest,
    ) -> CursorResult<Option<TypedCursor>> {
        if ctx.is_cancelled() {
            return Err(CursorError::Cancelled);
        }
        if self.shard.state() == ShardState::Closed {
            return Err(CursorError::backend(ShardError::EngineClosed));
        }

        let store = self.shard.inner.store.read();
        let Some(column) = store.get(&req.series_key()).and_then(|f| f.get(req.field())) else {
            return Ok(None);
        };

        let cursor_type = self.shard.config.resolve(ctx.cursor_type());
        let opts = CursorOptions {
            cursor_type,
            batch_size: self.shard.batch_size,
            fail_after: *self.shard.inner.fail_scans_after.read(),
            cancel: ctx.cancel_token().clone(),
            open: Arc::clone(&self.shard.inner.open_cursors),
        };
        trace!(
            shard_id = self.shard.id,
            field = req.field(),
            %cursor_type,
            field_type = %column.field_type(),
            "creating cursor"
        );
        Ok(Some(column.cursor(req, opts)))
    }
}

#[derive(Debug)]
struct CursorOptions {
    cursor_type: CursorType,
    batch_size: usize,
    fail_after: Option<usize>,
    cancel: CancellationToken,
    open: Arc<AtomicUsize>,
}

fn build_cursor<V: CursorValue>(
    points: &BTreeMap<i64, V>,
    req: &CursorRequest,
    opts: CursorOptions,
) -> TypedCursor {
    let range = points.range(req.start()..=req.end()).map(|(ts, v)| (*ts, v.clone()));
    let points: Vec<_> = if req.ascending() { range.collect() } else { range.rev().collect() };

    opts.open.fetch_add(1, Ordering::AcqRel);
    let cursor = MemCursor {
        points: points.into_iter(),
        batch_size: opts.batch_size,
        buf: TimeArray::with_capacity(opts.batch_size),
        fail_after: opts.fail_after,
        emitted: 0,
        cancel: opts.cancel,
        err: ErrorSlot::new(),
        open: Some(opts.open),
    };

    match opts.cursor_type {
        CursorType::Batch => TypedCursor::batch::<V>(cursor),
        CursorType::Array | CursorType::Default => TypedCursor::array::<V>(cursor),
    }
}

/// A cursor over a snapshot of one field's points.
///
/// Speaks both protocols; the factory decides which one the caller sees.
#[derive(Debug)]
pub struct MemCursor<V> {
    points: std::vec::IntoIter<(i64, V)>,
    batch_size: usize,
    buf: TimeArray<V>,
    fail_after: Option<usize>,
    emitted: usize,
    cancel: CancellationToken,
    err: ErrorSlot,
    open: Option<Arc<AtomicUsize>>,
}

impl<V: CursorValue> MemCursor<V> {
    fn fill(&mut self, out: &mut TimeArray<V>) {
        if self.open.is_none() {
            return;
        }
        let remaining = self.fail_after.map(|n| n.saturating_sub(self.emitted));
        if remaining == Some(0) {
            let emitted = self.emitted;
            self.fail(CursorError::msg(format!("scan failed after {emitted} points")));
            return;
        }
        if self.points.len() == 0 {
            return;
        }
        if self.cancel.is_cancelled() {
            self.fail(CursorError::Cancelled);
            return;
        }

        let limit = remaining.map_or(self.batch_size, |r| r.min(self.batch_size));

        out.extend(self.points.by_ref().take(limit));
        self.emitted += out.len();
    }

    fn fail(&mut self, err: CursorError) {
        self.err.set(err);
        self.release();
    }

    fn release(&mut self) {
        self.points = Vec::new().into_iter();
        self.buf = TimeArray::new();
        if let Some(open) = self.open.take() {
            open.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl<V: CursorValue> Cursor for MemCursor<V> {
    fn close(&mut self) {
        self.release();
    }

    fn err(&self) -> Option<&CursorError> {
        self.err.get()
    }
}

impl<V: CursorValue> BatchCursor<V> for MemCursor<V> {
    fn next(&mut self) -> (Vec<i64>, Vec<V>) {
        let mut out = TimeArray::new();
        self.fill(&mut out);
        out.into_parts()
    }
}

impl<V: CursorValue> ArrayCursor<V> for MemCursor<V> {
    fn next(&mut self) -> &TimeArray<V> {
        let mut buf = core::mem::take(&mut self.buf);
        buf.clear();
        self.fill(&mut buf);
        self.buf = buf;
        &self.buf
    }
}

impl<V> Drop for MemCursor<V> {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            open.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
