//! Per-shard cursor factories.

use crate::{Cursor, CursorRequest, CursorResult, ScanContext, TypedCursor};

/// Produces cursors for scan requests against a single shard.
///
/// A factory is bound to one shard and is not itself iterable. A single
/// factory is driven by one thread at a time, but factories for different
/// shards may be used in parallel, so implementations must be [`Send`].
///
/// # Implementation Guide
///
/// [`next_cursor`](Self::next_cursor) must:
///
/// - Return `Ok(Some(cursor))` positioned at the first point of the range in
///   the request's direction, restricted to this shard.
/// - Return `Ok(None)` if the shard holds no matching series or field. This
///   is not an error.
/// - Return `Err` only if the shard cannot service the request at all,
///   including [`CursorError::Cancelled`] when the context is cancelled.
/// - Build an array-protocol or batch-protocol cursor according to the
///   context's [`CursorType`], resolving [`CursorType::Default`] to a
///   protocol of its own choosing.
///
/// [`CursorError::Cancelled`]: crate::CursorError::Cancelled
/// [`CursorType`]: crate::CursorType
/// [`CursorType::Default`]: crate::CursorType::Default
#[auto_impl::auto_impl(&mut, Box)]
pub trait CursorIterator: Send + core::fmt::Debug {
    /// Create a cursor for `req`.
    fn next_cursor(
        &mut self,
        ctx: &ScanContext,
        req: &CursorRequest,
    ) -> CursorResult<Option<TypedCursor>>;
}

/// The per-shard factories taking part in one query, in shard order.
///
/// Built by [`create_cursor_iterators`](crate::create_cursor_iterators) and
/// discarded when the query finishes.
#[derive(Debug, Default)]
pub struct CursorIterators(Vec<Box<dyn CursorIterator>>);

impl CursorIterators {
    /// Create an empty set with room for `capacity` factories.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append a factory.
    pub fn push(&mut self, iterator: Box<dyn CursorIterator>) {
        self.0.push(iterator);
    }

    /// Number of factories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no shard contributed a factory, i.e. there is no
    /// data to scan.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the factories.
    pub fn iter(&self) -> core::slice::Iter<'_, Box<dyn CursorIterator>> {
        self.0.iter()
    }

    /// Iterate mutably over the factories.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Box<dyn CursorIterator>> {
        self.0.iter_mut()
    }

    /// Ask every factory for a cursor for `req`, sequentially and in shard
    /// order.
    ///
    /// Shards without matching data are skipped. On error, cursors already
    /// created are closed before the error is returned.
    pub fn next_cursors(
        &mut self,
        ctx: &ScanContext,
        req: &CursorRequest,
    ) -> CursorResult<Vec<TypedCursor>> {
        let mut cursors = Vec::with_capacity(self.0.len());
        for iterator in &mut self.0 {
            match iterator.next_cursor(ctx, req) {
                Ok(Some(cursor)) => cursors.push(cursor),
                Ok(None) => {}
                Err(err) => {
                    close_all(&mut cursors);
                    return Err(err);
                }
            }
        }
        Ok(cursors)
    }
}

fn close_all(cursors: &mut [TypedCursor]) {
    for cursor in cursors {
        cursor.close();
    }
}

impl IntoIterator for CursorIterators {
    type Item = Box<dyn CursorIterator>;
    type IntoIter = std::vec::IntoIter<Box<dyn CursorIterator>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a mut CursorIterators {
    type Item = &'a mut Box<dyn CursorIterator>;
    type IntoIter = core::slice::IterMut<'a, Box<dyn CursorIterator>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl FromIterator<Box<dyn CursorIterator>> for CursorIterators {
    fn from_iter<I: IntoIterator<Item = Box<dyn CursorIterator>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
