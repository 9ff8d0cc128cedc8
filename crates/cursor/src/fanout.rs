//! Fan-out of a scan across shards.

use crate::{CursorIterators, ScanContext, Shard, ShardError, shard::ErrorClass};
use tracing::{debug, instrument, warn};

/// Error type for [`create_cursor_iterators`].
#[derive(Debug, thiserror::Error)]
pub enum FanOutError {
    /// A shard reported a fatal error.
    #[error("shard {shard_id} failed: {source}")]
    Shard {
        /// The failing shard.
        shard_id: u64,
        /// The shard's error.
        #[source]
        source: ShardError,
    },

    /// The scan context was cancelled before every shard was asked.
    #[error("fan-out cancelled")]
    Cancelled,
}

/// Request one cursor factory per shard.
///
/// The result keeps the order of `shards`. Shards whose error classifies as
/// [`ErrorClass::Recoverable`] (closed engine, disabled shard) are omitted
/// without placeholders. An empty result is not an error: it means there is
/// no data to scan.
///
/// # Errors
///
/// - [`FanOutError::Shard`] if any shard reports an [`ErrorClass::Fatal`]
///   error. Factories already created are dropped.
/// - [`FanOutError::Cancelled`] if `ctx` is cancelled.
#[instrument(skip_all, fields(shards = shards.len()))]
pub fn create_cursor_iterators<S: Shard>(
    ctx: &ScanContext,
    shards: &[S],
) -> Result<CursorIterators, FanOutError> {
    let mut iterators = CursorIterators::with_capacity(shards.len());
    for shard in shards {
        if ctx.is_cancelled() {
            return Err(FanOutError::Cancelled);
        }
        match shard.create_cursor_iterator(ctx) {
            Ok(iterator) => iterators.push(iterator),
            Err(err) => match err.classify() {
                ErrorClass::Recoverable => {
                    debug!(shard_id = shard.id(), %err, "omitting unavailable shard");
                }
                ErrorClass::Fatal => {
                    warn!(shard_id = shard.id(), %err, "shard failed to create cursor iterator");
                    return Err(FanOutError::Shard { shard_id: shard.id(), source: err });
                }
            },
        }
    }
    debug!(contributed = iterators.len(), "created cursor iterators");
    Ok(iterators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BatchCursor, Cursor, CursorError, CursorIterator, CursorRequest, CursorResult,
        ShardResult, TypedCursor,
    };

    /// Yields its shard's id as a single point.
    #[derive(Debug)]
    struct ShardId(Option<u64>);

    impl Cursor for ShardId {
        fn close(&mut self) {
            self.0 = None;
        }

        fn err(&self) -> Option<&CursorError> {
            None
        }
    }

    impl BatchCursor<u64> for ShardId {
        fn next(&mut self) -> (Vec<i64>, Vec<u64>) {
            match self.0.take() {
                Some(id) => (vec![0], vec![id]),
                None => (vec![], vec![]),
            }
        }
    }

    #[derive(Debug)]
    struct Tagged(u64);

    impl CursorIterator for Tagged {
        fn next_cursor(
            &mut self,
            _ctx: &ScanContext,
            _req: &CursorRequest,
        ) -> CursorResult<Option<TypedCursor>> {
            Ok(Some(TypedCursor::batch::<u64>(ShardId(Some(self.0)))))
        }
    }

    enum Outcome {
        Ok,
        Disabled,
        Closed,
        Broken,
    }

    struct Fake(u64, Outcome);

    impl Shard for Fake {
        fn id(&self) -> u64 {
            self.0
        }

        fn create_cursor_iterator(
            &self,
            _ctx: &ScanContext,
        ) -> ShardResult<Box<dyn CursorIterator>> {
            match self.1 {
                Outcome::Ok => Ok(Box::new(Tagged(self.0))),
                Outcome::Disabled => Err(ShardError::ShardDisabled),
                Outcome::Closed => Err(ShardError::EngineClosed),
                Outcome::Broken => Err(ShardError::backend(std::io::Error::other("broken"))),
            }
        }
    }

    fn ids(iterators: &mut CursorIterators) -> Vec<u64> {
        let req = CursorRequest::builder().name("cpu").build().unwrap();
        let cursors = iterators.next_cursors(&ScanContext::new(), &req).unwrap();
        cursors
            .into_iter()
            .map(|cursor| {
                let mut cursor = cursor.into_batch::<u64>().unwrap();
                let (_, ids) = cursor.next();
                cursor.close();
                ids[0]
            })
            .collect()
    }

    #[test]
    fn omits_disabled_shard_in_order() {
        let shards = [Fake(1, Outcome::Ok), Fake(2, Outcome::Disabled), Fake(3, Outcome::Ok)];
        let mut iterators = create_cursor_iterators(&ScanContext::new(), &shards).unwrap();
        assert_eq!(ids(&mut iterators), [1, 3]);
    }

    #[test]
    fn omits_closed_engines() {
        let shards = [Fake(1, Outcome::Closed), Fake(2, Outcome::Ok), Fake(3, Outcome::Closed)];
        let mut iterators = create_cursor_iterators(&ScanContext::new(), &shards).unwrap();
        assert_eq!(ids(&mut iterators), [2]);
    }

    #[test]
    fn all_unavailable_is_empty_not_error() {
        let shards = [Fake(1, Outcome::Disabled), Fake(2, Outcome::Closed)];
        let iterators = create_cursor_iterators(&ScanContext::new(), &shards).unwrap();
        assert!(iterators.is_empty());

        let none: [Fake; 0] = [];
        assert!(create_cursor_iterators(&ScanContext::new(), &none).unwrap().is_empty());
    }

    #[test]
    fn fatal_error_aborts() {
        let shards = [Fake(1, Outcome::Ok), Fake(2, Outcome::Broken), Fake(3, Outcome::Ok)];
        let err = create_cursor_iterators(&ScanContext::new(), &shards).unwrap_err();
        assert!(matches!(err, FanOutError::Shard { shard_id: 2, .. }));
    }

    #[test]
    fn cancelled_context_aborts() {
        let ctx = ScanContext::new();
        ctx.cancel();
        let err = create_cursor_iterators(&ctx, &[Fake(1, Outcome::Ok)]).unwrap_err();
        assert!(matches!(err, FanOutError::Cancelled));
    }
}
