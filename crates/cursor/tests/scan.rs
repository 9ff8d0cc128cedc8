//! End-to-end scans across several in-memory shards.

use std::sync::Arc;
use tsdb_cursor::{
    ArrayCursor, Cursor, CursorIterator, CursorRequest, CursorType, Direction, FanOutError,
    ScanContext, Shard, Tags,
    conformance::{assert_monotonic, drain},
    create_cursor_iterators,
    mem::{MemShard, ShardState},
};

fn tags() -> Tags {
    Tags::from_pairs([("host", "a")])
}

/// Three shards, each holding a disjoint hour of per-minute points.
fn shards() -> Vec<Arc<MemShard>> {
    (0..3)
        .map(|id| {
            let shard = MemShard::new(id).with_batch_size(16);
            let base = 1_000_000 + id as i64 * 3_600;
            let points = (0..60).map(|m| (base + m * 60, id as i64 * 100 + m));
            shard.write("cpu", &tags(), "usage", points).unwrap();
            Arc::new(shard)
        })
        .collect()
}

fn request(direction: Direction) -> CursorRequest {
    CursorRequest::builder()
        .name("cpu")
        .tags(tags())
        .field("usage")
        .direction(direction)
        .build()
        .unwrap()
}

#[test]
fn disabled_shard_is_skipped() {
    let shards = shards();
    shards[1].set_state(ShardState::Disabled);

    let ctx = ScanContext::new().with_cursor_type(CursorType::Batch);
    let mut iterators = create_cursor_iterators(&ctx, &shards).unwrap();
    assert_eq!(iterators.len(), 2);

    let cursors = iterators.next_cursors(&ctx, &request(Direction::Ascending)).unwrap();
    let firsts: Vec<_> = cursors.into_iter().map(|c| drain::<i64>(c).values[0]).collect();
    // shard 0 then shard 2, in input order
    assert_eq!(firsts, [0, 200]);
    assert!(shards.iter().all(|s| s.open_cursors() == 0));
}

#[test]
fn all_shards_unavailable_means_no_data() {
    let shards = shards();
    shards[0].set_state(ShardState::Disabled);
    shards[1].set_state(ShardState::Closed);
    shards[2].set_state(ShardState::Disabled);

    let iterators = create_cursor_iterators(&ScanContext::new(), &shards).unwrap();
    assert!(iterators.is_empty());
}

#[test]
fn fatal_shard_error_fails_fan_out() {
    let shards = shards();
    shards[2].fail_with("wal replay failed");

    let err = create_cursor_iterators(&ScanContext::new(), &shards).unwrap_err();
    assert!(matches!(err, FanOutError::Shard { shard_id: 2, .. }));
}

#[test]
fn missing_series_yields_no_cursor() {
    let shards = shards();
    let ctx = ScanContext::new();
    let req = CursorRequest::builder()
        .name("disk")
        .field("used")
        .ascending(true)
        .range(100, 200)
        .build()
        .unwrap();

    let mut iterators = create_cursor_iterators(&ctx, &shards).unwrap();
    for iter in &mut iterators {
        assert!(iter.next_cursor(&ctx, &req).unwrap().is_none());
    }
    assert!(iterators.next_cursors(&ctx, &req).unwrap().is_empty());
}

#[test]
fn early_termination_releases_cursors() {
    let shards = shards();
    let ctx = ScanContext::new().with_cursor_type(CursorType::Array);
    let mut iterators = create_cursor_iterators(&ctx, &shards).unwrap();
    let cursors = iterators.next_cursors(&ctx, &request(Direction::Descending)).unwrap();
    assert_eq!(shards.iter().map(|s| s.open_cursors()).sum::<usize>(), 3);

    for cursor in cursors {
        let mut cursor = cursor.into_array::<i64>().unwrap();
        // take one page and stop
        let first = cursor.next();
        assert_eq!(first.len(), 16);
        assert_monotonic(first.timestamps(), Direction::Descending);
        cursor.close();
        assert!(cursor.err().is_none());
    }
    assert!(shards.iter().all(|s| s.open_cursors() == 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn shards_scan_in_parallel() {
    let shards = shards();
    let ctx = ScanContext::new().with_cursor_type(CursorType::Batch);
    let iterators = create_cursor_iterators(&ctx, &shards).unwrap();

    let mut handles = Vec::new();
    for mut iter in iterators {
        let ctx = ctx.child();
        let req = request(Direction::Ascending);
        handles.push(tokio::task::spawn_blocking(move || {
            let cursor = iter.next_cursor(&ctx, &req).unwrap().unwrap();
            assert_eq!(cursor.cursor_type(), CursorType::Batch);
            drain::<i64>(cursor)
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        let drained = handle.await.unwrap();
        assert_eq!(drained.err, None);
        assert_eq!(drained.timestamps.len(), 60);
        assert_monotonic(&drained.timestamps, Direction::Ascending);
        all.extend(drained.timestamps);
    }
    // shards hold disjoint, ordered ranges, so shard order is time order
    assert_monotonic(&all, Direction::Ascending);
    assert!(shards.iter().all(|s| s.open_cursors() == 0));
}

#[tokio::test]
async fn cancellation_reaches_in_flight_scans() {
    let shards = shards();
    let ctx = ScanContext::new();
    let mut iterators = create_cursor_iterators(&ctx, &shards).unwrap();
    let cursors = iterators.next_cursors(&ctx.child(), &request(Direction::Ascending)).unwrap();

    let canceller = ctx.clone();
    tokio::spawn(async move { canceller.cancel() }).await.unwrap();

    for cursor in cursors {
        let drained = drain::<i64>(cursor);
        assert!(drained.timestamps.is_empty());
        assert_eq!(drained.err.as_deref(), Some("scan cancelled"));
    }
    assert!(matches!(create_cursor_iterators(&ctx, &shards), Err(FanOutError::Cancelled)));
}

#[test]
fn shard_trait_objects() {
    let shards: Vec<Box<dyn Shard>> =
        shards().into_iter().map(|s| Box::new(s) as Box<dyn Shard>).collect();
    let iterators = create_cursor_iterators(&ScanContext::new(), &shards).unwrap();
    assert_eq!(iterators.len(), 3);
}
