#![allow(dead_code)]

use crate::{
    ArrayCursor, BatchCursor, Cursor, CursorIterator, CursorRequest, CursorType, CursorValue,
    ScanContext, Shard, TypedCursor, mem::MemShard,
};
use tsdb_types::{Direction, EOF, Tags};

/// Series name used by the conformance fixture.
pub const SERIES: &str = "conformance";

/// Number of points written to every fixture field.
pub const POINTS: i64 = 25;

/// Fields written by the fixture, one per value type.
pub const FIELDS: [&str; 5] = ["int", "float", "uint", "str", "bool"];

/// Timestamp of the `i`th fixture point.
pub const fn fixture_ts(i: i64) -> i64 {
    1_000 + i * 10
}

/// Tags of the fixture series.
pub fn fixture_tags() -> Tags {
    Tags::from_pairs([("host", "server01"), ("region", "us-west")])
}

/// Integer fixture points.
pub fn integers() -> Vec<(i64, i64)> {
    (0..POINTS).map(|i| (fixture_ts(i), i - 12)).collect()
}

/// Float fixture points.
pub fn floats() -> Vec<(i64, f64)> {
    (0..POINTS).map(|i| (fixture_ts(i), i as f64 * 0.5)).collect()
}

/// Unsigned fixture points.
pub fn unsigneds() -> Vec<(i64, u64)> {
    (0..POINTS).map(|i| (fixture_ts(i), i as u64 * 3)).collect()
}

/// String fixture points.
pub fn strings() -> Vec<(i64, String)> {
    (0..POINTS).map(|i| (fixture_ts(i), format!("v{i}"))).collect()
}

/// Boolean fixture points.
pub fn booleans() -> Vec<(i64, bool)> {
    (0..POINTS).map(|i| (fixture_ts(i), i % 2 == 0)).collect()
}

/// A column of fixture points.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureColumn {
    /// Integer points.
    Integer(Vec<(i64, i64)>),
    /// Float points.
    Float(Vec<(i64, f64)>),
    /// Unsigned points.
    Unsigned(Vec<(i64, u64)>),
    /// String points.
    String(Vec<(i64, String)>),
    /// Boolean points.
    Boolean(Vec<(i64, bool)>),
}

/// Loads fixture data into a shard under test.
pub trait LoadFixture {
    /// Write `column` to `field` of the series `name` with `tags`.
    fn load(&self, name: &str, tags: &Tags, field: &str, column: FixtureColumn);
}

impl LoadFixture for MemShard {
    fn load(&self, name: &str, tags: &Tags, field: &str, column: FixtureColumn) {
        let res = match column {
            FixtureColumn::Integer(p) => self.write(name, tags, field, p),
            FixtureColumn::Float(p) => self.write(name, tags, field, p),
            FixtureColumn::Unsigned(p) => self.write(name, tags, field, p),
            FixtureColumn::String(p) => self.write(name, tags, field, p),
            FixtureColumn::Boolean(p) => self.write(name, tags, field, p),
        };
        res.unwrap();
    }
}

/// Write the standard fixture to `shard`.
pub fn load_fixture<S: LoadFixture>(shard: &S) {
    let tags = fixture_tags();
    shard.load(SERIES, &tags, "int", FixtureColumn::Integer(integers()));
    shard.load(SERIES, &tags, "float", FixtureColumn::Float(floats()));
    shard.load(SERIES, &tags, "uint", FixtureColumn::Unsigned(unsigneds()));
    shard.load(SERIES, &tags, "str", FixtureColumn::String(strings()));
    shard.load(SERIES, &tags, "bool", FixtureColumn::Boolean(booleans()));
}

/// Run all conformance tests against a [`Shard`] implementation.
///
/// The shard must be open and empty. The standard fixture is loaded first.
pub fn conformance<S: Shard + LoadFixture>(shard: &S) {
    load_fixture(shard);
    for direction in [Direction::Ascending, Direction::Descending] {
        for cursor_type in [CursorType::Array, CursorType::Batch] {
            test_field_scan(shard, "int", &integers(), direction, cursor_type);
            test_field_scan(shard, "float", &floats(), direction, cursor_type);
            test_field_scan(shard, "uint", &unsigneds(), direction, cursor_type);
            test_field_scan(shard, "str", &strings(), direction, cursor_type);
            test_field_scan(shard, "bool", &booleans(), direction, cursor_type);
        }
    }
    test_inclusive_bounds(shard);
    test_empty_range(shard);
    test_missing_series(shard);
    test_missing_field(shard);
    test_default_cursor_type(shard);
    test_child_context(shard);
    test_cancelled_context(shard);
}

/// Points drained from a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Drained<V> {
    /// Timestamps, in the order the cursor returned them.
    pub timestamps: Vec<i64>,
    /// Values, aligned with `timestamps`.
    pub values: Vec<V>,
    /// Number of non-empty pulls.
    pub pulls: usize,
    /// The cursor's terminal error, rendered.
    pub err: Option<String>,
}

/// Pull every point from `cursor`, checking the pull contract along the way,
/// then close it.
///
/// Panics if a pull returns mismatched timestamps and values, if the cursor
/// yields data after reporting exhaustion, or if `cursor` does not yield
/// values of type `V`.
pub fn drain<V: CursorValue>(cursor: TypedCursor) -> Drained<V> {
    let mut out = Drained { timestamps: Vec::new(), values: Vec::new(), pulls: 0, err: None };
    match cursor.cursor_type() {
        CursorType::Batch => {
            let mut cursor = cursor.into_batch::<V>().expect("batch cursor of the wrong type");
            loop {
                let (ts, vs) = cursor.next();
                assert_eq!(ts.len(), vs.len(), "batch pull cardinality mismatch");
                if ts.is_empty() {
                    break;
                }
                out.pulls += 1;
                out.timestamps.extend(ts);
                out.values.extend(vs);
            }
            for _ in 0..3 {
                let (ts, vs) = cursor.next();
                assert!(ts.is_empty() && vs.is_empty(), "batch cursor yielded data after EOF");
            }
            out.err = cursor.err().map(ToString::to_string);
            cursor.close();
        }
        CursorType::Array | CursorType::Default => {
            let mut cursor = cursor.into_array::<V>().expect("array cursor of the wrong type");
            loop {
                let arr = cursor.next();
                assert_eq!(arr.timestamps().len(), arr.values().len(), "array cardinality");
                if arr.is_empty() {
                    break;
                }
                out.pulls += 1;
                out.timestamps.extend_from_slice(arr.timestamps());
                out.values.extend_from_slice(arr.values());
            }
            for _ in 0..3 {
                assert!(cursor.next().is_empty(), "array cursor yielded data after EOF");
            }
            out.err = cursor.err().map(ToString::to_string);
            cursor.close();
        }
    }
    out
}

/// Assert that `timestamps` are ordered according to `direction`.
pub fn assert_monotonic(timestamps: &[i64], direction: Direction) {
    for pair in timestamps.windows(2) {
        assert!(
            direction.in_order(pair[0], pair[1]),
            "timestamps {} and {} out of {direction} order",
            pair[0],
            pair[1]
        );
    }
}

fn request(field: &str, direction: Direction, start: i64, end: i64) -> CursorRequest {
    CursorRequest::builder()
        .name(SERIES)
        .tags(fixture_tags())
        .field(field)
        .direction(direction)
        .range(start, end)
        .build()
        .unwrap()
}

fn open_cursor<S: Shard>(
    shard: &S,
    ctx: &ScanContext,
    req: &CursorRequest,
) -> Option<TypedCursor> {
    let mut iter = shard.create_cursor_iterator(ctx).unwrap();
    iter.next_cursor(ctx, req).unwrap()
}

/// Scan a whole fixture field and compare against the written points.
fn test_field_scan<S: Shard, V: CursorValue>(
    shard: &S,
    field: &str,
    expected: &[(i64, V)],
    direction: Direction,
    cursor_type: CursorType,
) {
    let ctx = ScanContext::new().with_cursor_type(cursor_type);
    let req = request(field, direction, i64::MIN + 1, i64::MAX);
    let cursor = open_cursor(shard, &ctx, &req).expect("fixture field exists");
    assert_eq!(cursor.cursor_type(), cursor_type);
    assert_eq!(cursor.field_type(), V::FIELD_TYPE);

    let drained = drain::<V>(cursor);
    assert_eq!(drained.err, None);
    assert_monotonic(&drained.timestamps, direction);
    assert!(drained.timestamps.iter().all(|ts| *ts != EOF));

    let mut expected = expected.to_vec();
    if !direction.is_ascending() {
        expected.reverse();
    }
    let (ts, vs): (Vec<_>, Vec<_>) = expected.into_iter().unzip();
    assert_eq!(drained.timestamps, ts);
    assert_eq!(drained.values, vs);
}

/// Both bounds of a request are inclusive.
fn test_inclusive_bounds<S: Shard>(shard: &S) {
    let (start, end) = (fixture_ts(3), fixture_ts(7));
    for direction in [Direction::Ascending, Direction::Descending] {
        let req = request("int", direction, start, end);
        let cursor = open_cursor(shard, &ScanContext::new(), &req).unwrap();
        let drained = drain::<i64>(cursor);
        assert_eq!(drained.timestamps.len(), 5);
        assert!(drained.timestamps.contains(&start));
        assert!(drained.timestamps.contains(&end));
        assert_monotonic(&drained.timestamps, direction);
    }
}

/// A range between points yields either no cursor or an empty one.
fn test_empty_range<S: Shard>(shard: &S) {
    let req = request("float", Direction::Ascending, fixture_ts(2) + 1, fixture_ts(3) - 1);
    if let Some(cursor) = open_cursor(shard, &ScanContext::new(), &req) {
        let drained = drain::<f64>(cursor);
        assert!(drained.timestamps.is_empty());
        assert_eq!(drained.pulls, 0);
        assert_eq!(drained.err, None);
    }
}

/// An unknown series yields no cursor and no error.
fn test_missing_series<S: Shard>(shard: &S) {
    let req = CursorRequest::builder()
        .name("no-such-series")
        .tags(fixture_tags())
        .field("int")
        .ascending(true)
        .range(100, 200)
        .build()
        .unwrap();
    assert!(open_cursor(shard, &ScanContext::new(), &req).is_none());

    let req = CursorRequest::builder()
        .name(SERIES)
        .tags(Tags::from_pairs([("host", "elsewhere")]))
        .field("int")
        .build()
        .unwrap();
    assert!(open_cursor(shard, &ScanContext::new(), &req).is_none());
}

/// An unknown field yields no cursor and no error.
fn test_missing_field<S: Shard>(shard: &S) {
    let req = request("no-such-field", Direction::Ascending, 0, i64::MAX);
    assert!(open_cursor(shard, &ScanContext::new(), &req).is_none());
}

/// A context without a cursor type still yields a usable cursor.
fn test_default_cursor_type<S: Shard>(shard: &S) {
    let req = request("uint", Direction::Ascending, 0, i64::MAX);
    let cursor = open_cursor(shard, &ScanContext::new(), &req).unwrap();
    assert_ne!(cursor.cursor_type(), CursorType::Default);
    assert_eq!(drain::<u64>(cursor).timestamps.len(), POINTS as usize);
}

/// Derived contexts keep the requested cursor type.
fn test_child_context<S: Shard>(shard: &S) {
    let req = request("str", Direction::Ascending, 0, i64::MAX);
    for cursor_type in [CursorType::Array, CursorType::Batch] {
        let ctx = ScanContext::new().with_cursor_type(cursor_type).child();
        let cursor = open_cursor(shard, &ctx, &req).unwrap();
        assert_eq!(cursor.cursor_type(), cursor_type);
        drain::<String>(cursor);
    }
}

/// Cursor construction honors cancellation.
fn test_cancelled_context<S: Shard>(shard: &S) {
    let ctx = ScanContext::new();
    let mut iter = shard.create_cursor_iterator(&ctx).unwrap();
    ctx.cancel();
    let req = request("bool", Direction::Ascending, 0, i64::MAX);
    let err = iter.next_cursor(&ctx, &req).unwrap_err();
    assert!(err.is_cancelled());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_avoids_eof() {
        assert!((0..POINTS).map(fixture_ts).all(|ts| ts != EOF));
    }

    #[test]
    fn fixture_writes_every_field() {
        let shard = MemShard::new(1);
        load_fixture(&shard);
        for field in FIELDS {
            assert!(shard.field_type(SERIES, &fixture_tags(), field).is_some());
        }
    }

    #[test]
    fn mem_shard_conformance() {
        conformance(&MemShard::new(1));
    }

    #[test]
    fn mem_shard_conformance_small_batches() {
        for batch_size in [1, 4, 7] {
            conformance(&MemShard::new(1).with_batch_size(batch_size));
        }
    }
}
