/// The query layer's zero time: the smallest representable nanosecond
/// timestamp.
pub const ZERO_TIME: i64 = i64::MIN;

/// The "no key present" timestamp returned by encodings that need a marker
/// for a missing key.
///
/// No stored point may use this value as its timestamp.
pub const EOF: i64 = ZERO_TIME;

/// Returns `true` if `ts` is the [`EOF`] sentinel.
#[inline]
pub const fn is_eof(ts: i64) -> bool {
    ts == EOF
}
