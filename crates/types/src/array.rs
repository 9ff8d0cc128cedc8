use crate::Value;

/// Array of signed integer points.
pub type IntegerArray = TimeArray<i64>;
/// Array of floating point points.
pub type FloatArray = TimeArray<f64>;
/// Array of unsigned integer points.
pub type UnsignedArray = TimeArray<u64>;
/// Array of string points.
pub type StringArray = TimeArray<String>;
/// Array of boolean points.
pub type BooleanArray = TimeArray<bool>;

/// A reusable buffer of `(timestamp, value)` points.
///
/// Array-style cursors hand out a reference to their own `TimeArray` on each
/// pull and refill the same allocation on the next one. Timestamps and values
/// always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeArray<V> {
    timestamps: Vec<i64>,
    values: Vec<V>,
}

impl<V> Default for TimeArray<V> {
    fn default() -> Self {
        Self { timestamps: Vec::new(), values: Vec::new() }
    }
}

impl<V: Value> TimeArray<V> {
    /// Create an empty array.
    pub const fn new() -> Self {
        Self { timestamps: Vec::new(), values: Vec::new() }
    }

    /// Create an empty array with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { timestamps: Vec::with_capacity(capacity), values: Vec::with_capacity(capacity) }
    }

    /// Create an array from parallel timestamp and value vectors.
    ///
    /// Returns `None` if the lengths differ.
    pub fn from_parts(timestamps: Vec<i64>, values: Vec<V>) -> Option<Self> {
        (timestamps.len() == values.len()).then_some(Self { timestamps, values })
    }

    /// Number of points in the array.
    pub const fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns `true` if the array holds no points. An empty array pulled
    /// from a cursor signals exhaustion.
    pub const fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamps, in scan order.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// The values, aligned with [`timestamps`](Self::timestamps).
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Remove all points, keeping the allocation.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.values.clear();
    }

    /// Append a single point.
    pub fn push(&mut self, timestamp: i64, value: V) {
        self.timestamps.push(timestamp);
        self.values.push(value);
    }

    /// Append all points yielded by `points`.
    pub fn extend(&mut self, points: impl IntoIterator<Item = (i64, V)>) {
        for (ts, v) in points {
            self.push(ts, v);
        }
    }

    /// Iterate over `(timestamp, &value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &V)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter())
    }

    /// The smallest timestamp in the array.
    pub fn min_time(&self) -> Option<i64> {
        self.timestamps.iter().copied().min()
    }

    /// The largest timestamp in the array.
    pub fn max_time(&self) -> Option<i64> {
        self.timestamps.iter().copied().max()
    }

    /// Consume the array and return its parallel vectors.
    pub fn into_parts(self) -> (Vec<i64>, Vec<V>) {
        (self.timestamps, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_clear() {
        let mut arr = FloatArray::with_capacity(4);
        assert!(arr.is_empty());
        arr.push(10, 1.5);
        arr.extend([(20, 2.5), (30, 3.5)]);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.timestamps(), &[10, 20, 30]);
        assert_eq!(arr.values(), &[1.5, 2.5, 3.5]);
        assert_eq!(arr.min_time(), Some(10));
        assert_eq!(arr.max_time(), Some(30));

        arr.clear();
        assert!(arr.is_empty());
        assert_eq!(arr.values().len(), 0);
        assert_eq!(arr.min_time(), None);
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        assert!(IntegerArray::from_parts(vec![1, 2], vec![1]).is_none());
        let arr = BooleanArray::from_parts(vec![1, 2], vec![true, false]).unwrap();
        let pairs: Vec<_> = arr.iter().map(|(t, v)| (t, *v)).collect();
        assert_eq!(pairs, [(1, true), (2, false)]);
    }
}
