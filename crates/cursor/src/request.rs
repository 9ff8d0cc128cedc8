//! Scan request descriptor.

use bytes::Bytes;
use tsdb_types::{Direction, Tags, series_key};

/// Errors from building a [`CursorRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No series name was provided.
    #[error("cursor request is missing a series name")]
    MissingName,

    /// The start bound is after the end bound.
    #[error("cursor request start {start} is after end {end}")]
    InvertedRange {
        /// Start bound.
        start: i64,
        /// End bound.
        end: i64,
    },
}

/// Describes a scan of one field of one series over a time range.
///
/// Both bounds are inclusive nanosecond timestamps: a point at `ts` is in
/// range when `start <= ts <= end`. Requests are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorRequest {
    name: Bytes,
    tags: Tags,
    field: String,
    direction: Direction,
    start: i64,
    end: i64,
}

impl CursorRequest {
    /// Start building a request.
    pub fn builder() -> CursorRequestBuilder {
        CursorRequestBuilder::default()
    }

    /// The series name.
    pub const fn name(&self) -> &Bytes {
        &self.name
    }

    /// The series tag set.
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The field to scan.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The scan direction.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if the scan runs oldest first.
    pub const fn ascending(&self) -> bool {
        self.direction.is_ascending()
    }

    /// Inclusive start bound.
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Inclusive end bound.
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Returns `true` if `ts` falls within the request's bounds.
    pub const fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// The key of the series this request targets.
    pub fn series_key(&self) -> Bytes {
        series_key(&self.name, &self.tags)
    }
}

/// Builder for [`CursorRequest`].
///
/// Bounds default to the full time range, and direction to ascending.
#[derive(Debug, Clone)]
pub struct CursorRequestBuilder {
    name: Option<Bytes>,
    tags: Tags,
    field: String,
    direction: Direction,
    start: i64,
    end: i64,
}

impl Default for CursorRequestBuilder {
    fn default() -> Self {
        Self {
            name: None,
            tags: Tags::default(),
            field: String::new(),
            direction: Direction::Ascending,
            // EOF is i64::MIN and never a real timestamp
            start: i64::MIN + 1,
            end: i64::MAX,
        }
    }
}

impl CursorRequestBuilder {
    /// Set the series name.
    #[must_use]
    pub fn name(mut self, name: impl Into<Bytes>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the series tag set.
    #[must_use]
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Set the field to scan.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Set the scan direction.
    #[must_use]
    pub const fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the scan direction from an `ascending` flag.
    #[must_use]
    pub const fn ascending(mut self, ascending: bool) -> Self {
        self.direction = Direction::from_ascending(ascending);
        self
    }

    /// Set the inclusive start bound.
    #[must_use]
    pub const fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Set the inclusive end bound.
    #[must_use]
    pub const fn end(mut self, end: i64) -> Self {
        self.end = end;
        self
    }

    /// Set both inclusive bounds.
    #[must_use]
    pub const fn range(self, start: i64, end: i64) -> Self {
        self.start(start).end(end)
    }

    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingName`] if no series name was set, or
    /// [`RequestError::InvertedRange`] if `start > end`.
    pub fn build(self) -> Result<CursorRequest, RequestError> {
        let name = self.name.ok_or(RequestError::MissingName)?;
        if self.start > self.end {
            return Err(RequestError::InvertedRange { start: self.start, end: self.end });
        }
        Ok(CursorRequest {
            name,
            tags: self.tags,
            field: self.field,
            direction: self.direction,
            start: self.start,
            end: self.end,
        })
    }
}
