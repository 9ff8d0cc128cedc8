use core::fmt;

/// Scan direction over the time axis.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Oldest point first.
    #[default]
    Ascending,
    /// Newest point first.
    Descending,
}

impl Direction {
    /// Create a direction from an `ascending` flag.
    pub const fn from_ascending(ascending: bool) -> Self {
        if ascending { Self::Ascending } else { Self::Descending }
    }

    /// Returns `true` for [`Direction::Ascending`].
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }

    /// Returns `true` if `next` may follow `prev` in a scan running in this
    /// direction. Equal timestamps are allowed.
    pub const fn in_order(self, prev: i64, next: i64) -> bool {
        match self {
            Self::Ascending => prev <= next,
            Self::Descending => prev >= next,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ascending"),
            Self::Descending => f.write_str("descending"),
        }
    }
}
