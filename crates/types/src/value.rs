use core::fmt;

/// The concrete type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Signed 64-bit integers.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Unsigned 64-bit integers.
    Unsigned,
    /// UTF-8 strings.
    String,
    /// Booleans.
    Boolean,
}

impl FieldType {
    /// All field types, in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Integer, Self::Float, Self::Unsigned, Self::String, Self::Boolean];

    /// The lowercase name of this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Unsigned => "unsigned",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for u64 {}
    impl Sealed for String {}
    impl Sealed for bool {}
}

/// An element type a cursor can yield.
///
/// Implemented for exactly the five field types. Generic cursor code is
/// monomorphised per type, so the scan path never boxes individual values.
pub trait Value: sealed::Sealed + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The field type this value belongs to.
    const FIELD_TYPE: FieldType;
}

impl Value for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;
}

impl Value for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;
}

impl Value for u64 {
    const FIELD_TYPE: FieldType = FieldType::Unsigned;
}

impl Value for String {
    const FIELD_TYPE: FieldType = FieldType::String;
}

impl Value for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_types() {
        assert_eq!(<i64 as Value>::FIELD_TYPE, FieldType::Integer);
        assert_eq!(<f64 as Value>::FIELD_TYPE, FieldType::Float);
        assert_eq!(<u64 as Value>::FIELD_TYPE, FieldType::Unsigned);
        assert_eq!(<String as Value>::FIELD_TYPE, FieldType::String);
        assert_eq!(<bool as Value>::FIELD_TYPE, FieldType::Boolean);
    }

    #[test]
    fn display() {
        let names: Vec<_> = FieldType::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["integer", "float", "unsigned", "string", "boolean"]);
    }
}
