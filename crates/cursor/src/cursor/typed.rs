use super::{ArrayCursor, BatchCursor, Cursor};
use crate::{CursorError, CursorType};
use tsdb_types::{FieldType, Value};

/// A [`Value`] with a pair of [`TypedCursor`] variants.
///
/// Implemented for the five value types. Used by
/// [`TypedCursor::into_batch`] and [`TypedCursor::into_array`] to select the
/// variant at compile time.
pub trait CursorValue: Value {
    /// Wrap a batch cursor.
    fn wrap_batch(cursor: Box<dyn BatchCursor<Self>>) -> TypedCursor;

    /// Wrap an array cursor.
    fn wrap_array(cursor: Box<dyn ArrayCursor<Self>>) -> TypedCursor;

    /// Extract a batch cursor, returning the cursor unchanged on mismatch.
    fn unwrap_batch(cursor: TypedCursor) -> Result<Box<dyn BatchCursor<Self>>, TypedCursor>;

    /// Extract an array cursor, returning the cursor unchanged on mismatch.
    fn unwrap_array(cursor: TypedCursor) -> Result<Box<dyn ArrayCursor<Self>>, TypedCursor>;
}

macro_rules! typed_cursor {
    ($($ty:ty => $batch:ident, $array:ident;)+) => {
        /// A cursor of any value family and protocol, as produced by a
        /// [`CursorIterator`](crate::CursorIterator).
        #[derive(Debug)]
        pub enum TypedCursor {
            $(
                #[doc = concat!("Batch-protocol cursor over `", stringify!($ty), "`.")]
                $batch(Box<dyn BatchCursor<$ty>>),
                #[doc = concat!("Array-protocol cursor over `", stringify!($ty), "`.")]
                $array(Box<dyn ArrayCursor<$ty>>),
            )+
        }

        impl TypedCursor {
            /// The value type the cursor yields.
            pub const fn field_type(&self) -> FieldType {
                match self {
                    $(
                        Self::$batch(_) | Self::$array(_) => <$ty as Value>::FIELD_TYPE,
                    )+
                }
            }

            /// The protocol the cursor speaks. Never
            /// [`CursorType::Default`].
            pub const fn cursor_type(&self) -> CursorType {
                match self {
                    $(
                        Self::$batch(_) => CursorType::Batch,
                        Self::$array(_) => CursorType::Array,
                    )+
                }
            }
        }

        impl Cursor for TypedCursor {
            fn close(&mut self) {
                match self {
                    $(
                        Self::$batch(c) => c.close(),
                        Self::$array(c) => c.close(),
                    )+
                }
            }

            fn err(&self) -> Option<&CursorError> {
                match self {
                    $(
                        Self::$batch(c) => c.err(),
                        Self::$array(c) => c.err(),
                    )+
                }
            }
        }

        $(
            impl CursorValue for $ty {
                fn wrap_batch(cursor: Box<dyn BatchCursor<Self>>) -> TypedCursor {
                    TypedCursor::$batch(cursor)
                }

                fn wrap_array(cursor: Box<dyn ArrayCursor<Self>>) -> TypedCursor {
                    TypedCursor::$array(cursor)
                }

                fn unwrap_batch(
                    cursor: TypedCursor,
                ) -> Result<Box<dyn BatchCursor<Self>>, TypedCursor> {
                    match cursor {
                        TypedCursor::$batch(c) => Ok(c),
                        other => Err(other),
                    }
                }

                fn unwrap_array(
                    cursor: TypedCursor,
                ) -> Result<Box<dyn ArrayCursor<Self>>, TypedCursor> {
                    match cursor {
                        TypedCursor::$array(c) => Ok(c),
                        other => Err(other),
                    }
                }
            }

            impl From<Box<dyn BatchCursor<$ty>>> for TypedCursor {
                fn from(cursor: Box<dyn BatchCursor<$ty>>) -> Self {
                    Self::$batch(cursor)
                }
            }

            impl From<Box<dyn ArrayCursor<$ty>>> for TypedCursor {
                fn from(cursor: Box<dyn ArrayCursor<$ty>>) -> Self {
                    Self::$array(cursor)
                }
            }
        )+
    };
}

typed_cursor! {
    i64 => IntegerBatch, IntegerArray;
    f64 => FloatBatch, FloatArray;
    u64 => UnsignedBatch, UnsignedArray;
    String => StringBatch, StringArray;
    bool => BooleanBatch, BooleanArray;
}

impl TypedCursor {
    /// Wrap a batch cursor of any value family.
    pub fn batch<V: CursorValue>(cursor: impl BatchCursor<V> + 'static) -> Self {
        V::wrap_batch(Box::new(cursor))
    }

    /// Wrap an array cursor of any value family.
    pub fn array<V: CursorValue>(cursor: impl ArrayCursor<V> + 'static) -> Self {
        V::wrap_array(Box::new(cursor))
    }

    /// Take the cursor as a batch cursor over `V`.
    ///
    /// On mismatch the cursor is handed back so the caller can still close
    /// it.
    pub fn into_batch<V: CursorValue>(self) -> Result<Box<dyn BatchCursor<V>>, Self> {
        V::unwrap_batch(self)
    }

    /// Take the cursor as an array cursor over `V`.
    ///
    /// On mismatch the cursor is handed back so the caller can still close
    /// it.
    pub fn into_array<V: CursorValue>(self) -> Result<Box<dyn ArrayCursor<V>>, Self> {
        V::unwrap_array(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorSlot;
    use tsdb_types::TimeArray;

    #[derive(Debug, Default)]
    struct Empty {
        buf: TimeArray<f64>,
        closed: bool,
        err: ErrorSlot,
    }

    impl Cursor for Empty {
        fn close(&mut self) {
            self.closed = true;
        }

        fn err(&self) -> Option<&CursorError> {
            self.err.get()
        }
    }

    impl BatchCursor<f64> for Empty {
        fn next(&mut self) -> (Vec<i64>, Vec<f64>) {
            (Vec::new(), Vec::new())
        }
    }

    impl ArrayCursor<f64> for Empty {
        fn next(&mut self) -> &TimeArray<f64> {
            &self.buf
        }
    }

    #[test]
    fn batch_roundtrip() {
        let cursor = TypedCursor::batch::<f64>(Empty::default());
        assert_eq!(cursor.field_type(), FieldType::Float);
        assert_eq!(cursor.cursor_type(), CursorType::Batch);
        assert!(matches!(cursor, TypedCursor::FloatBatch(_)));

        let mut batch = cursor.into_batch::<f64>().unwrap();
        assert!(batch.next().0.is_empty());
        batch.close();
        assert!(batch.err().is_none());
    }

    #[test]
    fn mismatch_hands_cursor_back() {
        let cursor = TypedCursor::array::<f64>(Empty::default());
        assert_eq!(cursor.cursor_type(), CursorType::Array);

        let cursor = cursor.into_batch::<f64>().unwrap_err();
        let cursor = cursor.into_array::<i64>().unwrap_err();
        let mut arr = cursor.into_array::<f64>().unwrap();
        assert!(arr.next().is_empty());
    }
}
