use std::fmt;

use crate::DataType;

/// A single value shared by every row of a constant column.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ScalarValue {
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit IEEE 754 floating-point number.
    Float64(f64),
    /// A variable-width byte string.
    String(Vec<u8>),
    /// A fixed-width byte string; its width is its length.
    FixedString(Vec<u8>),
}

impl ScalarValue {
    /// Build a string scalar from anything byte-like.
    pub fn string(value: impl AsRef<[u8]>) -> Self {
        Self::String(value.as_ref().to_vec())
    }

    /// Logical type of this value.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::String(_) => DataType::String,
            Self::FixedString(bytes) => DataType::FixedString(bytes.len()),
        }
    }

    /// Raw bytes of a string or fixed-string value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(bytes) | Self::FixedString(bytes) => Some(bytes),
            Self::Int64(_) | Self::Float64(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(bytes) | Self::FixedString(bytes) => {
                write!(f, "'{}'", String::from_utf8_lossy(bytes))
            }
        }
    }
}
