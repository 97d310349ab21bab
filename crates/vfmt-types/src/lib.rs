//! Column encodings and value types consumed by the vfmt formatter.
//!
//! A string column is a byte buffer plus exclusive row-end offsets; every row
//! ends with one delimiter byte that is counted in its offset. A fixed-string
//! column is a byte buffer plus a stride. A constant column is one scalar
//! standing in for every row of a batch.

pub mod column;
pub mod limits;
pub mod value;

use std::fmt;

pub use column::{Column, ConstColumn, FixedStringColumn, StringColumn, StringColumnBuilder};
pub use value::ScalarValue;

/// Logical type of a function argument, as seen by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit IEEE 754 float.
    Float64,
    /// Variable-width byte string.
    String,
    /// Byte string of exactly `n` bytes per row.
    FixedString(usize),
}

impl DataType {
    /// Returns true for the types a formatting argument may have.
    #[must_use]
    pub const fn is_string_or_fixed_string(self) -> bool {
        matches!(self, Self::String | Self::FixedString(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64 => f.write_str("Int64"),
            Self::Float64 => f.write_str("Float64"),
            Self::String => f.write_str("String"),
            Self::FixedString(n) => write!(f, "FixedString({n})"),
        }
    }
}
