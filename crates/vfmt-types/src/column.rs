//! Columnar buffers for one batch of rows.
//!
//! Buffers are shared (`Arc`) so a column can be handed to several calls
//! and returned from one without copying.

use std::sync::Arc;

use vfmt_error::{FormatError, Result};

use crate::limits::DEFAULT_DELIMITER;
use crate::{DataType, ScalarValue};

/// Variable-width string column.
///
/// Row `i` occupies `chars[offsets[i - 1]..offsets[i]]` (row 0 starts at 0).
/// The last byte of every row is its delimiter, so the value itself is one
/// byte shorter than its offset span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringColumn {
    chars: Arc<[u8]>,
    offsets: Arc<[u64]>,
}

impl StringColumn {
    /// Wrap existing buffers.
    ///
    /// # Errors
    ///
    /// Returns an error unless offsets strictly increase from at least 1 and
    /// the last offset equals the byte buffer length.
    pub fn new(chars: Arc<[u8]>, offsets: Arc<[u64]>) -> Result<Self> {
        let mut previous = 0_u64;
        for (row, &end) in offsets.iter().enumerate() {
            if end <= previous {
                return Err(FormatError::malformed(format!(
                    "string offset {end} at row {row} does not leave room for a delimiter after {previous}"
                )));
            }
            previous = end;
        }
        if previous != chars.len() as u64 {
            return Err(FormatError::malformed(format!(
                "string offsets end at {previous} but buffer holds {} bytes",
                chars.len()
            )));
        }
        Ok(Self { chars, offsets })
    }

    /// Build a column from row values, terminating each with the default
    /// delimiter.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let mut builder = StringColumnBuilder::new(DEFAULT_DELIMITER);
        for value in values {
            builder.push(value.as_ref());
        }
        builder.finish()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true when the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Raw byte buffer, delimiters included.
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Exclusive row-end offsets.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Start offset of `row` in the byte buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn row_start(&self, row: usize) -> usize {
        // Offsets never exceed `chars.len()`, which is a usize.
        if row == 0 { 0 } else { self.offsets[row - 1] as usize }
    }

    /// Value of `row` without its delimiter.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value(&self, row: usize) -> &[u8] {
        let start = self.row_start(row);
        let end = self.offsets[row] as usize - 1;
        &self.chars[start..end]
    }

    /// Sum of value lengths over all rows, delimiters excluded.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.chars.len() - self.offsets.len()
    }

    /// Iterate over row values without delimiters.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).map(move |row| self.value(row))
    }

    /// Move out the shared buffers.
    #[must_use]
    pub fn into_parts(self) -> (Arc<[u8]>, Arc<[u64]>) {
        (self.chars, self.offsets)
    }
}

/// Incremental builder for [`StringColumn`].
#[derive(Debug, Clone)]
pub struct StringColumnBuilder {
    chars: Vec<u8>,
    offsets: Vec<u64>,
    delimiter: u8,
}

impl StringColumnBuilder {
    #[must_use]
    pub fn new(delimiter: u8) -> Self {
        Self {
            chars: Vec::new(),
            offsets: Vec::new(),
            delimiter,
        }
    }

    /// Pre-size both buffers.
    #[must_use]
    pub fn with_capacity(delimiter: u8, rows: usize, bytes: usize) -> Self {
        Self {
            chars: Vec::with_capacity(bytes + rows),
            offsets: Vec::with_capacity(rows),
            delimiter,
        }
    }

    /// Append one row.
    pub fn push(&mut self, value: &[u8]) {
        self.chars.extend_from_slice(value);
        self.chars.push(self.delimiter);
        self.offsets.push(self.chars.len() as u64);
    }

    /// Rows appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> StringColumn {
        StringColumn {
            chars: Arc::from(self.chars),
            offsets: Arc::from(self.offsets),
        }
    }
}

/// Fixed-width string column: row `i` is `chars[i * width..(i + 1) * width]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedStringColumn {
    chars: Arc<[u8]>,
    width: usize,
}

impl FixedStringColumn {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns an error when `width` is zero or does not divide the buffer.
    pub fn new(chars: Arc<[u8]>, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(FormatError::malformed("fixed string width must be positive"));
        }
        if chars.len() % width != 0 {
            return Err(FormatError::malformed(format!(
                "fixed string buffer of {} bytes is not a multiple of width {width}",
                chars.len()
            )));
        }
        Ok(Self { chars, width })
    }

    /// Build a column from row values, right-padding short values with zero
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when `width` is zero or a value is longer than it.
    pub fn from_values<I, V>(values: I, width: usize) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        if width == 0 {
            return Err(FormatError::malformed("fixed string width must be positive"));
        }
        let mut chars = Vec::new();
        for (row, value) in values.into_iter().enumerate() {
            let value = value.as_ref();
            if value.len() > width {
                return Err(FormatError::malformed(format!(
                    "value of {} bytes at row {row} does not fit fixed string width {width}",
                    value.len()
                )));
            }
            chars.extend_from_slice(value);
            chars.resize(chars.len() + (width - value.len()), 0);
        }
        Ok(Self {
            chars: Arc::from(chars),
            width,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len() / self.width
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Bytes per row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Value of `row`, padding included.
    #[inline]
    #[must_use]
    pub fn value(&self, row: usize) -> &[u8] {
        let start = row * self.width;
        &self.chars[start..start + self.width]
    }
}

/// One scalar standing in for `len` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstColumn {
    value: ScalarValue,
    len: usize,
}

impl ConstColumn {
    #[must_use]
    pub const fn new(value: ScalarValue, len: usize) -> Self {
        Self { value, len }
    }

    #[must_use]
    pub const fn value(&self) -> &ScalarValue {
        &self.value
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Column payload for one function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Arc<[i64]>),
    Float64(Arc<[f64]>),
    String(StringColumn),
    FixedString(FixedStringColumn),
    Const(ConstColumn),
}

impl Column {
    /// Constant string column of `len` rows.
    pub fn const_string(value: impl AsRef<[u8]>, len: usize) -> Self {
        Self::Const(ConstColumn::new(ScalarValue::string(value), len))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int64(values) => values.len(),
            Self::Float64(values) => values.len(),
            Self::String(column) => column.len(),
            Self::FixedString(column) => column.len(),
            Self::Const(column) => column.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical type of the values held.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::String(_) => DataType::String,
            Self::FixedString(column) => DataType::FixedString(column.width()),
            Self::Const(column) => column.value().data_type(),
        }
    }

    /// Returns true when every row shares one value.
    #[must_use]
    pub const fn is_const(&self) -> bool {
        matches!(self, Self::Const(_))
    }

    /// Representation name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Int64(_) => "ColumnInt64".to_owned(),
            Self::Float64(_) => "ColumnFloat64".to_owned(),
            Self::String(_) => "ColumnString".to_owned(),
            Self::FixedString(_) => "ColumnFixedString".to_owned(),
            Self::Const(column) => format!("ColumnConst({})", column.value().data_type()),
        }
    }
}

impl From<StringColumn> for Column {
    fn from(column: StringColumn) -> Self {
        Self::String(column)
    }
}

impl From<FixedStringColumn> for Column {
    fn from(column: FixedStringColumn) -> Self {
        Self::FixedString(column)
    }
}

impl From<ConstColumn> for Column {
    fn from(column: ConstColumn) -> Self {
        Self::Const(column)
    }
}
