//! Batch executor: one sizing pass, one allocation, one write pass.
//!
//! Every batch:
//! - emits a `format_batch` tracing span with `batch_size`, `fragments`,
//!   `references`, `copy_strategy` and `output_bytes` fields,
//! - records rows and bytes via [`record_formatted_batch`],
//! - resolves the column kind of each reference once, outside the row loop.

use vfmt_error::{FormatError, Result};
use vfmt_types::limits::{COPY_BLOCK, COPY_PADDING};
use vfmt_types::{FixedStringColumn, StringColumn, StringColumnBuilder};

use crate::metrics::record_formatted_batch;
use crate::options::{CopyStrategy, FormatOptions};
use crate::pattern::{ParsedPattern, PatternArgument};

/// Per-row byte access for a referenced argument column.
pub trait RowSource: Send + Sync {
    /// Number of rows available.
    fn rows(&self) -> usize;

    /// Bytes substituted for `row`.
    fn row(&self, row: usize) -> &[u8];

    /// Sum of `row(i).len()` over all rows.
    fn total_len(&self) -> usize;
}

impl RowSource for StringColumn {
    fn rows(&self) -> usize {
        self.len()
    }

    #[inline]
    fn row(&self, row: usize) -> &[u8] {
        self.value(row)
    }

    fn total_len(&self) -> usize {
        self.payload_len()
    }
}

impl RowSource for FixedStringColumn {
    fn rows(&self) -> usize {
        self.len()
    }

    #[inline]
    fn row(&self, row: usize) -> &[u8] {
        self.value(row)
    }

    fn total_len(&self) -> usize {
        self.chars().len()
    }
}

/// A formatting argument after binding.
#[derive(Debug, Clone, Copy)]
pub enum ArgumentColumn<'a> {
    /// Variable-width string column.
    Variable(&'a StringColumn),
    /// Fixed-width string column.
    Fixed(&'a FixedStringColumn),
    /// Constant string shared by all rows.
    Constant(&'a [u8]),
}

impl<'a> ArgumentColumn<'a> {
    /// View for the pattern parser.
    #[must_use]
    pub const fn as_pattern_argument(&self) -> PatternArgument<'a> {
        match self {
            Self::Variable(_) | Self::Fixed(_) => PatternArgument::Dynamic,
            Self::Constant(value) => PatternArgument::Constant(*value),
        }
    }

    fn row_source(&self) -> Option<&'a dyn RowSource> {
        match self {
            Self::Variable(column) => Some(*column),
            Self::Fixed(column) => Some(*column),
            Self::Constant(_) => None,
        }
    }
}

/// Literal fragment carrying `COPY_PADDING` zero bytes past its end.
#[derive(Debug, Clone)]
struct PaddedFragment {
    bytes: Vec<u8>,
    len: usize,
}

impl PaddedFragment {
    fn new(fragment: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(fragment.len() + COPY_PADDING);
        bytes.extend_from_slice(fragment);
        bytes.resize(fragment.len() + COPY_PADDING, 0);
        Self {
            bytes,
            len: fragment.len(),
        }
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Format `row_count` rows of `parsed` into a new string column.
///
/// `arguments` is indexed by the references of `parsed`; constant arguments
/// are expected to be folded already and are never read here.
///
/// # Errors
///
/// Returns an error when a reference names a constant or missing argument,
/// when a referenced column does not have `row_count` rows, or when the
/// output size does not fit in memory.
///
/// # Panics
///
/// In debug builds, panics if the bytes written differ from the computed
/// output size.
pub fn execute_pattern(
    parsed: &ParsedPattern,
    arguments: &[ArgumentColumn<'_>],
    row_count: usize,
    options: &FormatOptions,
) -> Result<StringColumn> {
    let sources = resolve_sources(parsed, arguments, row_count)?;
    let total = output_size(parsed, &sources, row_count)?;

    let fragments: Vec<PaddedFragment> = parsed
        .fragments()
        .iter()
        .map(|fragment| PaddedFragment::new(fragment))
        .collect();

    let delimiter = options.delimiter;
    let (chars, offsets) = match options.copy_strategy {
        CopyStrategy::Exact => {
            write_rows::<false>(&fragments, &sources, row_count, total, delimiter)?
        }
        CopyStrategy::Padded => {
            write_rows::<true>(&fragments, &sources, row_count, total, delimiter)?
        }
    };

    record_formatted_batch(row_count as u64, total as u64);

    let _span = tracing::debug_span!(
        "format_batch",
        batch_size = row_count,
        fragments = fragments.len(),
        references = sources.len(),
        copy_strategy = options.copy_strategy.label(),
        output_bytes = total,
    )
    .entered();
    tracing::debug!(batch_size = row_count, output_bytes = total, "format_batch complete");

    StringColumn::new(chars.into(), offsets.into())
}

/// Bind each reference to its column once, for the whole batch.
fn resolve_sources<'a>(
    parsed: &ParsedPattern,
    arguments: &[ArgumentColumn<'a>],
    row_count: usize,
) -> Result<Vec<&'a dyn RowSource>> {
    let mut sources = Vec::with_capacity(parsed.references().len());
    for &index in parsed.references() {
        let source = arguments
            .get(index)
            .and_then(ArgumentColumn::row_source)
            .ok_or_else(|| {
                FormatError::internal(format!(
                    "reference to argument {index} has no per-row column"
                ))
            })?;
        if source.rows() != row_count {
            return Err(FormatError::ColumnLengthMismatch {
                // 1-based call position; the pattern is argument 1.
                position: index + 2,
                expected: row_count,
                actual: source.rows(),
            });
        }
        sources.push(source);
    }
    Ok(sources)
}

/// Exact output length: literals per row, referenced values, one delimiter
/// per row.
fn output_size(
    parsed: &ParsedPattern,
    sources: &[&dyn RowSource],
    row_count: usize,
) -> Result<usize> {
    let overflow = || FormatError::internal("formatted output size overflows usize");

    let mut total = parsed
        .literal_len()
        .checked_mul(row_count)
        .ok_or_else(overflow)?;
    for source in sources {
        total = total.checked_add(source.total_len()).ok_or_else(overflow)?;
    }
    total.checked_add(row_count).ok_or_else(overflow)
}

fn write_rows<const PADDED: bool>(
    fragments: &[PaddedFragment],
    sources: &[&dyn RowSource],
    row_count: usize,
    total: usize,
    delimiter: u8,
) -> Result<(Vec<u8>, Vec<u64>)> {
    let slack = if PADDED { COPY_PADDING } else { 0 };
    let mut chars = vec![0_u8; total + slack];
    let mut offsets = Vec::with_capacity(row_count);

    let Some((first, rest)) = fragments.split_first() else {
        return Err(FormatError::internal("parsed pattern has no fragments"));
    };

    let mut offset = 0_usize;
    for row in 0..row_count {
        offset = copy_fragment::<PADDED>(&mut chars, offset, first);
        for (source, fragment) in sources.iter().zip(rest) {
            let value = source.row(row);
            chars[offset..offset + value.len()].copy_from_slice(value);
            offset += value.len();
            offset = copy_fragment::<PADDED>(&mut chars, offset, fragment);
        }
        chars[offset] = delimiter;
        offset += 1;
        offsets.push(offset as u64);
    }

    if offset != total {
        debug_assert_eq!(offset, total, "written bytes drifted from computed output size");
        return Err(FormatError::internal(format!(
            "wrote {offset} bytes but computed {total}"
        )));
    }
    chars.truncate(total);
    Ok((chars, offsets))
}

/// Copy `fragment` to `dst[offset..]`, returning the new offset.
///
/// The padded variant copies whole `COPY_BLOCK` blocks and may write up to
/// `COPY_PADDING` bytes past the fragment end. Those bytes lie inside the
/// slack of `dst` or are overwritten by the next copy.
#[inline]
fn copy_fragment<const PADDED: bool>(
    dst: &mut [u8],
    offset: usize,
    fragment: &PaddedFragment,
) -> usize {
    if PADDED {
        let mut copied = 0;
        while copied < fragment.len {
            dst[offset + copied..offset + copied + COPY_BLOCK]
                .copy_from_slice(&fragment.bytes[copied..copied + COPY_BLOCK]);
            copied += COPY_BLOCK;
        }
    } else {
        dst[offset..offset + fragment.len].copy_from_slice(fragment.as_slice());
    }
    offset + fragment.len
}

/// Reference formatter: row at a time through a growing builder.
///
/// Same output as [`execute_pattern`] without the sizing pass; kept for
/// tests and benchmarks.
#[must_use]
pub fn execute_naive(
    parsed: &ParsedPattern,
    arguments: &[ArgumentColumn<'_>],
    row_count: usize,
    delimiter: u8,
) -> StringColumn {
    let mut builder = StringColumnBuilder::new(delimiter);
    let mut row_bytes = Vec::new();
    for row in 0..row_count {
        row_bytes.clear();
        row_bytes.extend_from_slice(&parsed.fragments()[0]);
        for (j, &index) in parsed.references().iter().enumerate() {
            match arguments[index] {
                ArgumentColumn::Variable(column) => row_bytes.extend_from_slice(column.value(row)),
                ArgumentColumn::Fixed(column) => row_bytes.extend_from_slice(column.value(row)),
                ArgumentColumn::Constant(value) => row_bytes.extend_from_slice(value),
            }
            row_bytes.extend_from_slice(&parsed.fragments()[j + 1]);
        }
        builder.push(&row_bytes);
    }
    builder.finish()
}
