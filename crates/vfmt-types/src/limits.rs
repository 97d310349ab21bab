/// Maximum number of arguments to a formatting call, the pattern included.
///
/// Also bounds manual placeholder literals: `{N}` is rejected as soon as the
/// digits parsed so far reach this value, which keeps the parse from
/// overflowing.
pub const ARGUMENT_THRESHOLD: usize = 1024;

/// Minimum number of formatting arguments after the pattern.
pub const MIN_FORMAT_ARGUMENTS: usize = 1;

/// Trailing slack carried by padded literal fragments and by the output
/// buffer while it is being written.
pub const COPY_PADDING: usize = 15;

/// Block size used by the padded copy. Always `COPY_PADDING + 1`.
pub const COPY_BLOCK: usize = COPY_PADDING + 1;

/// Default row terminator of string columns.
pub const DEFAULT_DELIMITER: u8 = 0;
