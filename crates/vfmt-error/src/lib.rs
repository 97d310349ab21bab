use thiserror::Error;

/// Primary error type for vfmt operations.
///
/// Every failure rejects the whole call: nothing is partially formatted.
/// Binding failures are detected before any row is touched, pattern failures
/// while the pattern is scanned. Positions are byte offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    // === Binding Errors ===
    /// Fewer formatting arguments than the function needs.
    #[error(
        "number of arguments for function {function} doesn't match: passed {passed}, should be at least {min}"
    )]
    TooFewArguments {
        function: String,
        passed: usize,
        min: usize,
    },

    /// More arguments than the argument threshold allows.
    #[error(
        "number of arguments for function {function} doesn't match: passed {passed}, should be at most {max}"
    )]
    TooManyArguments {
        function: String,
        passed: usize,
        max: usize,
    },

    /// Argument type is neither a string nor a fixed string.
    #[error("illegal type {data_type} of argument {position} of function {function}")]
    IllegalTypeOfArgument {
        function: String,
        data_type: String,
        /// 1-based argument position, the pattern being argument 1.
        position: usize,
    },

    /// The pattern argument is a per-row column instead of a constant.
    #[error("first argument of function {function} must be constant string")]
    NonConstantPattern { function: String },

    /// Column representation cannot be consumed as a formatting argument.
    #[error("illegal column {column} of argument {position} of function {function}")]
    IllegalColumn {
        function: String,
        column: String,
        position: usize,
    },

    /// A per-row argument column does not cover the batch.
    #[error("argument {position} has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },

    /// Column buffers violate their encoding contract.
    #[error("malformed column: {detail}")]
    MalformedColumn { detail: String },

    // === Pattern Errors ===
    /// An unescaped `{` while another placeholder is still open.
    #[error("two open curly braces without close one at position {position}")]
    TwoOpenBraces { position: usize },

    /// An unescaped `}` with no open placeholder.
    #[error("closed curly brace without open one at position {position}")]
    UnmatchedCloseBrace { position: usize },

    /// The pattern ends inside a placeholder.
    #[error("last open curly brace is not closed")]
    UnclosedBrace,

    /// Placeholder contents are not an ASCII decimal.
    #[error("not a number in curly braces at position {position}")]
    NotANumber { position: usize },

    /// Manual index literal reached the argument threshold.
    #[error("too big number for arguments, must be less than {max}")]
    IndexLiteralTooBig { max: usize },

    /// Placeholder names an argument that was not supplied.
    #[error(
        "argument {index} is too big for formatting: {available} arguments available, indexing starts from zero"
    )]
    ArgumentIndexOutOfRange { index: usize, available: usize },

    /// `{N}` after `{}`.
    #[error("cannot switch from automatic field numbering to manual field specification")]
    AutomaticToManual { position: usize },

    /// `{}` after `{N}`.
    #[error("cannot switch from manual field specification to automatic field numbering")]
    ManualToAutomatic { position: usize },

    // === Internal Errors ===
    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`FormatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Argument count, type, constness, or column representation.
    Binding,
    /// Structure of the format pattern.
    Pattern,
    /// Broken internal invariant.
    Internal,
}

impl FormatError {
    /// Classify this error.
    pub const fn error_class(&self) -> ErrorClass {
        match self {
            Self::TooFewArguments { .. }
            | Self::TooManyArguments { .. }
            | Self::IllegalTypeOfArgument { .. }
            | Self::NonConstantPattern { .. }
            | Self::IllegalColumn { .. }
            | Self::ColumnLengthMismatch { .. }
            | Self::MalformedColumn { .. } => ErrorClass::Binding,
            Self::TwoOpenBraces { .. }
            | Self::UnmatchedCloseBrace { .. }
            | Self::UnclosedBrace
            | Self::NotANumber { .. }
            | Self::IndexLiteralTooBig { .. }
            | Self::ArgumentIndexOutOfRange { .. }
            | Self::AutomaticToManual { .. }
            | Self::ManualToAutomatic { .. } => ErrorClass::Pattern,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Byte offset into the pattern where the failure was detected, if known.
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::TwoOpenBraces { position }
            | Self::UnmatchedCloseBrace { position }
            | Self::NotANumber { position }
            | Self::AutomaticToManual { position }
            | Self::ManualToAutomatic { position } => Some(*position),
            _ => None,
        }
    }

    /// Whether the caller can fix this by changing the query.
    pub const fn is_user_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::MalformedColumn { .. })
    }

    /// Whether the pattern has a brace that is not matched.
    pub const fn is_brace_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TwoOpenBraces { .. } | Self::UnmatchedCloseBrace { .. } | Self::UnclosedBrace
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::TwoOpenBraces { .. } | Self::UnmatchedCloseBrace { .. } | Self::UnclosedBrace => {
                Some("Write literal braces as {{ and }}")
            }
            Self::AutomaticToManual { .. } | Self::ManualToAutomatic { .. } => {
                Some("Use either {} everywhere or {N} everywhere in one pattern")
            }
            Self::ArgumentIndexOutOfRange { .. } => {
                Some("Placeholder indices start from zero at the first argument after the pattern")
            }
            Self::NonConstantPattern { .. } => Some("Pass the pattern as a literal string"),
            _ => None,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a malformed column error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedColumn {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `FormatError`.
pub type Result<T> = std::result::Result<T, FormatError>;
