//! The `format` scalar function: binding checks, argument classification,
//! then parse and execute.

use tracing::debug;
use vfmt_error::{FormatError, Result};
use vfmt_types::limits::{ARGUMENT_THRESHOLD, MIN_FORMAT_ARGUMENTS};
use vfmt_types::{Column, DataType};

use crate::execute::{ArgumentColumn, execute_pattern};
use crate::options::FormatOptions;
use crate::pattern::{PatternArgument, parse_pattern};

/// A vectorized scalar function callable by name.
///
/// Implementations must be pure: the same arguments always produce the same
/// column.
pub trait ScalarFunction: Send + Sync {
    /// Function name (case-insensitive at lookup).
    fn name(&self) -> &str;

    /// Validate argument types and report the result type.
    fn return_type(&self, arguments: &[DataType]) -> Result<DataType>;

    /// Evaluate over one batch of `row_count` rows.
    fn execute(&self, arguments: &[Column], row_count: usize) -> Result<Column>;
}

/// `format(pattern, arg0, arg1, ...)`.
///
/// The pattern must be a constant string. Formatting arguments are string
/// or fixed-string columns or constants; placeholder `{0}` names `arg0`.
#[derive(Debug, Clone, Default)]
pub struct FormatFunction {
    options: FormatOptions,
}

impl FormatFunction {
    pub const NAME: &'static str = "format";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_options(options: FormatOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &FormatOptions {
        &self.options
    }

    fn check_argument_count(passed: usize) -> Result<()> {
        if passed < MIN_FORMAT_ARGUMENTS + 1 {
            return Err(FormatError::TooFewArguments {
                function: Self::NAME.to_owned(),
                passed,
                min: MIN_FORMAT_ARGUMENTS + 1,
            });
        }
        if passed > ARGUMENT_THRESHOLD {
            return Err(FormatError::TooManyArguments {
                function: Self::NAME.to_owned(),
                passed,
                max: ARGUMENT_THRESHOLD,
            });
        }
        Ok(())
    }

    /// Map each formatting column (pattern excluded) to its executor view.
    fn classify<'a>(
        arguments: &'a [Column],
        row_count: usize,
    ) -> Result<Vec<ArgumentColumn<'a>>> {
        let mut classified = Vec::with_capacity(arguments.len());
        for (offset, column) in arguments.iter().enumerate() {
            // 1-based call position; the pattern is argument 1.
            let position = offset + 2;
            let argument = match column {
                Column::String(values) => ArgumentColumn::Variable(values),
                Column::FixedString(values) => ArgumentColumn::Fixed(values),
                Column::Const(constant) => match constant.value().as_bytes() {
                    Some(bytes) => ArgumentColumn::Constant(bytes),
                    None => return Err(Self::illegal_column(column, position)),
                },
                Column::Int64(_) | Column::Float64(_) => {
                    return Err(Self::illegal_column(column, position));
                }
            };
            if !column.is_const() && column.len() != row_count {
                return Err(FormatError::ColumnLengthMismatch {
                    position,
                    expected: row_count,
                    actual: column.len(),
                });
            }
            classified.push(argument);
        }
        Ok(classified)
    }

    fn illegal_column(column: &Column, position: usize) -> FormatError {
        FormatError::IllegalColumn {
            function: Self::NAME.to_owned(),
            column: column.name(),
            position,
        }
    }
}

impl ScalarFunction for FormatFunction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn return_type(&self, arguments: &[DataType]) -> Result<DataType> {
        Self::check_argument_count(arguments.len())?;
        for (offset, data_type) in arguments.iter().enumerate() {
            if !data_type.is_string_or_fixed_string() {
                debug!(position = offset + 1, %data_type, "format argument type rejected");
                return Err(FormatError::IllegalTypeOfArgument {
                    function: Self::NAME.to_owned(),
                    data_type: data_type.to_string(),
                    position: offset + 1,
                });
            }
        }
        Ok(DataType::String)
    }

    fn execute(&self, arguments: &[Column], row_count: usize) -> Result<Column> {
        let types: Vec<DataType> = arguments.iter().map(Column::data_type).collect();
        self.return_type(&types)?;

        let Some((pattern_column, rest)) = arguments.split_first() else {
            return Err(FormatError::internal("argument count checked above"));
        };
        let pattern = match pattern_column {
            Column::Const(constant) => constant.value().as_bytes(),
            _ => None,
        };
        let Some(pattern) = pattern else {
            debug!(column = %pattern_column.name(), "format pattern is not constant");
            return Err(FormatError::NonConstantPattern {
                function: Self::NAME.to_owned(),
            });
        };

        let columns = Self::classify(rest, row_count)?;
        let pattern_args: Vec<PatternArgument<'_>> = columns
            .iter()
            .map(ArgumentColumn::as_pattern_argument)
            .collect();
        let parsed = parse_pattern(pattern, &pattern_args)?;

        execute_pattern(&parsed, &columns, row_count, &self.options).map(Column::String)
    }
}

/// Format `row_count` rows with the default options.
///
/// `arguments` excludes the pattern; `pattern` is bound as a constant.
pub fn format_rows(pattern: &[u8], arguments: &[Column], row_count: usize) -> Result<Column> {
    let mut call = Vec::with_capacity(arguments.len() + 1);
    call.push(Column::const_string(pattern, row_count));
    call.extend_from_slice(arguments);
    FormatFunction::new().execute(&call, row_count)
}
