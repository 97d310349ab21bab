//! Vectorized `format(pattern, args...)` over string column batches.
//!
//! The pattern is parsed once per batch into literal fragments and argument
//! references ([`pattern`]); constant arguments are folded into the
//! fragments. The executor ([`execute`]) sizes the output exactly, allocates
//! once, then writes every row in a single pass.

pub mod execute;
pub mod format;
pub mod metrics;
pub mod options;
pub mod pattern;
pub mod registry;

mod prop_tests;

pub use execute::{ArgumentColumn, RowSource, execute_naive, execute_pattern};
pub use format::{FormatFunction, ScalarFunction, format_rows};
pub use metrics::{FormatMetricsSnapshot, format_metrics_snapshot};
pub use options::{CopyStrategy, FormatOptions};
pub use pattern::{ParsedPattern, PatternArgument, parse_pattern};
pub use registry::FunctionRegistry;
