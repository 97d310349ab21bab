//! Function registry keyed by case-insensitive name.
//!
//! Pre-populated with [`FormatFunction`]. Callers may register further
//! scalar functions or replace the built-in one.
#![allow(clippy::unnecessary_literal_bound)]

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use vfmt_error::Result;
use vfmt_types::Column;

use crate::format::{FormatFunction, ScalarFunction};
use crate::options::FormatOptions;

/// Registry for scalar functions, keyed by case-insensitive name.
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn ScalarFunction>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a registry holding `format` with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_format_options(FormatOptions::default())
    }

    /// Create a registry whose `format` uses `options`.
    #[must_use]
    pub fn with_format_options(options: FormatOptions) -> Self {
        let mut functions = HashMap::with_capacity(1);
        functions.insert(
            FormatFunction::NAME.to_ascii_lowercase(),
            Arc::new(FormatFunction::with_options(options)) as Arc<dyn ScalarFunction>,
        );
        Self { functions }
    }

    /// Register a function. Returns the previous function with the same
    /// name if one existed (overwrites).
    pub fn register<F: ScalarFunction + 'static>(
        &mut self,
        function: F,
    ) -> Option<Arc<dyn ScalarFunction>> {
        let name = function.name().to_ascii_lowercase();
        info!(function_name = %name, "scalar function registration");
        self.functions.insert(name, Arc::new(function))
    }

    /// Look up a function by name (case-insensitive).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<dyn ScalarFunction>> {
        let canon = name.to_ascii_lowercase();
        let result = self.functions.get(&canon).cloned();
        debug!(
            function = %canon,
            hit = result.is_some(),
            "function registry lookup"
        );
        result
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolve `name` and evaluate it. `None` when no such function exists.
    pub fn call(
        &self,
        name: &str,
        arguments: &[Column],
        row_count: usize,
    ) -> Option<Result<Column>> {
        self.find(name)
            .map(|function| function.execute(arguments, row_count))
    }
}
