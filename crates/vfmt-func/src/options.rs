//! Tunables for one formatting call.

use serde::{Deserialize, Serialize};
use vfmt_types::limits::DEFAULT_DELIMITER;

/// How literal fragments are copied into the output buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStrategy {
    /// Bounded copy of exactly the fragment bytes.
    Exact,
    /// Fixed-size block copies that may overrun the fragment end into
    /// slack carried by both the fragment and the output buffer.
    #[default]
    Padded,
}

impl CopyStrategy {
    /// Label recorded in tracing spans.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Padded => "padded",
        }
    }
}

/// Options applied by the batch executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Byte written after every output row and counted in its offset.
    pub delimiter: u8,
    /// Fragment copy routine.
    pub copy_strategy: CopyStrategy,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            copy_strategy: CopyStrategy::Padded,
        }
    }
}

impl FormatOptions {
    /// Default delimiter with exact copies.
    #[must_use]
    pub fn exact() -> Self {
        Self {
            copy_strategy: CopyStrategy::Exact,
            ..Self::default()
        }
    }

    /// Newline-terminated rows, for writing output straight to a text sink.
    #[must_use]
    pub fn lines() -> Self {
        Self {
            delimiter: b'\n',
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_copy_strategy(mut self, copy_strategy: CopyStrategy) -> Self {
        self.copy_strategy = copy_strategy;
        self
    }

    /// Load options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
