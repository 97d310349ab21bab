//! Format pattern parser.
//!
//! Turns a pattern such as `Hello {} world {}` into literal fragments
//! (`["Hello ", " world ", ""]`) and the argument indices substituted between
//! them. Constant arguments are folded into the fragments here, so the
//! executor only ever sees per-row references.
//!
//! Escapes: `{{` and `}}` each stand for one literal brace, including inside
//! an open placeholder.

use vfmt_error::{FormatError, Result};
use vfmt_types::limits::ARGUMENT_THRESHOLD;

/// What the parser needs to know about one formatting argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternArgument<'a> {
    /// Value varies per row; placeholders become references.
    Dynamic,
    /// Value shared by all rows; placeholders are folded into the literals.
    Constant(&'a [u8]),
}

/// Output of [`parse_pattern`].
///
/// Invariant: `fragments.len() == references.len() + 1`. Fragment `i` is
/// emitted right before the value of reference `i`; the last fragment closes
/// the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    fragments: Vec<Vec<u8>>,
    references: Vec<usize>,
}

impl ParsedPattern {
    /// Literal fragments, escapes collapsed and constants folded in.
    #[must_use]
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Argument indices of per-row placeholders, in pattern order.
    #[must_use]
    pub fn references(&self) -> &[usize] {
        &self.references
    }

    /// Total literal bytes emitted per row.
    #[must_use]
    pub fn literal_len(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    /// True when every row formats to the same bytes.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.references.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Unset,
    Automatic,
    Manual,
}

/// Parse `pattern` against the formatting arguments (the pattern itself
/// excluded, so placeholder `{0}` names `arguments[0]`).
///
/// # Errors
///
/// Returns a pattern error for unbalanced braces, non-decimal placeholder
/// contents, index literals reaching [`ARGUMENT_THRESHOLD`], indices past the
/// end of `arguments`, and mixed `{}` / `{N}` numbering.
pub fn parse_pattern(pattern: &[u8], arguments: &[PatternArgument<'_>]) -> Result<ParsedPattern> {
    let mut fragments: Vec<Vec<u8>> = Vec::new();
    let mut references = Vec::new();

    let mut is_open = false;
    // Position right after the last unescaped `{`.
    let mut last_open = 0_usize;
    let mut numbering = Numbering::Unset;
    let mut next_automatic = 0_usize;
    // Start of the literal run not yet flushed into `fragments`.
    let mut start = 0_usize;
    // Set after a folded constant: the next literal continues the last fragment.
    let mut glue = false;

    let mut i = 0;
    while i < pattern.len() {
        match pattern[i] {
            b'{' => {
                if pattern.get(i + 1) == Some(&b'{') {
                    i += 2;
                    continue;
                }
                if is_open {
                    return Err(FormatError::TwoOpenBraces { position: i });
                }
                push_literal(&mut fragments, &pattern[start..i], glue);
                glue = false;
                is_open = true;
                last_open = i + 1;
            }
            b'}' => {
                if pattern.get(i + 1) == Some(&b'}') {
                    i += 2;
                    continue;
                }
                if !is_open {
                    return Err(FormatError::UnmatchedCloseBrace { position: i });
                }
                is_open = false;

                let index = if last_open == i {
                    if numbering == Numbering::Manual {
                        return Err(FormatError::ManualToAutomatic { position: i });
                    }
                    numbering = Numbering::Automatic;
                    let index = next_automatic;
                    next_automatic += 1;
                    index
                } else {
                    let index = parse_index(pattern, last_open, i)?;
                    if numbering == Numbering::Automatic {
                        return Err(FormatError::AutomaticToManual { position: last_open });
                    }
                    numbering = Numbering::Manual;
                    index
                };

                let Some(argument) = arguments.get(index) else {
                    return Err(FormatError::ArgumentIndexOutOfRange {
                        index,
                        available: arguments.len(),
                    });
                };

                match argument {
                    PatternArgument::Constant(value) => {
                        // The matching `{` always flushed a fragment.
                        let last = fragments.last_mut().ok_or_else(|| {
                            FormatError::internal("constant placeholder without a fragment")
                        })?;
                        last.extend_from_slice(value);
                        glue = true;
                    }
                    PatternArgument::Dynamic => references.push(index),
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if is_open {
        return Err(FormatError::UnclosedBrace);
    }
    push_literal(&mut fragments, &pattern[start..], glue);

    tracing::trace!(
        pattern_len = pattern.len(),
        fragments = fragments.len(),
        references = references.len(),
        "pattern parsed"
    );
    debug_assert_eq!(fragments.len(), references.len() + 1);

    Ok(ParsedPattern {
        fragments,
        references,
    })
}

/// Parse the decimal index in `pattern[from..to]`.
fn parse_index(pattern: &[u8], from: usize, to: usize) -> Result<usize> {
    let mut value = 0_usize;
    for (position, &byte) in pattern.iter().enumerate().take(to).skip(from) {
        if !byte.is_ascii_digit() {
            return Err(FormatError::NotANumber { position });
        }
        value = value * 10 + usize::from(byte - b'0');
        if value >= ARGUMENT_THRESHOLD {
            return Err(FormatError::IndexLiteralTooBig {
                max: ARGUMENT_THRESHOLD,
            });
        }
    }
    Ok(value)
}

fn push_literal(fragments: &mut Vec<Vec<u8>>, raw: &[u8], glue: bool) {
    match fragments.last_mut() {
        Some(last) if glue => collapse_escapes(raw, last),
        _ => {
            let mut fragment = Vec::with_capacity(raw.len());
            collapse_escapes(raw, &mut fragment);
            fragments.push(fragment);
        }
    }
}

/// Append `raw` to `out` with every `{{` / `}}` reduced to one brace.
fn collapse_escapes(raw: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < raw.len() {
        let byte = raw[i];
        out.push(byte);
        if (byte == b'{' || byte == b'}') && raw.get(i + 1) == Some(&byte) {
            i += 2;
        } else {
            i += 1;
        }
    }
}
