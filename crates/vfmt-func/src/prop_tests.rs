//! Property-based tests: batch formatter output equivalence.
//!
//! Each property builds the expected rows by plain concatenation and asserts
//! that both copy strategies and the row-at-a-time formatter agree with it.

#[cfg(test)]
mod tests {
    use crate::execute::{ArgumentColumn, execute_naive, execute_pattern};
    use crate::options::{CopyStrategy, FormatOptions};
    use crate::pattern::{PatternArgument, parse_pattern};
    use proptest::prelude::*;
    use vfmt_types::StringColumn;

    // ── Helpers ────────────────────────────────────────────────────────────

    fn escape(literal: &str) -> String {
        literal.replace('{', "{{").replace('}', "}}")
    }

    /// Pattern with manual placeholders plus the rows it should produce.
    fn build_case(
        pieces: &[(String, usize)],
        tail: &str,
        columns: &[Vec<Vec<u8>>],
        rows: usize,
    ) -> (String, Vec<Vec<u8>>) {
        let mut pattern = String::new();
        for (literal, index) in pieces {
            pattern.push_str(&escape(literal));
            pattern.push_str(&format!("{{{index}}}"));
        }
        pattern.push_str(&escape(tail));

        let expected = (0..rows)
            .map(|row| {
                let mut out = Vec::new();
                for (literal, index) in pieces {
                    out.extend_from_slice(literal.as_bytes());
                    out.extend_from_slice(&columns[*index][row]);
                }
                out.extend_from_slice(tail.as_bytes());
                out
            })
            .collect();
        (pattern, expected)
    }

    fn rows_of(column: &StringColumn) -> Vec<Vec<u8>> {
        column.iter().map(<[u8]>::to_vec).collect()
    }

    // ── Proptest Strategies ───────────────────────────────────────────────

    /// Never starts with `}`: after a placeholder the closing brace would
    /// pair with it as a `}}` escape.
    fn literal() -> impl Strategy<Value = String> {
        "([a-z {][a-z {}]{0,39})?"
    }

    /// (rows, columns, placeholder pieces, tail literal)
    #[allow(clippy::type_complexity)]
    fn format_case()
    -> impl Strategy<Value = (usize, Vec<Vec<Vec<u8>>>, Vec<(String, usize)>, String)> {
        (0_usize..24, 1_usize..5).prop_flat_map(|(rows, cols)| {
            (
                Just(rows),
                prop::collection::vec(
                    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..24), rows),
                    cols,
                ),
                prop::collection::vec((literal(), 0..cols), 0..8),
                literal(),
            )
        })
    }

    // ── Properties ─────────────────────────────────────────────────────────

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_batch_matches_concatenation(
            (rows, columns, pieces, tail) in format_case(),
            delimiter in any::<u8>(),
        ) {
            let (pattern, expected) = build_case(&pieces, &tail, &columns, rows);
            let string_columns: Vec<StringColumn> =
                columns.iter().map(StringColumn::from_values).collect();
            let arguments: Vec<ArgumentColumn<'_>> =
                string_columns.iter().map(ArgumentColumn::Variable).collect();
            let pattern_args: Vec<PatternArgument<'_>> =
                arguments.iter().map(ArgumentColumn::as_pattern_argument).collect();
            let parsed = parse_pattern(pattern.as_bytes(), &pattern_args).unwrap();

            for strategy in [CopyStrategy::Exact, CopyStrategy::Padded] {
                let options = FormatOptions::default()
                    .with_delimiter(delimiter)
                    .with_copy_strategy(strategy);
                let out = execute_pattern(&parsed, &arguments, rows, &options).unwrap();
                prop_assert_eq!(out.len(), rows);
                prop_assert_eq!(rows_of(&out), expected.clone());
                let expected_bytes: usize = expected.iter().map(|row| row.len() + 1).sum();
                prop_assert_eq!(out.chars().len(), expected_bytes);
                for (row, &end) in out.offsets().iter().enumerate() {
                    prop_assert_eq!(out.chars()[end as usize - 1], delimiter, "row {}", row);
                }
            }

            let naive = execute_naive(&parsed, &arguments, rows, delimiter);
            prop_assert_eq!(rows_of(&naive), expected);
        }

        #[test]
        fn prop_escaped_literal_roundtrips(text in "[a-z {}]{0,64}") {
            let pattern = escape(&text);
            let parsed = parse_pattern(pattern.as_bytes(), &[PatternArgument::Dynamic]).unwrap();
            prop_assert!(parsed.references().is_empty());
            let expected = vec![text.into_bytes()];
            prop_assert_eq!(parsed.fragments(), expected.as_slice());
        }

        #[test]
        fn prop_constant_arguments_fold_like_literals(
            first in "[a-z{}]{0,12}",
            second in "[a-z{}]{0,12}",
            values in prop::collection::vec("[a-z]{0,8}", 0..16),
        ) {
            let rows = values.len();
            let column = StringColumn::from_values(&values);
            let arguments = [
                ArgumentColumn::Constant(first.as_bytes()),
                ArgumentColumn::Variable(&column),
                ArgumentColumn::Constant(second.as_bytes()),
            ];
            let pattern_args: Vec<PatternArgument<'_>> =
                arguments.iter().map(ArgumentColumn::as_pattern_argument).collect();
            let folded = parse_pattern(b"<{0}|{1}|{2}>", &pattern_args).unwrap();

            let substituted = format!("<{}|{{0}}|{}>", escape(&first), escape(&second));
            let column_only = [ArgumentColumn::Variable(&column)];
            let direct = parse_pattern(
                substituted.as_bytes(),
                &[PatternArgument::Dynamic],
            )
            .unwrap();
            prop_assert_eq!(folded.fragments(), direct.fragments());
            prop_assert_eq!(folded.references(), &[1][..]);

            let options = FormatOptions::default();
            let lhs = execute_pattern(&folded, &arguments, rows, &options).unwrap();
            let rhs = execute_pattern(&direct, &column_only, rows, &options).unwrap();
            prop_assert_eq!(lhs, rhs);
        }
    }
}
