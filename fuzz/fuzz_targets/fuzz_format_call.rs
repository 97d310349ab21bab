#![no_main]

//! Fuzz a full `format` call over small batches.
//!
//! Both copy strategies must agree: the same output column or the same
//! error. Successful output must hold exactly one row per input row.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use vfmt_func::{FormatFunction, FormatOptions, ScalarFunction};
use vfmt_types::{Column, FixedStringColumn, StringColumn};

const MAX_ROWS: usize = 64;

#[derive(Debug, Arbitrary)]
enum FuzzArgument {
    Variable(Vec<Vec<u8>>),
    Fixed { width: u8, values: Vec<Vec<u8>> },
    Constant(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    pattern: Vec<u8>,
    rows: u8,
    delimiter: u8,
    arguments: Vec<FuzzArgument>,
}

fn cell(values: &[Vec<u8>], row: usize) -> &[u8] {
    if values.is_empty() {
        &[]
    } else {
        &values[row % values.len()]
    }
}

impl FuzzArgument {
    fn to_column(&self, rows: usize) -> Column {
        match self {
            Self::Variable(values) => {
                Column::from(StringColumn::from_values((0..rows).map(|row| cell(values, row))))
            }
            Self::Fixed { width, values } => {
                let width = usize::from(*width % 16) + 1;
                let cells = (0..rows).map(|row| {
                    let value = cell(values, row);
                    &value[..value.len().min(width)]
                });
                Column::from(
                    FixedStringColumn::from_values(cells, width)
                        .expect("truncated values fit the width"),
                )
            }
            Self::Constant(value) => Column::const_string(value, rows),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    if input.pattern.len() > 1024 || input.arguments.len() > 16 {
        return;
    }
    let rows = usize::from(input.rows) % (MAX_ROWS + 1);

    let mut call = vec![Column::const_string(&input.pattern, rows)];
    call.extend(input.arguments.iter().map(|argument| argument.to_column(rows)));

    let exact = FormatOptions::exact().with_delimiter(input.delimiter);
    let padded = FormatOptions::default().with_delimiter(input.delimiter);
    let lhs = FormatFunction::with_options(exact).execute(&call, rows);
    let rhs = FormatFunction::with_options(padded).execute(&call, rows);
    assert_eq!(lhs, rhs);

    if let Ok(column) = lhs {
        assert_eq!(column.len(), rows);
    }
});
