// End-to-end scenarios for `format(pattern, args...)` over column batches.
//
// Categories:
//   1. Numbering (automatic, manual, mixed)
//   2. Escaping and constant folding
//   3. Fixed/variable column mixes at batch scale
//   4. Structural and binding failures
//   5. Registry dispatch and concurrent batches

use std::sync::Arc;
use std::thread;

use vfmt_error::{ErrorClass, FormatError};
use vfmt_func::{FormatFunction, FormatOptions, FunctionRegistry, ScalarFunction, format_rows};
use vfmt_types::limits::ARGUMENT_THRESHOLD;
use vfmt_types::{Column, DataType, FixedStringColumn, StringColumn};

// ── Helpers ───────────────────────────────────────────────────────────────

fn strings<V: AsRef<[u8]>>(values: &[V]) -> Column {
    Column::from(StringColumn::from_values(values))
}

fn as_strings(column: &Column) -> &StringColumn {
    match column {
        Column::String(values) => values,
        other => panic!("expected string column, got {other:?}"),
    }
}

fn rows(column: &Column) -> Vec<String> {
    as_strings(column)
        .iter()
        .map(|v| String::from_utf8(v.to_vec()).expect("utf8 row"))
        .collect()
}

fn format_ok(pattern: &str, arguments: &[Column], row_count: usize) -> Column {
    format_rows(pattern.as_bytes(), arguments, row_count).expect("format should succeed")
}

fn format_err(pattern: &str, arguments: &[Column], row_count: usize) -> FormatError {
    format_rows(pattern.as_bytes(), arguments, row_count).expect_err("format should fail")
}

// ── 1. Numbering ──────────────────────────────────────────────────────────

#[test]
fn automatic_numbering() {
    let out = format_ok(
        "{} {} {}",
        &[strings(&["a"]), strings(&["b"]), strings(&["c"])],
        1,
    );
    assert_eq!(rows(&out), vec!["a b c"]);
}

#[test]
fn manual_numbering_reorders() {
    let out = format_ok(
        "{2} {0} {1}",
        &[strings(&["a"]), strings(&["b"]), strings(&["c"])],
        1,
    );
    assert_eq!(rows(&out), vec!["c a b"]);
}

#[test]
fn manual_numbering_repeats_an_argument() {
    let out = format_ok("{0}{0}-{1}", &[strings(&["ab", "c"]), strings(&["x", "y"])], 2);
    assert_eq!(rows(&out), vec!["abab-x", "cc-y"]);
}

#[test]
fn mixed_numbering_rejected_regardless_of_values() {
    for values in [["a"], [""], ["{}"]] {
        let error = format_err("{} {0}", &[strings(&values), strings(&values)], 1);
        assert_eq!(error, FormatError::AutomaticToManual { position: 4 });
        assert_eq!(error.error_class(), ErrorClass::Pattern);
    }
}

// ── 2. Escaping and constant folding ──────────────────────────────────────

#[test]
fn escaped_literal_roundtrips_for_any_row_count() {
    let text = "{json: {\"k\": [1, 2]}} }{";
    let pattern = text.replace('{', "{{").replace('}', "}}");
    for row_count in [0, 1, 7, 64] {
        let dummy: Vec<String> = (0..row_count).map(|i| i.to_string()).collect();
        let out = format_ok(&pattern, &[strings(&dummy)], row_count);
        assert_eq!(rows(&out), vec![text.to_owned(); row_count]);
    }
}

#[test]
fn constant_folding_matches_presubstitution() {
    let dynamic = strings(&["1", "22", ""]);
    let folded = format_ok(
        "X{0}Y{1}",
        &[Column::const_string("Z", 3), dynamic.clone()],
        3,
    );
    let substituted = format_ok("XZY{0}", &[dynamic], 3);
    assert_eq!(folded, substituted);
    assert_eq!(rows(&folded), vec!["XZY1", "XZY22", "XZY"]);
}

#[test]
fn constant_with_braces_is_not_reinterpreted() {
    let out = format_ok(
        "{0}|{1}",
        &[Column::const_string("{}}}", 2), strings(&["a", "b"])],
        2,
    );
    assert_eq!(rows(&out), vec!["{}}}|a", "{}}}|b"]);
}

#[test]
fn fully_constant_pattern_repeats_per_row() {
    let out = format_ok("[{0}]", &[Column::const_string("k", 5)], 5);
    assert_eq!(rows(&out), vec!["[k]"; 5]);
    assert_eq!(as_strings(&out).chars().len(), 5 * 4);
}

// ── 3. Fixed/variable mixes ───────────────────────────────────────────────

#[test]
fn fixed_and_variable_columns_over_a_thousand_rows() {
    const ROWS: usize = 1000;
    let codes: Vec<String> = (0..ROWS).map(|i| format!("{:03}", i % 1000)).collect();
    let names: Vec<String> = (0..ROWS).map(|i| "n".repeat(i % 7)).collect();
    let fixed = Column::from(FixedStringColumn::from_values(&codes, 3).expect("fixed"));

    let pattern = "id={} name={};";
    let out = format_ok(pattern, &[fixed, strings(&names)], ROWS);
    let column = as_strings(&out);

    let fragment_len = "id=".len() + " name=".len() + ";".len();
    let variable_len: usize = names.iter().map(String::len).sum();
    assert_eq!(
        column.chars().len(),
        fragment_len * ROWS + ROWS * 3 + variable_len + ROWS
    );
    assert_eq!(column.len(), ROWS);
    assert!(column.offsets().windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(column.value(42), b"id=042 name=;");
    assert_eq!(column.value(999), format!("id=999 name={};", "n".repeat(999 % 7)).as_bytes());
}

#[test]
fn fixed_string_values_keep_padding() {
    let fixed = Column::from(FixedStringColumn::from_values(["a", "bcd"], 3).expect("fixed"));
    let out = format_ok("<{}>", &[fixed], 2);
    let column = as_strings(&out);
    assert_eq!(column.value(0), b"<a\0\0>");
    assert_eq!(column.value(1), b"<bcd>");
}

#[test]
fn exact_and_padded_copies_agree() {
    let long = "a fairly long literal fragment that spans several copy blocks ";
    let pattern = format!("{long}{{}}{long}{{}}!");
    let args = [strings(&["x", "", "yz"]), strings(&["1", "2", "3"])];
    let call: Vec<Column> = std::iter::once(Column::const_string(&pattern, 3))
        .chain(args.iter().cloned())
        .collect();

    let exact = FormatFunction::with_options(FormatOptions::exact())
        .execute(&call, 3)
        .expect("exact");
    let padded = FormatFunction::new().execute(&call, 3).expect("padded");
    assert_eq!(exact, padded);
    assert_eq!(rows(&exact)[2], format!("{long}yz{long}3!"));
}

// ── 4. Failures ───────────────────────────────────────────────────────────

#[test]
fn index_out_of_range() {
    let error = format_err("{5}", &[strings(&["a"]), strings(&["b"])], 1);
    assert_eq!(
        error,
        FormatError::ArgumentIndexOutOfRange {
            index: 5,
            available: 2
        }
    );
}

#[test]
fn unbalanced_braces() {
    for pattern in ["{a", "a}", "{{}"] {
        let error = format_err(pattern, &[strings(&["v"])], 1);
        assert!(error.is_brace_mismatch(), "{pattern}: {error:?}");
        assert!(error.suggestion().is_some());
    }
}

#[test]
fn argument_threshold_at_binding_time() {
    let column = strings(&["v"]);
    let too_many = vec![column.clone(); ARGUMENT_THRESHOLD + 1];
    let error = format_err("{}", &too_many, 1);
    assert_eq!(
        error,
        FormatError::TooManyArguments {
            function: "format".to_owned(),
            passed: ARGUMENT_THRESHOLD + 2,
            max: ARGUMENT_THRESHOLD,
        }
    );
    assert_eq!(error.error_class(), ErrorClass::Binding);

    let at_limit = vec![column; ARGUMENT_THRESHOLD - 1];
    let out = format_ok("{1022}", &at_limit, 1);
    assert_eq!(rows(&out), vec!["v"]);
}

#[test]
fn index_literal_reaching_threshold_fails_at_parse_time() {
    let error = format_err("{1024}", &[strings(&["v"])], 1);
    assert_eq!(error, FormatError::IndexLiteralTooBig { max: 1024 });
    let error = format_err("{99999999999999999999}", &[strings(&["v"])], 1);
    assert_eq!(error, FormatError::IndexLiteralTooBig { max: 1024 });
}

#[test]
fn binding_errors_carry_argument_positions() {
    let function = FormatFunction::new();
    let error = function
        .return_type(&[DataType::String, DataType::Float64])
        .expect_err("float argument");
    assert!(matches!(
        error,
        FormatError::IllegalTypeOfArgument { position: 2, .. }
    ));
    assert!(error.is_user_recoverable());

    let error = function
        .execute(&[strings(&["{}"]), strings(&["a"])], 1)
        .expect_err("non-constant pattern");
    assert_eq!(error.error_class(), ErrorClass::Binding);

    let error = format_err("{}", &[], 0);
    assert!(matches!(error, FormatError::TooFewArguments { passed: 1, .. }));
}

// ── 5. Registry and concurrency ───────────────────────────────────────────

#[test]
fn registry_dispatch_uses_configured_options() {
    let registry = FunctionRegistry::with_format_options(FormatOptions::lines());
    let args = [Column::const_string("{}={}", 2), strings(&["a", "b"]), strings(&["1", "2"])];
    let out = registry
        .call("format", &args, 2)
        .expect("format is registered")
        .expect("format");
    assert_eq!(as_strings(&out).chars(), b"a=1\nb=2\n");
}

#[test]
fn independent_batches_format_concurrently() {
    let function = Arc::new(FormatFunction::new());
    let handles: Vec<_> = (0..4)
        .map(|batch| {
            let function = Arc::clone(&function);
            thread::spawn(move || {
                let values: Vec<String> = (0..256).map(|i| format!("{batch}:{i}")).collect();
                let args = [Column::const_string("<{}>", values.len()), strings(&values)];
                let out = function.execute(&args, values.len()).expect("format");
                (batch, rows(&out))
            })
        })
        .collect();

    for handle in handles {
        let (batch, out) = handle.join().expect("thread");
        assert_eq!(out.len(), 256);
        assert_eq!(out[17], format!("<{batch}:17>"));
    }
}
