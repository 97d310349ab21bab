#![no_main]

//! Fuzz the pattern parser with arbitrary bytes.
//!
//! The first byte picks how many arguments exist and which of them are
//! constants; the rest is the pattern. Parsing must never panic, and every
//! successful parse must keep one more fragment than references.

use libfuzzer_sys::fuzz_target;
use vfmt_func::{PatternArgument, parse_pattern};

fuzz_target!(|data: &[u8]| {
    let Some((&shape, pattern)) = data.split_first() else {
        return;
    };
    if pattern.len() > 4096 {
        return;
    }

    let count = usize::from(shape & 0x07) + 1;
    let arguments: Vec<PatternArgument<'_>> = (0..count)
        .map(|index| {
            if shape & (0x08 << (index % 5)) != 0 {
                PatternArgument::Constant(b"{c}")
            } else {
                PatternArgument::Dynamic
            }
        })
        .collect();

    if let Ok(parsed) = parse_pattern(pattern, &arguments) {
        assert_eq!(parsed.fragments().len(), parsed.references().len() + 1);
        for &index in parsed.references() {
            assert_eq!(arguments[index], PatternArgument::Dynamic);
        }
    }
});
