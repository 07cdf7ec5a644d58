// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use takein::destination::resolve;
use takein::tokenizer::{split_fragments, TokenRule};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    text: &'a str,
    separators: &'a str,
    keys: &'a str,
    pattern: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let rule = TokenRule::from_fields(input.separators, input.keys);

    let fragments = split_fragments(input.text, &rule.separators);
    assert!(!fragments.is_empty());

    if let Ok(env) = rule.tokenize(input.text) {
        assert!(!env.contains_key("_"));
        assert!(!env.contains_key("..."));
        let _ = resolve(input.text, input.pattern, &env);
    }
});
