// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Separator/key tokenizer
//!
//! Splits a string on a set of literal separators and binds the resulting
//! fragments to named keys. A key of `_` swallows its fragment, and a single
//! `...` divider lets the leading keys bind from the left and the trailing
//! keys bind from the right, discarding whatever lies between.

use std::collections::BTreeMap;

use crate::{Result, TakeinError};

/// Key that consumes a fragment without recording it
pub const DISCARD_KEY: &str = "_";

/// Key-list marker splitting left-bound keys from right-bound keys
pub const WILDCARD_DIVIDER: &str = "...";

/// Key name to extracted value
pub type Environment = BTreeMap<String, String>;

/// A separator list and key list applied together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRule {
    pub separators: Vec<String>,
    pub keys: Vec<String>,
}

impl TokenRule {
    /// Build a rule from whitespace-separated separator and key fields
    pub fn from_fields(separators: &str, keys: &str) -> Self {
        Self {
            separators: separators.split_whitespace().map(String::from).collect(),
            keys: keys.split_whitespace().map(String::from).collect(),
        }
    }

    /// Tokenize `input` with this rule
    pub fn tokenize(&self, input: &str) -> Result<Environment> {
        tokenize(input, &self.separators, &self.keys)
    }
}

/// Split `input` into fragments.
///
/// At each step the separator matching earliest in the remaining text wins;
/// list order only breaks ties between separators matching at the same
/// position. Whitespace-only separators never split.
pub fn split_fragments<'a, S: AsRef<str>>(input: &'a str, separators: &[S]) -> Vec<&'a str> {
    let active: Vec<&str> = separators
        .iter()
        .map(AsRef::as_ref)
        .filter(|sep| !sep.trim().is_empty())
        .collect();

    let mut fragments = Vec::new();
    let mut remain = input;
    loop {
        let mut cut: Option<(usize, usize)> = None;
        for sep in &active {
            if let Some(idx) = remain.find(sep) {
                if cut.map_or(true, |(best, _)| idx < best) {
                    cut = Some((idx, sep.len()));
                }
            }
        }
        match cut {
            Some((idx, len)) => {
                fragments.push(&remain[..idx]);
                remain = &remain[idx + len..];
            }
            None => {
                fragments.push(remain);
                return fragments;
            }
        }
    }
}

/// Tokenize `input` and bind its fragments to `keys`.
pub fn tokenize<S, K>(input: &str, separators: &[S], keys: &[K]) -> Result<Environment>
where
    S: AsRef<str>,
    K: AsRef<str>,
{
    let keys: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();

    let mut divider = None;
    for (i, key) in keys.iter().enumerate() {
        if *key == WILDCARD_DIVIDER {
            if divider.is_some() {
                return Err(TakeinError::MultipleDividers);
            }
            divider = Some(i);
        }
    }

    let values = split_fragments(input, separators);

    let (left, right) = match divider {
        None => {
            if values.len() > keys.len() {
                return Err(TakeinError::TooManyValues(input.to_string()));
            }
            if values.len() < keys.len() {
                return Err(TakeinError::NotEnoughValues(input.to_string()));
            }
            (&keys[..], &keys[keys.len()..])
        }
        Some(idx) => {
            if values.len() < keys.len() - 1 {
                return Err(TakeinError::NotEnoughValues(input.to_string()));
            }
            (&keys[..idx], &keys[idx + 1..])
        }
    };

    let mut env = Environment::new();
    for (key, value) in left.iter().zip(values.iter()) {
        if *key != DISCARD_KEY {
            env.insert(key.to_string(), value.to_string());
        }
    }
    // right-bound keys pair up from the end
    for (key, value) in right.iter().rev().zip(values.iter().rev()) {
        if *key != DISCARD_KEY {
            env.insert(key.to_string(), value.to_string());
        }
    }

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_binds_every_key_without_divider() {
        let got = tokenize("proj_ep01_sh010", &["_"], &["SHOW", "SEQ", "SHOT"]).unwrap();
        assert_eq!(got, env(&[("SHOW", "proj"), ("SEQ", "ep01"), ("SHOT", "sh010")]));
    }

    #[test]
    fn test_divider_discards_middle() {
        let got = tokenize("1-2-3-4", &["-"], &["A", "...", "B"]).unwrap();
        assert_eq!(got, env(&[("A", "1"), ("B", "4")]));
    }

    #[test]
    fn test_divider_with_exact_minimum() {
        let got = tokenize("1-2", &["-"], &["A", "...", "B"]).unwrap();
        assert_eq!(got, env(&[("A", "1"), ("B", "2")]));

        let err = tokenize("1", &["-"], &["A", "...", "B"]).unwrap_err();
        assert!(matches!(err, TakeinError::NotEnoughValues(_)));
    }

    #[test]
    fn test_right_keys_bind_from_the_end() {
        let got = tokenize("a.b.c.d.e", &["."], &["X", "...", "Y", "Z"]).unwrap();
        assert_eq!(got, env(&[("X", "a"), ("Y", "d"), ("Z", "e")]));
    }

    #[test]
    fn test_trailing_divider() {
        let got = tokenize("ep01_s01_c0010_plate_v001.exr", &[".", "_"], &["SEQ", "SCENE", "SHOT", "PART", "VER", "..."]).unwrap();
        assert_eq!(
            got,
            env(&[("SEQ", "ep01"), ("SCENE", "s01"), ("SHOT", "c0010"), ("PART", "plate"), ("VER", "v001")])
        );
    }

    #[test]
    fn test_discard_key_is_not_recorded() {
        let got = tokenize("/mnt/show/demo/file", &["/"], &["_", "_", "_", "SHOW", "NAME"]).unwrap();
        assert_eq!(got, env(&[("SHOW", "demo"), ("NAME", "file")]));
    }

    #[test]
    fn test_count_mismatch() {
        let too_many = tokenize("a_b_c_d", &["_"], &["A", "B", "C"]).unwrap_err();
        assert!(matches!(too_many, TakeinError::TooManyValues(_)));
        assert_eq!(too_many.to_string(), "too many values for keys: a_b_c_d");

        let too_few = tokenize("a_b", &["_"], &["A", "B", "C"]).unwrap_err();
        assert!(matches!(too_few, TakeinError::NotEnoughValues(_)));
    }

    #[test]
    fn test_multiple_dividers_always_fail() {
        for input in ["", "a", "a-b-c-d-e-f-g"] {
            let err = tokenize(input, &["-"], &["A", "...", "B", "..."]).unwrap_err();
            assert!(matches!(err, TakeinError::MultipleDividers));
        }
    }

    #[test]
    fn test_earliest_separator_wins() {
        // "_" appears first in the list but "." matches earlier in the text
        assert_eq!(split_fragments("a.b_c", &["_", "."]), vec!["a", "b", "c"]);
        assert_eq!(split_fragments("a--b-c", &["-", "--"]), vec!["a", "", "b", "c"]);
        assert_eq!(split_fragments("a--b-c", &["--", "-"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_whitespace_separators_are_inert() {
        assert_eq!(split_fragments("a b_c", &[" ", "\t", "_"]), vec!["a b", "c"]);
        assert_eq!(split_fragments("a b", &[" ", ""]), vec!["a b"]);
    }

    #[test]
    fn test_fragment_count_is_separators_plus_one() {
        assert_eq!(split_fragments("/a/b/", &["/"]), vec!["", "a", "b", ""]);
        assert_eq!(split_fragments("", &["/"]), vec![""]);
    }

    #[test]
    fn test_rule_from_fields() {
        let rule = TokenRule::from_fields(". _", "SEQ  SHOT ...");
        assert_eq!(rule.separators, vec![".", "_"]);
        assert_eq!(rule.keys, vec!["SEQ", "SHOT", "..."]);
        let got = rule.tokenize("ep01_sh010.mov").unwrap();
        assert_eq!(got, env(&[("SEQ", "ep01"), ("SHOT", "sh010")]));
    }
}
