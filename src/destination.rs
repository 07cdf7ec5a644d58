// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Destination pattern expansion

use std::path::Path;

use crate::tokenizer::Environment;
use crate::{Result, TakeinError};

/// Resolve the destination directory of `source` by expanding `pattern`
/// against `env`.
///
/// `$NAME` and `${NAME}` are substituted; the first name missing from `env`
/// fails the whole call. Nothing else in the pattern is interpreted.
pub fn resolve(source: &str, pattern: &str, env: &Environment) -> Result<String> {
    if !Path::new(source).is_absolute() {
        return Err(TakeinError::RelativeSource(source.to_string()));
    }
    expand(pattern.trim(), |name| env.get(name).map(String::as_str))
}

/// Expand variable references in `pattern` with `lookup`.
pub(crate) fn expand<'e, F>(pattern: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<&'e str>,
{
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let (name, consumed) = match reference_name(after) {
            Some(found) => found,
            None => {
                out.push('$');
                rest = after;
                continue;
            }
        };

        match lookup(name) {
            Some(value) => out.push_str(value),
            None => return Err(TakeinError::UnknownVariable(name.to_string())),
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Name referenced right after a `$`, and how many bytes the reference spans.
///
/// Returns `None` when the `$` does not start a well-formed reference, in
/// which case it is kept literally.
fn reference_name(after: &str) -> Option<(&str, usize)> {
    if let Some(braced) = after.strip_prefix('{') {
        let close = braced.find('}')?;
        let name = &braced[..close];
        if name.is_empty() {
            return None;
        }
        return Some((name, close + 2));
    }

    let len = after
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(after.len(), |(i, _)| i);
    if len == 0 {
        return None;
    }
    Some((&after[..len], len))
}
