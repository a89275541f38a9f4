//! String transformation utilities for code generation

use once_cell::sync::Lazy;
use regex::Regex;

static CAPITAL_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z][a-z]+)").expect("valid regex"));
static LOWER_THEN_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// Convert an identifier to lower snake_case.
///
/// Follows the usual OpenAPI generator rules so that parameter names line up
/// with the hand-written parts of the SDK: acronym runs are split before the
/// next capitalized word (`HTTPResponse` -> `http_response`), a lower-case
/// letter or digit followed by a capital gets an underscore (`userId` ->
/// `user_id`), `$` becomes `__`, and dashes, dots and spaces become `_`.
/// Dots are flattened so results stay usable as Elixir atoms and file names.
pub fn underscore(word: &str) -> String {
    let result = word.replace('$', "__");
    let result = CAPITAL_RUN.replace_all(&result, "${1}_${2}");
    let result = LOWER_THEN_UPPER.replace_all(&result, "${1}_${2}");
    result
        .chars()
        .map(|c| match c {
            '-' | ' ' | '.' => '_',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Convert a string to UpperCamelCase (PascalCase)
///
/// Words are split on `_`, `-`, `.`, `/` and spaces; the first letter of each
/// word is upper-cased and the rest is kept as written, so
/// `channel_access_token` becomes `ChannelAccessToken` and `ErrorResponse`
/// stays untouched.
pub fn camelize(word: &str) -> String {
    word.split(['_', '-', '.', '/', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}
