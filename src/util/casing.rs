//! Snake-case conversion for environment variable and metric names.

use std::sync::LazyLock;

use regex::Regex;

static NOT_UPPER_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Z0-9]+").expect("valid regex"));
static NOT_LOWER_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("valid regex"));

/// `someHTTPValue` → `SOME_HTTP_VALUE`. Anything outside `[A-Z0-9]` collapses
/// into a single `_`.
pub fn to_upper_snake_case(input: &str) -> String {
    let snake = split_words(input, |c, out| out.extend(c.to_uppercase()));
    NOT_UPPER_ALNUM.replace_all(&snake, "_").into_owned()
}

/// `someHTTPValue` → `some_http_value`. Anything outside `[a-z0-9]` collapses
/// into a single `_`.
pub fn to_lower_snake_case(input: &str) -> String {
    let snake = split_words(input, |c, out| out.extend(c.to_lowercase()));
    NOT_LOWER_ALNUM.replace_all(&snake, "_").into_owned()
}

/// Insert `_` at word boundaries: before an uppercase letter that follows a
/// lowercase one, or that starts a capitalised word after an acronym.
fn split_words(input: &str, push: impl Fn(char, &mut String)) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_lower = chars[i - 1].is_lowercase();
            if next_lower || prev_lower {
                out.push('_');
            }
        }
        push(c, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_snake_case() {
        let cases = [
            ("someValue", "SOME_VALUE"),
            ("someHTTPValue", "SOME_HTTP_VALUE"),
            ("SomeValue", "SOME_VALUE"),
            ("some-value.name", "SOME_VALUE_NAME"),
            ("some  value", "SOME_VALUE"),
            ("value2Go", "VALUE2_GO"),
            ("ALREADY_UPPER", "ALREADY_UPPER"),
        ];
        for (input, expected) in cases {
            assert_eq!(to_upper_snake_case(input), expected, "{input}");
        }
    }

    #[test]
    fn test_lower_snake_case() {
        let cases = [
            ("someValue", "some_value"),
            ("someHTTPValue", "some_http_value"),
            ("Some-Value", "some_value"),
            ("already_lower", "already_lower"),
        ];
        for (input, expected) in cases {
            assert_eq!(to_lower_snake_case(input), expected, "{input}");
        }
    }

    #[test]
    fn test_conversion_is_idempotent() {
        for input in ["someHTTPValue", "a.b-c d", "HelloWorld42", "x__y", "ÉtéValue"] {
            let upper = to_upper_snake_case(input);
            assert_eq!(to_upper_snake_case(&upper), upper);
            assert!(upper.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));

            let lower = to_lower_snake_case(input);
            assert_eq!(to_lower_snake_case(&lower), lower);
            assert!(lower.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }
}
