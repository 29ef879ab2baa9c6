//! Quoting utilities for SQL identifiers and string literals.
//!
//! SQL escapes a quote character inside a quoted token by doubling it, for
//! identifiers (`"`) and string literals (`'`) alike. Every statement the crate
//! emits goes through these helpers, so table names such as `users:v3` and
//! literal values containing quotes render consistently everywhere.

/// Escape a string for use between the given quote characters.
///
/// # Arguments
/// * `s` - The string to escape
/// * `quote_char` - The quote character to escape (`"` for identifiers, `'` for literals)
pub fn escape_string_for_quote(s: &str, quote_char: char) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if c == quote_char {
            result.push(c);
        }
        result.push(c);
    }
    result
}

/// Quote an identifier (table, column or index name): `users:v1` -> `"users:v1"`.
#[inline]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", escape_string_for_quote(name, '"'))
}

/// Quote a column, optionally qualified by its table: `"users:v1"."name"`.
pub fn qualified_column(table: Option<&str>, column: &str) -> String {
    match table {
        Some(table) => format!("{}.{}", quote_identifier(table), quote_identifier(column)),
        None => quote_identifier(column),
    }
}

/// Quote a string literal: `it's` -> `'it''s'`.
#[inline]
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_string_for_quote(s, '\''))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello", "'hello'")]
    #[case("it's", "'it''s'")]
    #[case("''", "''''''")]
    #[case("say \"hi\"", "'say \"hi\"'")]
    fn test_quote_literal(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(quote_literal(input), expected);
    }

    #[rstest]
    fn test_quote_identifier_with_colon() {
        assert_eq!(quote_identifier("users:v2"), "\"users:v2\"");
    }

    #[rstest]
    fn test_quote_identifier_doubles_double_quotes() {
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }

    #[rstest]
    fn test_qualified_column() {
        assert_eq!(qualified_column(Some("t:v1"), "age"), "\"t:v1\".\"age\"");
        assert_eq!(qualified_column(None, "age"), "\"age\"");
    }
}
