//! Go-compatible boolean parsing.
//!
//! Provider secrets store flags such as `insecureSkipVerify` as strings
//! written by Go controllers, so they follow `strconv.ParseBool` rules.

/// Parse a boolean with `strconv.ParseBool` semantics.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything
/// else is `None`.
pub fn parse_go_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Inverse of [`parse_go_bool`] using the canonical spelling.
pub fn format_go_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
