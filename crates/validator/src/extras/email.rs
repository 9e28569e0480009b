use once_cell::sync::Lazy;
use regex::Regex;

// Same shape browsers accept for `<input type="email">`: a local part,
// a domain with at least one dot, no whitespace anywhere.
static EMAIL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok());

#[must_use]
pub fn validate_email(value: &str) -> bool {
    EMAIL_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(value))
}
