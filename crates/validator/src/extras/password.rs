/// Whether the password has at least one lowercase letter, one
/// uppercase letter and one ASCII digit.
#[must_use]
pub fn has_mixed_case_and_digit(value: &str) -> bool {
    let lower = value.chars().any(char::is_lowercase);
    let upper = value.chars().any(char::is_uppercase);
    let digit = value.chars().any(|c| c.is_ascii_digit());
    lower && upper && digit
}
