mod email;
mod length;
mod password;
mod url;

pub use self::email::validate_email;
pub use self::length::validate_length;
pub use self::password::has_mixed_case_and_digit;
pub use self::url::validate_http_url;
