//! Forms filled in by the user before anything is sent to the API.
//! Validation mirrors what the PostHub web client enforces.

mod login;
mod post;
mod register;

pub use self::login::LoginForm;
pub use self::post::PostForm;
pub use self::register::RegisterForm;

pub const PASSWORD_MIN: usize = 8;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;

pub const CONTENT_MIN: usize = 10;
pub const CONTENT_MAX: usize = 5000;

#[cfg(test)]
#[track_caller]
pub(crate) fn must_fail<T: validator::Validate>(value: &T, field: &str, message: &str) {
    let error = match value.validate() {
        Ok(()) => panic!("expected {field:?} to fail but passed"),
        Err(error) => error,
    };
    let found = error
        .messages()
        .into_iter()
        .any(|(path, msg)| path == field && msg == message);

    assert!(found, "expected {field:?} to fail with {message:?}, got {error:?}");
}
