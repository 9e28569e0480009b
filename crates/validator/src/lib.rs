#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Form validation primitives shared by PostHub clients.
//!
//! Every form implements [`Validate`] by hand, collecting messages per
//! field with [`ValidateError::field_builder`] and
//! [`ValidateError::msg_builder`].

mod error;
mod std_impl;

pub mod extras;

pub use error::*;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidateError>;
}

/// Length of a value as a user would count it (characters, not bytes,
/// for strings).
pub trait HasLength {
    fn length(&self) -> usize;
}
