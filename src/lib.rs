#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod logging;
pub mod notice;
pub mod services;
pub mod types;
pub mod util;
pub mod votes;

pub use app::App;

pub(crate) mod internal;

#[cfg(test)]
pub(crate) mod test_utils;
