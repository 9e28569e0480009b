//! What the user can do, one request type per action.
//!
//! Services validate input, talk to the API through [`App`](crate::App)
//! and report the outcome as [notices](crate::notice::Notice).

pub mod auth;
pub mod posts;
pub mod users;
