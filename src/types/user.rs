use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::Timestamp;
use crate::util::Sensitive;

/// **ROUTE**: `GET /users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: Timestamp,
}

impl User {
    /// Two letter avatar fallback derived from the e-mail address.
    #[must_use]
    pub fn initials(&self) -> String {
        self.email.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Sign up to PostHub.
///
/// **ROUTE**: `POST /users/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: Sensitive<String>,
}
