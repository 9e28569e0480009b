use serde::{Deserialize, Serialize};

use super::NewUser;
use crate::util::Sensitive;

/// Log in as a user to PostHub. Sent form-encoded, the e-mail address
/// goes to the `username` field.
///
/// **ROUTE**: `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: Sensitive<String>,
}

impl From<&NewUser> for LoginCredentials {
    fn from(user: &NewUser) -> Self {
        Self {
            username: user.email.clone(),
            password: user.password.clone(),
        }
    }
}

/// A response after logging in successfully.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub access_token: Sensitive<String>,
    pub token_type: String,
}
