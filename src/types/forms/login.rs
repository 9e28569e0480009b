use validator::{extras::validate_email, Validate, ValidateError};

use crate::types::LoginCredentials;
use crate::util::Sensitive;

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: Sensitive<String>,
}

impl LoginForm {
    #[must_use]
    pub fn into_credentials(self) -> LoginCredentials {
        LoginCredentials {
            username: self.email,
            password: self.password,
        }
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("email", {
            let mut error = ValidateError::msg_builder();
            if !validate_email(&self.email) {
                error.insert("Please enter a valid email address");
            }
            error.build()
        });
        fields.insert("password", {
            let mut error = ValidateError::msg_builder();
            if self.password.as_str().is_empty() {
                error.insert("Password is required");
            }
            error.build()
        });
        fields.build().into_result()
    }
}
