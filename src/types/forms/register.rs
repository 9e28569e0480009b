use validator::{
    extras::{has_mixed_case_and_digit, validate_email, validate_length},
    Validate, ValidateError,
};

use super::PASSWORD_MIN;
use crate::types::NewUser;
use crate::util::Sensitive;

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: Sensitive<String>,
    pub confirm_password: Sensitive<String>,
}

impl RegisterForm {
    #[must_use]
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            email: self.email,
            password: self.password,
        }
    }
}

impl Validate for RegisterForm {
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
            let password = self.password.as_str();
            if !validate_length(password, Some(PASSWORD_MIN), None) {
                error.insert("Password must be at least 8 characters");
            }
            if !has_mixed_case_and_digit(password) {
                error.insert("Must contain uppercase, lowercase, and number");
            }
            error.build()
        });

        if self.password.as_str() != self.confirm_password.as_str() {
            let mut error = ValidateError::msg_builder();
            error.insert("Passwords don't match");
            fields.insert("confirm_password", error.build());
        }

        fields.build().into_result()
    }
}
