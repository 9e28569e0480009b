use error_stack::{Report, Result, ResultExt};
use thiserror::Error;
use validator::{Validate, ValidateError};

use crate::auth::{Identity, SessionError};
use crate::notice::Notice;
use crate::types::forms::{LoginForm, RegisterForm};
use crate::App;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(ValidateError),
    #[error("{0}")]
    Failed(String),
}

fn failed(report: Report<SessionError>, app: &App) -> Report<AuthError> {
    let message = report.current_context().to_string();
    app.notify(Notice::error(message.clone()));
    report.change_context(AuthError::Failed(message))
}

#[derive(Debug)]
pub struct Login {
    pub form: LoginForm,
}

impl Login {
    #[tracing::instrument(skip_all, name = "services.auth.login")]
    pub async fn perform(self, app: &App) -> Result<Identity, AuthError> {
        self.form
            .validate()
            .map_err(|error| Report::new(AuthError::Invalid(error)))?;

        let identity = app
            .session
            .login(&self.form.into_credentials())
            .await
            .map_err(|report| failed(report, app))?;

        app.notify(Notice::success("Welcome back!"));
        Ok(identity)
    }
}

#[derive(Debug)]
pub struct Register {
    pub form: RegisterForm,
}

impl Register {
    #[tracing::instrument(skip_all, name = "services.auth.register")]
    pub async fn perform(self, app: &App) -> Result<Identity, AuthError> {
        self.form
            .validate()
            .map_err(|error| Report::new(AuthError::Invalid(error)))?;

        let identity = app
            .session
            .register(&self.form.into_new_user())
            .await
            .map_err(|report| failed(report, app))
            .attach_printable("could not sign up")?;

        app.notify(Notice::success("Account created successfully!"));
        Ok(identity)
    }
}
