use clap::Parser;
use error_stack::{Result, ResultExt};
use posthub::services::auth::{Login, Register};
use posthub::services::users::Profile;
use posthub::types::forms::{LoginForm, RegisterForm};
use posthub::util::Sensitive;
use posthub::App;

use super::CliError;

/// Sign in with an e-mail address and password
#[derive(Debug, Parser)]
pub struct LoginCommand {
    #[clap(long)]
    pub email: String,
    #[clap(long, env = "POSTHUB_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl LoginCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let form = LoginForm {
            email: self.email,
            password: Sensitive::new(self.password),
        };
        let identity = Login { form }.perform(app).await.change_context(CliError)?;
        println!("Signed in as user {}", identity.id);
        Ok(())
    }
}

/// Create an account and sign into it
#[derive(Debug, Parser)]
pub struct RegisterCommand {
    #[clap(long)]
    pub email: String,
    #[clap(long, env = "POSTHUB_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Defaults to the password itself.
    #[clap(long)]
    pub confirm_password: Option<String>,
}

impl RegisterCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let confirm_password = self.confirm_password.unwrap_or_else(|| self.password.clone());
        let form = RegisterForm {
            email: self.email,
            password: Sensitive::new(self.password),
            confirm_password: Sensitive::new(confirm_password),
        };
        let identity = Register { form }.perform(app).await.change_context(CliError)?;
        println!("Signed in as user {}", identity.id);
        Ok(())
    }
}

pub fn logout(app: &App) -> Result<(), CliError> {
    app.session.logout();
    println!("Signed out");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<(), CliError> {
    let Some(identity) = app.session.identity() else {
        println!("Not signed in");
        return Ok(());
    };

    let profile = Profile { id: identity.id }
        .perform(app)
        .await
        .change_context(CliError)?;

    println!(
        "{} ({}), {} posts",
        profile.user.email,
        identity.id,
        profile.posts.len()
    );
    Ok(())
}
