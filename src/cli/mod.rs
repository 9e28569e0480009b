use clap::Parser;
use error_stack::{Result, ResultExt};
use posthub::config::Config;
use posthub::notice::Notices;
use posthub::App;
use std::path::PathBuf;
use thiserror::Error;

mod auth;
mod posts;
mod render;
mod users;

#[derive(Debug, Error)]
#[error("Failed to run command")]
pub struct CliError;

/// Command line client for PostHub.
#[derive(Debug, Parser)]
#[command(about = "Command line client for PostHub", version, author, long_about)]
pub struct Cli {
    /// Base URL of the PostHub API, overrides the configuration.
    #[clap(long, global = true)]
    pub api_url: Option<String>,

    /// Configuration file to load instead of `posthub.toml`.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        let mut config = Config::load(self.config.as_deref()).change_context(CliError)?;
        self.override_config(&mut config);

        posthub::logging::init(&config.logging).change_context(CliError)?;
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .change_context(CliError)
            .attach_printable("could not build tokio runtime")?
            .block_on(self.subcommand.run(config))
    }

    fn override_config(&self, config: &mut Config) {
        if let Some(url) = self.api_url.as_ref() {
            config.api.url.clone_from(url);
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Login(self::auth::LoginCommand),
    Register(self::auth::RegisterCommand),
    Logout,
    Whoami,
    Feed(self::posts::FeedCommand),
    Post(self::posts::ShowCommand),
    Create(self::posts::CreateCommand),
    Edit(self::posts::EditCommand),
    Delete(self::posts::ShowCommand),
    Like(self::posts::ShowCommand),
    Unlike(self::posts::ShowCommand),
    Profile(self::users::ProfileCommand),
}

impl Subcommand {
    async fn run(self, config: Config) -> Result<(), CliError> {
        let (app, mut notices) = App::from_config(config).change_context(CliError)?;

        let result = match self {
            Self::Login(args) => args.run(&app).await,
            Self::Register(args) => args.run(&app).await,
            Self::Logout => self::auth::logout(&app),
            Self::Whoami => self::auth::whoami(&app).await,
            Self::Feed(args) => args.run(&app).await,
            Self::Post(args) => args.show(&app).await,
            Self::Create(args) => args.run(&app).await,
            Self::Edit(args) => args.run(&app).await,
            Self::Delete(args) => args.delete(&app).await,
            Self::Like(args) => args.vote(&app, posthub::types::VoteDirection::Like).await,
            Self::Unlike(args) => args.vote(&app, posthub::types::VoteDirection::Unlike).await,
            Self::Profile(args) => args.run(&app).await,
        };

        print_notices(&mut notices);
        result
    }
}

fn print_notices(notices: &mut Notices) {
    for notice in notices.drain() {
        if notice.is_error() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}
