use clap::Parser;
use error_stack::Result;
use posthub::services::users::Profile;
use posthub::types::UserId;
use posthub::App;

use super::{render, CliError};

/// Show a user and their posts
#[derive(Debug, Parser)]
pub struct ProfileCommand {
    pub id: UserId,
}

impl ProfileCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let profile = match (Profile { id: self.id }).perform(app).await {
            Ok(profile) => profile,
            Err(report) if report.current_context().is_not_found() => {
                println!("User not found");
                return Ok(());
            }
            Err(report) => return Err(report.change_context(CliError)),
        };

        let user = &profile.user;
        let joined = user.created_at.relative_to(chrono::Utc::now());
        if profile.is_own_profile {
            println!("[{}] {} (you), joined {joined}", user.initials(), user.email);
        } else {
            println!("[{}] {}, joined {joined}", user.initials(), user.email);
        }

        println!("{} posts", profile.posts.len());
        for post in &profile.posts {
            render::post_summary(post);
        }
        Ok(())
    }
}
