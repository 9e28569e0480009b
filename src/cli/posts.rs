use clap::Parser;
use error_stack::{Result, ResultExt};
use posthub::services::posts::{
    can_modify, CreatePost, DeletePost, EditPost, Feed, GetPost,
};
use posthub::types::forms::PostForm;
use posthub::types::{PostId, VoteDirection};
use posthub::votes::PostVotes;
use posthub::App;

use super::{render, CliError};

/// List posts
#[derive(Debug, Parser)]
pub struct FeedCommand {
    #[clap(long)]
    pub search: Option<String>,
    #[clap(long)]
    pub limit: Option<u32>,
    #[clap(long)]
    pub skip: Option<u32>,
    /// Only show posts written by you
    #[clap(long)]
    pub mine: bool,
}

impl FeedCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let posts = Feed {
            search: self.search,
            limit: self.limit,
            skip: self.skip,
            only_mine: self.mine,
        }
        .perform(app)
        .await
        .change_context(CliError)?;

        if posts.is_empty() {
            println!("No posts found");
        }
        for post in &posts {
            render::post_summary(post);
        }
        Ok(())
    }
}

/// Act on a single post
#[derive(Debug, Parser)]
pub struct ShowCommand {
    pub id: PostId,
}

impl ShowCommand {
    pub async fn show(self, app: &App) -> Result<(), CliError> {
        let Some(post) = render::found(GetPost { id: self.id }.perform(app).await)? else {
            return Ok(());
        };
        render::post_detail(&post, can_modify(&app.session, &post.post));
        Ok(())
    }

    pub async fn delete(self, app: &App) -> Result<(), CliError> {
        let Some(post) = render::found(GetPost { id: self.id }.perform(app).await)? else {
            return Ok(());
        };
        DeletePost { post: &post.post }
            .perform(app)
            .await
            .change_context(CliError)
    }

    pub async fn vote(self, app: &App, dir: VoteDirection) -> Result<(), CliError> {
        let Some(post) = render::found(GetPost { id: self.id }.perform(app).await)? else {
            return Ok(());
        };

        let votes = PostVotes::new(&post);
        let pending = app.votes().begin(&votes, dir).change_context(CliError)?;
        render::votes(&votes.state());
        pending.settle().await.change_context(CliError)?;

        // the cached tally was invalidated, fetch the real one
        if let Ok(post) = (GetPost { id: self.id }).perform(app).await {
            votes.refresh(&post);
        }
        render::votes(&votes.state());
        Ok(())
    }
}

/// Write a new post
#[derive(Debug, Parser)]
pub struct CreateCommand {
    #[clap(long)]
    pub title: String,
    #[clap(long)]
    pub content: String,
    /// Keep the post unpublished
    #[clap(long)]
    pub draft: bool,
}

impl CreateCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let mut form = PostForm::new(self.title, self.content);
        form.published = !self.draft;

        let post = CreatePost { form }.perform(app).await.change_context(CliError)?;
        println!("Created post #{}", post.id);
        Ok(())
    }
}

/// Change one of your posts
#[derive(Debug, Parser)]
pub struct EditCommand {
    pub id: PostId,
    #[clap(long)]
    pub title: Option<String>,
    #[clap(long)]
    pub content: Option<String>,
    #[clap(long)]
    pub published: Option<bool>,
}

impl EditCommand {
    pub async fn run(self, app: &App) -> Result<(), CliError> {
        let Some(post) = render::found(GetPost { id: self.id }.perform(app).await)? else {
            return Ok(());
        };

        let mut form = PostForm::from_existing(&post);
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(content) = self.content {
            form.content = content;
        }
        if let Some(published) = self.published {
            form.published = published;
        }

        EditPost {
            post: &post.post,
            form,
        }
        .perform(app)
        .await
        .change_context(CliError)?;
        Ok(())
    }
}
