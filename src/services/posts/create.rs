use error_stack::{Report, Result};
use validator::Validate;

use super::{mutation_failed, require_identity, PostError};
use crate::notice::Notice;
use crate::types::forms::PostForm;
use crate::types::Post;
use crate::App;

#[derive(Debug)]
pub struct CreatePost {
    pub form: PostForm,
}

impl CreatePost {
    #[tracing::instrument(skip_all, name = "services.posts.create")]
    pub async fn perform(self, app: &App) -> Result<Post, PostError> {
        require_identity(app)?;
        self.form
            .validate()
            .map_err(|error| Report::new(PostError::Invalid(error)))?;

        let post = app
            .api
            .create_post(&self.form.into_payload())
            .await
            .map_err(|report| mutation_failed(app, report, "Failed to create post"))?;

        app.cache.invalidate_posts().await;
        app.notify(Notice::success("Post created successfully!"));
        tracing::info!(post.id = %post.id, "created post");

        Ok(post)
    }
}
