use error_stack::{Report, Result};
use validator::Validate;

use super::{mutation_failed, require_owner, PostError};
use crate::notice::Notice;
use crate::types::forms::PostForm;
use crate::types::Post;
use crate::App;

#[derive(Debug)]
pub struct EditPost<'a> {
    pub post: &'a Post,
    pub form: PostForm,
}

impl EditPost<'_> {
    #[tracing::instrument(skip_all, fields(post.id = %self.post.id), name = "services.posts.edit")]
    pub async fn perform(self, app: &App) -> Result<Post, PostError> {
        require_owner(app, self.post)?;
        self.form
            .validate()
            .map_err(|error| Report::new(PostError::Invalid(error)))?;

        let id = self.post.id;
        let post = app
            .api
            .update_post(id, &self.form.into_payload())
            .await
            .map_err(|report| mutation_failed(app, report, "Failed to update post"))?;

        app.cache.invalidate_posts().await;
        app.cache.invalidate_post(id).await;
        app.notify(Notice::success("Post updated successfully!"));

        Ok(post)
    }
}
