use error_stack::Result;

use super::{mutation_failed, require_owner, PostError};
use crate::notice::Notice;
use crate::types::Post;
use crate::App;

#[derive(Debug)]
pub struct DeletePost<'a> {
    pub post: &'a Post,
}

impl DeletePost<'_> {
    /// Refuses without asking the server when the post is someone else's.
    #[tracing::instrument(skip_all, fields(post.id = %self.post.id), name = "services.posts.delete")]
    pub async fn perform(self, app: &App) -> Result<(), PostError> {
        require_owner(app, self.post)?;

        let id = self.post.id;
        app.api
            .delete_post(id)
            .await
            .map_err(|report| mutation_failed(app, report, "Failed to delete post"))?;

        app.cache.remove_post(id).await;
        app.cache.invalidate_posts().await;
        app.notify(Notice::success("Post deleted successfully"));

        Ok(())
    }
}
