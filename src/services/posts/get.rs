use error_stack::Result;
use std::sync::Arc;

use crate::api::{Access, ApiError};
use crate::types::{PostId, PostWithVotes};
use crate::App;

#[derive(Debug)]
pub struct GetPost {
    pub id: PostId,
}

impl GetPost {
    /// Fails with [`ApiErrorKind::NotFound`](crate::api::ApiErrorKind::NotFound)
    /// if the post does not exist.
    #[tracing::instrument(skip(app), name = "services.posts.get")]
    pub async fn perform(self, app: &App) -> Result<Arc<PostWithVotes>, ApiError> {
        let id = self.id;
        app.cached_read(&app.cache.post, id, "get post", Access::ReadPosts, || {
            let api = app.api.clone();
            async move { api.post(id).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::test_utils::{anonymous_app, post};

    #[tokio::test]
    async fn fetches_post() {
        let (app, api, _) = anonymous_app();
        api.push_post(Ok(post(3, 7, 5)));

        let post = GetPost { id: PostId::new(3) }.perform(&app).await.unwrap();
        assert_eq!(post.votes, 5);
    }

    #[tokio::test]
    async fn missing_post() {
        let (app, api, _) = anonymous_app();
        api.push_post(Err(ApiError::new(ApiErrorKind::NotFound).with_detail("post with id: 3 was not found")));

        let error = GetPost { id: PostId::new(3) }.perform(&app).await.unwrap_err();
        assert!(error.current_context().is_not_found());
    }
}
