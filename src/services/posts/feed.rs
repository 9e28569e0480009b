use error_stack::Result;

use crate::api::{Access, ApiError};
use crate::types::{PostWithVotes, PostsQuery};
use crate::App;

/// How many posts the feed asks for unless told otherwise.
pub const FEED_LIMIT: u32 = 50;

#[derive(Debug, Default)]
pub struct Feed {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    /// Keep only posts written by the signed in user.
    pub only_mine: bool,
}

impl Feed {
    #[tracing::instrument(skip(app), name = "services.posts.feed")]
    pub async fn perform(self, app: &App) -> Result<Vec<PostWithVotes>, ApiError> {
        let query = PostsQuery::limit(self.limit.unwrap_or(FEED_LIMIT))
            .search(self.search)
            .skip(self.skip);

        let posts = app
            .cached_read(&app.cache.posts, query.clone(), "list posts", Access::ReadPosts, || {
                let api = app.api.clone();
                let query = query.clone();
                async move { api.posts(&query).await }
            })
            .await?;

        if !self.only_mine {
            return Ok(posts.to_vec());
        }

        let identity = app.session.identity();
        Ok(posts
            .iter()
            .filter(|post| identity.is_some_and(|identity| post.post.is_owned_by(identity.id)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::test_utils::{anonymous_app, post, signed_in_app, Call};

    #[tokio::test]
    async fn lists_with_default_limit() {
        let (app, api, _) = anonymous_app();
        api.push_posts(Ok(vec![post(1, 7, 2), post(2, 42, 0)]));

        let posts = Feed::default().perform(&app).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(api.calls(), vec![Call::Posts(PostsQuery::limit(50))]);
    }

    #[tokio::test]
    async fn passes_search_and_paging() {
        let (app, api, _) = anonymous_app();
        api.push_posts(Ok(vec![]));

        Feed {
            search: Some("rust".into()),
            limit: Some(10),
            skip: Some(20),
            only_mine: false,
        }
        .perform(&app)
        .await
        .unwrap();

        let expected = PostsQuery::limit(10).search(Some("rust".into())).skip(Some(20));
        assert_eq!(api.calls(), vec![Call::Posts(expected)]);
    }

    #[tokio::test]
    async fn my_posts_filter() {
        let (app, api, _) = signed_in_app(42);
        api.push_posts(Ok(vec![post(1, 7, 2), post(2, 42, 0), post(3, 42, 5)]));

        let feed = Feed {
            only_mine: true,
            ..Default::default()
        };
        let ids = feed
            .perform(&app)
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.post.id.get())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn unauthorized_listing_keeps_session() {
        let (app, api, mut notices) = signed_in_app(42);
        api.push_posts(Err(ApiError::new(ApiErrorKind::Unauthorized)));

        assert!(Feed::default().perform(&app).await.is_err());
        assert!(app.session.is_authenticated());
        assert!(notices.drain().is_empty());
    }
}
