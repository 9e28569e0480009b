use error_stack::Result;
use std::sync::Arc;

use crate::api::{Access, ApiError};
use crate::types::{PostWithVotes, PostsQuery, User, UserId};
use crate::App;

/// How many posts are scanned for the ones written by the user.
pub const PROFILE_POSTS_LIMIT: u32 = 100;

#[derive(Debug)]
pub struct Profile {
    pub id: UserId,
}

#[derive(Debug)]
pub struct ProfileResult {
    pub user: Arc<User>,
    pub posts: Vec<PostWithVotes>,
    pub is_own_profile: bool,
}

impl Profile {
    #[tracing::instrument(skip(app), name = "services.users.profile")]
    pub async fn perform(self, app: &App) -> Result<ProfileResult, ApiError> {
        let id = self.id;
        let user = app.cached_read(&app.cache.users, id, "get user", Access::Read, || {
            let api = app.api.clone();
            async move { api.user(id).await }
        });

        let query = PostsQuery::limit(PROFILE_POSTS_LIMIT);
        let posts = app.cached_read(&app.cache.posts, query.clone(), "list posts", Access::ReadPosts, || {
            let api = app.api.clone();
            let query = query.clone();
            async move { api.posts(&query).await }
        });

        let (user, posts) = futures::try_join!(user, posts)?;
        let posts = posts
            .iter()
            .filter(|post| post.post.is_owned_by(id))
            .cloned()
            .collect();

        let is_own_profile = app.session.identity().is_some_and(|identity| identity.id == id);
        Ok(ProfileResult {
            user,
            posts,
            is_own_profile,
        })
    }
}
