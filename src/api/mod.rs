//! The PostHub REST API as seen from the client.
//!
//! Every call goes through the [`Api`] trait so that the session, the
//! vote reconciler and the services can be exercised without a server.

mod error;
mod http;

pub use self::error::{ApiError, ApiErrorKind};
pub use self::http::{HttpApi, HttpApiInitError};

use async_trait::async_trait;
use error_stack::Result;
use std::fmt::Debug;

use crate::types::{
    LoginCredentials, NewUser, Post, PostId, PostPayload, PostWithVotes, PostsQuery, Token, User,
    UserId, Vote,
};

#[async_trait]
pub trait Api: Debug + Send + Sync + 'static {
    /// `POST /login`
    async fn login(&self, credentials: &LoginCredentials) -> Result<Token, ApiError>;

    /// `POST /users/`
    async fn register(&self, user: &NewUser) -> Result<User, ApiError>;

    /// `GET /users/{id}`
    async fn user(&self, id: UserId) -> Result<User, ApiError>;

    /// `GET /posts/`
    async fn posts(&self, query: &PostsQuery) -> Result<Vec<PostWithVotes>, ApiError>;

    /// `GET /posts/{id}`
    async fn post(&self, id: PostId) -> Result<PostWithVotes, ApiError>;

    /// `POST /posts/`
    async fn create_post(&self, payload: &PostPayload) -> Result<Post, ApiError>;

    /// `PUT /posts/{id}`
    async fn update_post(&self, id: PostId, payload: &PostPayload) -> Result<Post, ApiError>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, id: PostId) -> Result<(), ApiError>;

    /// `POST /vote/`
    async fn vote(&self, vote: &Vote) -> Result<(), ApiError>;
}

/// The kind of request that got a `401` back. Each one is handled
/// differently when the session turns out to be gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reading posts. Those are public so a `401` is ignored.
    ReadPosts,
    /// Any other read.
    Read,
    Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedAction {
    Ignore,
    /// Drop the credentials and the identity.
    Logout,
    /// Drop the credentials and send the user back to the sign in page.
    LogoutAndRedirect,
}

impl Access {
    #[must_use]
    pub const fn on_unauthorized(self) -> UnauthorizedAction {
        match self {
            Self::ReadPosts => UnauthorizedAction::Ignore,
            Self::Read => UnauthorizedAction::Logout,
            Self::Mutation => UnauthorizedAction::LogoutAndRedirect,
        }
    }
}
