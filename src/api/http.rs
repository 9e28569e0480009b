use async_trait::async_trait;
use error_stack::{Report, Result, ResultExt};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use super::{Api, ApiError, ApiErrorKind};
use crate::auth::CredentialStore;
use crate::config;
use crate::types::{
    LoginCredentials, NewUser, Post, PostId, PostPayload, PostWithVotes, PostsQuery, Token, User,
    UserId, Vote,
};

#[derive(Debug, Error)]
#[error("Failed to set up the HTTP client")]
pub struct HttpApiInitError;

/// [`Api`] backed by a real PostHub server.
///
/// The access token is read from the credential store on every request,
/// so a login or logout takes effect immediately.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: Url,
    client: reqwest::Client,
    store: Arc<dyn CredentialStore>,
}

impl HttpApi {
    pub fn new(
        config: &config::Api,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, HttpApiInitError> {
        let mut base = Url::parse(&config.url)
            .change_context(HttpApiInitError)
            .attach_printable_lazy(|| format!("invalid API url {:?}", config.url))?;

        // `Url::join` replaces the last segment unless it ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("posthub/", env!("CARGO_PKG_VERSION")))
            .build()
            .change_context(HttpApiInitError)?;

        Ok(Self {
            base,
            client,
            store,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base
            .join(path)
            .change_context(ApiError::new(ApiErrorKind::Request))
            .attach_printable_lazy(|| format!("invalid path {path:?}"))?;

        let mut builder = self.client.request(method, url);
        match self.store.load() {
            Ok(Some(token)) => builder = builder.bearer_auth(token.as_str()),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(?error, "could not read access token, sending request without it");
            }
        }

        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        Err(Report::new(ApiError::from_response(status.as_u16(), &body))
            .attach_printable(format!("{url} responded with {status}")))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(transport_error)
    }
}

fn transport_error(error: reqwest::Error) -> Report<ApiError> {
    let kind = if error.is_timeout() {
        ApiErrorKind::Timeout
    } else if error.is_decode() {
        ApiErrorKind::Decode
    } else if error.is_builder() {
        ApiErrorKind::Request
    } else {
        ApiErrorKind::Network
    };
    Report::new(error).change_context(ApiError::new(kind))
}

#[async_trait]
impl Api for HttpApi {
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<Token, ApiError> {
        let request = self.request(Method::POST, "login")?.form(credentials);
        self.json(request).await
    }

    #[tracing::instrument(skip_all, fields(email = %user.email))]
    async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        let request = self.request(Method::POST, "users/")?.json(user);
        self.json(request).await
    }

    #[tracing::instrument(skip(self))]
    async fn user(&self, id: UserId) -> Result<User, ApiError> {
        let request = self.request(Method::GET, &format!("users/{id}"))?;
        self.json(request).await
    }

    #[tracing::instrument(skip(self))]
    async fn posts(&self, query: &PostsQuery) -> Result<Vec<PostWithVotes>, ApiError> {
        let request = self.request(Method::GET, "posts/")?.query(query);
        self.json(request).await
    }

    #[tracing::instrument(skip(self))]
    async fn post(&self, id: PostId) -> Result<PostWithVotes, ApiError> {
        let request = self.request(Method::GET, &format!("posts/{id}"))?;
        self.json(request).await
    }

    #[tracing::instrument(skip_all)]
    async fn create_post(&self, payload: &PostPayload) -> Result<Post, ApiError> {
        let request = self.request(Method::POST, "posts/")?.json(payload);
        self.json(request).await
    }

    #[tracing::instrument(skip(self, payload))]
    async fn update_post(&self, id: PostId, payload: &PostPayload) -> Result<Post, ApiError> {
        let request = self.request(Method::PUT, &format!("posts/{id}"))?.json(payload);
        self.json(request).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_post(&self, id: PostId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("posts/{id}"))?;
        self.send(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn vote(&self, vote: &Vote) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "vote/")?.json(vote);
        self.send(request).await?;
        Ok(())
    }
}
