use error_stack::{Result, ResultExt};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{Access, Api, ApiError, HttpApi, UnauthorizedAction};
use crate::auth::{CredentialStore, FileCredentialStore, Session};
use crate::cache::{Lookup, QueryCache, Slot};
use crate::config::Config;
use crate::notice::{self, Notice, Notifier, Notices};
use crate::util::Retry;
use crate::votes::VoteReconciler;

/// Everything a PostHub front end needs, cheap to clone.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub session: Session,
    pub api: Arc<dyn Api>,
    pub cache: QueryCache,
    notifier: Notifier,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to the configured server, restoring the stored session.
    #[tracing::instrument(skip_all)]
    pub fn from_config(config: Config) -> Result<(Self, Notices), AppError> {
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(&config.credentials.path));
        let api = HttpApi::new(&config.api, store.clone()).change_context(AppError)?;

        let (notifier, notices) = notice::channel();
        let app = Self::new(config, Arc::new(api), store, notifier);
        app.session.initialize();

        Ok((app, notices))
    }

    /// The session starts out [initializing](crate::auth::SessionState::Initializing).
    #[must_use]
    pub fn new(
        config: Config,
        api: Arc<dyn Api>,
        store: Arc<dyn CredentialStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            cache: QueryCache::new(&config.cache),
            config: Arc::new(config),
            session: Session::new(api.clone(), store),
            api,
            notifier,
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    #[must_use]
    pub fn votes(&self) -> VoteReconciler {
        VoteReconciler::new(self.clone())
    }

    /// Reacts to the server no longer accepting our access token.
    pub(crate) fn handle_unauthorized(&self, error: &ApiError, access: Access) {
        if !error.is_unauthorized() {
            return;
        }

        match access.on_unauthorized() {
            UnauthorizedAction::Ignore => {}
            UnauthorizedAction::Logout => {
                info!("access token was rejected, signing out");
                self.session.logout();
            }
            UnauthorizedAction::LogoutAndRedirect => {
                info!("access token was rejected, signing out");
                self.session.logout();
                self.notify(Notice::RedirectToSignIn);
            }
        }
    }

    /// Reads through the cache.
    ///
    /// Fresh entries are served as is. Otherwise `fetch` is retried on
    /// transient errors; if it still fails whatever was cached before is
    /// served instead, along with a notice.
    pub(crate) async fn cached_read<K, T, F, Fut>(
        &self,
        slot: &Slot<K, T>,
        key: K,
        name: &'static str,
        access: Access,
        fetch: F,
    ) -> Result<Arc<T>, ApiError>
    where
        K: Clone + Hash + Eq + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let cached = match slot.get(&key).await {
            Lookup::Fresh(value) => return Ok(value),
            Lookup::Stale(value) => Some(value),
            Lookup::Missing => None,
        };

        let retry = &self.config.retry;
        let result = Retry::builder(name, fetch)
            .max_retries(retry.max_retries)
            .wait(retry.base_delay())
            .max_wait(retry.max_delay())
            .retry_if(ApiError::is_transient)
            .build()
            .run()
            .await;

        let report = match result {
            Ok(value) => {
                let value = Arc::new(value);
                slot.insert(key, value.clone()).await;
                return Ok(value);
            }
            Err(report) => report,
        };

        let error = report.current_context();
        self.handle_unauthorized(error, access);

        if error.is_not_found() {
            slot.remove(&key).await;
            return Err(report);
        }
        if !error.is_unauthorized() {
            self.notify(Notice::CouldNotLoad(error.to_string()));
        }

        match cached {
            Some(value) => {
                warn!(error = %error, "{name} failed, serving cached data");
                Ok(value)
            }
            None => Err(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::auth::SessionState;
    use crate::test_utils::{anonymous_app, post, signed_in_app, Call};
    use crate::types::PostId;
    use std::time::Duration;

    async fn read_post(app: &App, id: PostId) -> Result<Arc<crate::types::PostWithVotes>, ApiError> {
        app.cached_read(&app.cache.post, id, "read post", Access::ReadPosts, || {
            let api = app.api.clone();
            async move { api.post(id).await }
        })
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_reads_come_from_cache() {
        let (app, api, _) = anonymous_app();
        api.push_post(Ok(post(1, 7, 3)));

        read_post(&app, PostId::new(1)).await.unwrap();
        read_post(&app, PostId::new(1)).await.unwrap();
        assert_eq!(api.calls(), vec![Call::Post(PostId::new(1))]);

        tokio::time::advance(Duration::from_secs(31)).await;
        api.push_post(Ok(post(1, 7, 4)));
        assert_eq!(read_post(&app, PostId::new(1)).await.unwrap().votes, 4);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let (app, api, mut notices) = anonymous_app();
        api.push_post(Err(ApiError::new(ApiErrorKind::Timeout)));
        api.push_post(Err(ApiError::new(ApiErrorKind::Server(503))));
        api.push_post(Ok(post(1, 7, 3)));

        assert_eq!(read_post(&app, PostId::new(1)).await.unwrap().votes, 3);
        assert_eq!(api.calls().len(), 3);
        assert!(notices.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_and_serves_stale_data() {
        let (app, api, mut notices) = anonymous_app();
        app.cache.post.insert(PostId::new(1), Arc::new(post(1, 7, 3))).await;
        app.cache.invalidate_post(PostId::new(1)).await;

        for _ in 0..3 {
            api.push_post(Err(ApiError::new(ApiErrorKind::Network)));
        }
        assert_eq!(read_post(&app, PostId::new(1)).await.unwrap().votes, 3);
        assert_eq!(api.calls().len(), 3);
        assert!(matches!(notices.drain().as_slice(), [Notice::CouldNotLoad(..)]));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_not_retried() {
        let (app, api, mut notices) = anonymous_app();
        api.push_post(Err(ApiError::new(ApiErrorKind::NotFound)));

        let error = read_post(&app, PostId::new(1)).await.unwrap_err();
        assert!(error.current_context().is_not_found());
        assert_eq!(api.calls().len(), 1);
        assert!(notices.drain().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_policy() {
        let (app, _, mut notices) = signed_in_app(42);
        let error = ApiError::new(ApiErrorKind::Unauthorized);

        app.handle_unauthorized(&error, Access::ReadPosts);
        assert!(app.session.is_authenticated());

        app.handle_unauthorized(&ApiError::new(ApiErrorKind::Forbidden), Access::Mutation);
        assert!(app.session.is_authenticated());

        app.handle_unauthorized(&error, Access::Read);
        assert_eq!(app.session.state(), SessionState::Anonymous);
        assert!(notices.drain().is_empty());

        let (app, _, mut notices) = signed_in_app(42);
        app.handle_unauthorized(&error, Access::Mutation);
        assert_eq!(app.session.state(), SessionState::Anonymous);
        assert_eq!(notices.drain(), vec![Notice::RedirectToSignIn]);
    }
}
