use chrono::{DateTime, Utc};
use error_stack::{Report, Result, ResultExt};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{decode_token, CredentialStore, Identity, TokenStatus};
use crate::api::Api;
use crate::types::{LoginCredentials, NewUser};

const LOGIN_FAILED: &str = "Invalid email or password";
const REGISTER_FAILED: &str = "Failed to create account";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stored credentials have not been looked at yet.
    Initializing,
    Anonymous,
    Authenticated(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    Login(String),
    #[error("{0}")]
    Register(String),
    #[error("Failed to save credentials")]
    Storage,
}

/// Who is signed in, backed by the credential store.
///
/// Cheap to clone, every clone shares the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    api: Arc<dyn Api>,
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
}

impl Session {
    #[must_use]
    pub fn new(api: Arc<dyn Api>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                state: RwLock::new(SessionState::Initializing),
            }),
        }
    }

    /// Restores the session from stored credentials.
    pub fn initialize(&self) -> SessionState {
        self.initialize_at(Utc::now())
    }

    /// Like [`Session::initialize`] with an explicit clock. Expired or
    /// unreadable tokens are removed from the store.
    #[tracing::instrument(skip(self))]
    pub fn initialize_at(&self, now: DateTime<Utc>) -> SessionState {
        let token = match self.inner.store.load() {
            Ok(token) => token,
            Err(error) => {
                warn!(?error, "discarding unreadable stored credentials");
                self.remove_token();
                None
            }
        };

        let state = match token.map(|token| decode_token(token.as_str(), now)) {
            None => SessionState::Anonymous,
            Some(TokenStatus::Valid { identity, expiry }) => {
                debug!(user.id = %identity.id, %expiry, "restored session");
                SessionState::Authenticated(identity)
            }
            Some(TokenStatus::Invalid(reason)) => {
                info!(%reason, "discarding stored access token");
                self.remove_token();
                SessionState::Anonymous
            }
        };

        self.set_state(state);
        state
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self.state() {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Initializing | SessionState::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state() == SessionState::Initializing
    }

    /// Exchanges credentials for an access token and keeps it.
    ///
    /// Nothing is stored unless the token the server hands out is
    /// usable right now.
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, SessionError> {
        let token = self.inner.api.login(credentials).await.map_err(|report| {
            let message = report.current_context().message_or(LOGIN_FAILED);
            report.change_context(SessionError::Login(message))
        })?;

        let identity = match decode_token(token.access_token.as_str(), Utc::now()) {
            TokenStatus::Valid { identity, .. } => identity,
            TokenStatus::Invalid(reason) => {
                return Err(Report::new(reason)
                    .change_context(SessionError::Login(LOGIN_FAILED.into()))
                    .attach_printable("server handed out an unusable access token"));
            }
        };

        self.inner
            .store
            .save(&token.access_token)
            .change_context(SessionError::Storage)?;

        self.set_state(SessionState::Authenticated(identity));
        info!(user.id = %identity.id, "logged in");

        Ok(identity)
    }

    /// Creates an account and signs into it right away.
    #[tracing::instrument(skip_all, fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<Identity, SessionError> {
        self.inner.api.register(user).await.map_err(|report| {
            let message = report.current_context().message_or(REGISTER_FAILED);
            report.change_context(SessionError::Register(message))
        })?;

        self.login(&LoginCredentials::from(user))
            .await
            .attach_printable("account was created but signing in failed")
    }

    /// Forgets the identity and the stored token. Safe to call when
    /// nobody is signed in.
    #[tracing::instrument(skip(self))]
    pub fn logout(&self) {
        self.remove_token();
        self.set_state(SessionState::Anonymous);
    }

    fn remove_token(&self) {
        if let Err(error) = self.inner.store.remove() {
            warn!(?error, "could not remove stored access token");
        }
    }

    fn set_state(&self, state: SessionState) {
        *self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind};
    use crate::auth::{FileCredentialStore, MemoryCredentialStore};
    use crate::test_utils::{make_token, user, Call, FakeApi};
    use crate::types::{Token, UserId};
    use crate::util::Sensitive;
    use chrono::Duration;

    fn setup(store: MemoryCredentialStore) -> (Session, Arc<FakeApi>, Arc<MemoryCredentialStore>) {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(store);
        (Session::new(api.clone(), store.clone()), api, store)
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            username: "a@b.com".into(),
            password: Sensitive::from("Secret123"),
        }
    }

    fn token_response(token: String) -> Token {
        Token {
            access_token: Sensitive::new(token),
            token_type: "bearer".into(),
        }
    }

    #[test]
    fn starts_initializing() {
        let (session, ..) = setup(MemoryCredentialStore::new());
        assert!(session.is_loading());
        assert_eq!(session.identity(), None);

        assert_eq!(session.initialize(), SessionState::Anonymous);
        assert!(!session.is_loading());
    }

    #[test]
    fn restores_valid_token() {
        let token = make_token("42", Utc::now() + Duration::hours(1));
        let (session, api, store) = setup(MemoryCredentialStore::with_token(token.clone()));

        let state = session.initialize();
        assert_eq!(state, SessionState::Authenticated(Identity { id: UserId::new(42) }));
        assert!(session.is_authenticated());
        assert_eq!(store.load().unwrap().unwrap().as_str(), token);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn discards_expired_and_garbage_tokens() {
        let expired = make_token("42", Utc::now() - Duration::minutes(1));
        for token in [expired, "garbage".to_string()] {
            let (session, _, store) = setup(MemoryCredentialStore::with_token(token));
            assert_eq!(session.initialize(), SessionState::Anonymous);
            assert_eq!(store.load().unwrap(), None);
        }
    }

    #[tokio::test]
    async fn recovers_from_corrupt_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"access_token": "trunc"#).unwrap();

        let api = Arc::new(FakeApi::default());
        let store = Arc::new(FileCredentialStore::new(&path));
        let session = Session::new(api.clone(), store.clone());

        assert_eq!(session.initialize(), SessionState::Anonymous);
        assert!(!path.exists());

        let token = make_token("42", Utc::now() + Duration::hours(1));
        api.push_login(Ok(token_response(token.clone())));

        let identity = session.login(&credentials()).await.unwrap();
        assert_eq!(identity.id, UserId::new(42));
        assert_eq!(store.load().unwrap().unwrap().as_str(), token);

        session.logout();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn login_stores_token() {
        let (session, api, store) = setup(MemoryCredentialStore::new());
        session.initialize();

        let token = make_token("42", Utc::now() + Duration::hours(1));
        api.push_login(Ok(token_response(token.clone())));

        let identity = session.login(&credentials()).await.unwrap();
        assert_eq!(identity.id, UserId::new(42));
        assert_eq!(session.identity(), Some(identity));
        assert_eq!(store.load().unwrap().unwrap().as_str(), token);
        assert_eq!(api.calls(), vec![Call::Login("a@b.com".into())]);
    }

    #[tokio::test]
    async fn login_failure_uses_server_detail() {
        let (session, api, store) = setup(MemoryCredentialStore::new());
        session.initialize();

        api.push_login(Err(ApiError::new(ApiErrorKind::Forbidden).with_detail("Invalid Credentials")));
        let error = session.login(&credentials()).await.unwrap_err();
        assert_eq!(error.current_context(), &SessionError::Login("Invalid Credentials".into()));

        api.push_login(Err(ApiError::new(ApiErrorKind::Network)));
        let error = session.login(&credentials()).await.unwrap_err();
        assert_eq!(error.current_context().to_string(), "Invalid email or password");

        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn login_rejects_unusable_token() {
        let (session, api, store) = setup(MemoryCredentialStore::new());
        session.initialize();

        let expired = make_token("42", Utc::now() - Duration::hours(1));
        api.push_login(Ok(token_response(expired)));

        assert!(session.login(&credentials()).await.is_err());
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn register_then_login() {
        let (session, api, _) = setup(MemoryCredentialStore::new());
        session.initialize();

        api.push_register(Ok(user(42, "a@b.com")));
        api.push_login(Ok(token_response(make_token("42", Utc::now() + Duration::hours(1)))));

        let new_user = NewUser {
            email: "a@b.com".into(),
            password: Sensitive::from("Secret123"),
        };
        let identity = session.register(&new_user).await.unwrap();
        assert_eq!(identity.id, UserId::new(42));
        assert_eq!(
            api.calls(),
            vec![Call::Register("a@b.com".into()), Call::Login("a@b.com".into())]
        );
    }

    #[tokio::test]
    async fn register_failure_skips_login() {
        let (session, api, _) = setup(MemoryCredentialStore::new());
        session.initialize();

        api.push_register(Err(ApiError::new(ApiErrorKind::Server(500))));
        let new_user = NewUser {
            email: "a@b.com".into(),
            password: Sensitive::from("Secret123"),
        };
        let error = session.register(&new_user).await.unwrap_err();
        assert_eq!(error.current_context().to_string(), "Failed to create account");
        assert_eq!(api.calls(), vec![Call::Register("a@b.com".into())]);
    }

    #[test]
    fn logout_is_idempotent() {
        let token = make_token("42", Utc::now() + Duration::hours(1));
        let (session, _, store) = setup(MemoryCredentialStore::with_token(token));
        session.initialize();

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.load().unwrap(), None);

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
    }
}
