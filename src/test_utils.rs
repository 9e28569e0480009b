use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use error_stack::{Report, Result};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::{Api, ApiError, ApiErrorKind};
use crate::auth::MemoryCredentialStore;
use crate::config::Config;
use crate::notice::{self, Notices};
use crate::types::{
    LoginCredentials, NewUser, Post, PostId, PostPayload, PostWithVotes, PostsQuery, Token, User,
    UserId, Vote,
};
use crate::App;

/// A request the fake API received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Register(String),
    User(UserId),
    Posts(PostsQuery),
    Post(PostId),
    /// Title of the new post.
    CreatePost(String),
    UpdatePost(PostId),
    DeletePost(PostId),
    Vote(Vote),
}

type Reply<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    login: VecDeque<Reply<Token>>,
    register: VecDeque<Reply<User>>,
    user: VecDeque<Reply<User>>,
    posts: VecDeque<Reply<Vec<PostWithVotes>>>,
    post: VecDeque<Reply<PostWithVotes>>,
    create_post: VecDeque<Reply<Post>>,
    update_post: VecDeque<Reply<Post>>,
    delete_post: VecDeque<Reply<()>>,
    vote: VecDeque<Reply<()>>,
}

/// [`Api`] answering with scripted replies, in order, per endpoint.
/// An endpoint without replies left fails with a network error.
#[derive(Debug, Default)]
pub struct FakeApi {
    script: Mutex<Script>,
}

macro_rules! scripted {
    ($($push:ident => $field:ident: $ty:ty),* $(,)?) => {
        impl FakeApi {
            $(
                pub fn $push(&self, reply: Reply<$ty>) {
                    self.script.lock().unwrap().$field.push_back(reply);
                }
            )*
        }
    };
}

scripted! {
    push_login => login: Token,
    push_register => register: User,
    push_user => user: User,
    push_posts => posts: Vec<PostWithVotes>,
    push_post => post: PostWithVotes,
    push_create_post => create_post: Post,
    push_update_post => update_post: Post,
    push_delete_post => delete_post: (),
    push_vote => vote: (),
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    fn answer<T>(&self, call: Call, pick: impl FnOnce(&mut Script) -> &mut VecDeque<Reply<T>>) -> Result<T, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call.clone());
        pick(&mut *script)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::new(ApiErrorKind::Network).with_detail(format!("no reply scripted for {call:?}")))
            })
            .map_err(Report::new)
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Token, ApiError> {
        self.answer(Call::Login(credentials.username.clone()), |s| &mut s.login)
    }

    async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.answer(Call::Register(user.email.clone()), |s| &mut s.register)
    }

    async fn user(&self, id: UserId) -> Result<User, ApiError> {
        self.answer(Call::User(id), |s| &mut s.user)
    }

    async fn posts(&self, query: &PostsQuery) -> Result<Vec<PostWithVotes>, ApiError> {
        self.answer(Call::Posts(query.clone()), |s| &mut s.posts)
    }

    async fn post(&self, id: PostId) -> Result<PostWithVotes, ApiError> {
        self.answer(Call::Post(id), |s| &mut s.post)
    }

    async fn create_post(&self, payload: &PostPayload) -> Result<Post, ApiError> {
        self.answer(Call::CreatePost(payload.title.clone()), |s| &mut s.create_post)
    }

    async fn update_post(&self, id: PostId, _payload: &PostPayload) -> Result<Post, ApiError> {
        self.answer(Call::UpdatePost(id), |s| &mut s.update_post)
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ApiError> {
        self.answer(Call::DeletePost(id), |s| &mut s.delete_post)
    }

    async fn vote(&self, vote: &Vote) -> Result<(), ApiError> {
        self.answer(Call::Vote(*vote), |s| &mut s.vote)
    }
}

/// Unsigned-looking but well formed access token.
pub fn make_token(user_id: &str, expiry: DateTime<Utc>) -> String {
    make_token_with(&json!({ "user_id": user_id, "exp": expiry.timestamp() }))
}

pub fn make_token_with(claims: &serde_json::Value) -> String {
    jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(b"test")).unwrap()
}

pub fn user(id: u64, email: &str) -> User {
    User {
        id: UserId::new(id),
        email: email.into(),
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap().into(),
    }
}

pub fn post(id: u64, owner: u64, votes: u64) -> PostWithVotes {
    PostWithVotes {
        post: Post {
            id: PostId::new(id),
            title: format!("Post #{id}"),
            content: "Some content worth reading".into(),
            published: true,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().into(),
            owner_id: UserId::new(owner),
            owner: user(owner, "owner@example.com"),
        },
        votes,
    }
}

fn app_with_store(store: MemoryCredentialStore) -> (App, Arc<FakeApi>, Notices) {
    crate::logging::init_for_tests();

    let api = Arc::new(FakeApi::default());
    let (notifier, notices) = notice::channel();
    let app = App::new(Config::default(), api.clone(), Arc::new(store), notifier);
    app.session.initialize();

    (app, api, notices)
}

pub fn anonymous_app() -> (App, Arc<FakeApi>, Notices) {
    app_with_store(MemoryCredentialStore::new())
}

pub fn signed_in_app(user_id: u64) -> (App, Arc<FakeApi>, Notices) {
    let token = make_token(&user_id.to_string(), Utc::now() + Duration::hours(1));
    let (app, api, notices) = app_with_store(MemoryCredentialStore::with_token(token));
    assert!(app.session.is_authenticated());
    (app, api, notices)
}
