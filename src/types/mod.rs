mod auth;
mod post;
mod timestamp;
mod user;
mod vote;

pub mod forms;
pub mod id;

pub use self::auth::{LoginCredentials, Token};
pub use self::id::{PostId, UserId};
pub use self::post::{Post, PostPayload, PostWithVotes, PostsQuery};
pub use self::timestamp::{ParseTimestampError, Timestamp};
pub use self::user::{NewUser, User};
pub use self::vote::{Vote, VoteDirection};
