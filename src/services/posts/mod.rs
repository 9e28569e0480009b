mod create;
mod delete;
mod edit;
mod feed;
mod get;

pub use self::create::CreatePost;
pub use self::delete::DeletePost;
pub use self::edit::EditPost;
pub use self::feed::{Feed, FEED_LIMIT};
pub use self::get::GetPost;

use error_stack::{Report, Result};
use thiserror::Error;
use validator::ValidateError;

use crate::api::{Access, ApiError};
use crate::auth::{Identity, Session};
use crate::notice::Notice;
use crate::types::Post;
use crate::App;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    #[error("Please sign in first")]
    SignInRequired,
    #[error("You can only change your own posts")]
    NotOwner,
    #[error("{0}")]
    Invalid(ValidateError),
    #[error("{0}")]
    Failed(String),
}

/// Whether the signed in user may edit or delete `post`.
#[must_use]
pub fn can_modify(session: &Session, post: &Post) -> bool {
    session
        .identity()
        .is_some_and(|identity| post.is_owned_by(identity.id))
}

fn require_identity(app: &App) -> Result<Identity, PostError> {
    app.session.identity().ok_or_else(|| {
        app.notify(Notice::RedirectToSignIn);
        Report::new(PostError::SignInRequired)
    })
}

fn require_owner(app: &App, post: &Post) -> Result<(), PostError> {
    let identity = require_identity(app)?;
    if post.is_owned_by(identity.id) {
        Ok(())
    } else {
        Err(Report::new(PostError::NotOwner)
            .attach_printable(format!("post {} belongs to user {}", post.id, post.owner_id)))
    }
}

fn mutation_failed(app: &App, report: Report<ApiError>, fallback: &'static str) -> Report<PostError> {
    let error = report.current_context();
    app.handle_unauthorized(error, Access::Mutation);
    app.notify(Notice::error(fallback));

    let message = error.message_or(fallback);
    report.change_context(PostError::Failed(message))
}
