use error_stack::{Report, Result};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Optimistic, Pending};
use crate::api::Access;
use crate::notice::{Notice, SIGN_IN_TO_VOTE, VOTE_FAILED};
use crate::types::{PostId, PostWithVotes, Vote, VoteDirection};
use crate::App;

/// Vote tally of a post as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteState {
    pub liked: bool,
    pub count: u64,
}

impl VoteState {
    /// Freshly fetched posts are never shown as liked.
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self {
            liked: false,
            count,
        }
    }

    pub fn apply(&mut self, dir: VoteDirection) {
        match dir {
            VoteDirection::Like => {
                self.liked = true;
                self.count = self.count.saturating_add(1);
            }
            VoteDirection::Unlike => {
                self.liked = false;
                self.count = self.count.saturating_sub(1);
            }
        }
    }
}

/// Vote state of one rendered post. Dropping every clone of it
/// "unmounts" the post, late vote responses are then ignored.
#[derive(Debug, Clone)]
pub struct PostVotes {
    post_id: PostId,
    state: Optimistic<VoteState>,
}

impl PostVotes {
    #[must_use]
    pub fn new(post: &PostWithVotes) -> Self {
        Self::with_count(post.post.id, post.votes)
    }

    #[must_use]
    pub fn with_count(post_id: PostId, count: u64) -> Self {
        Self {
            post_id,
            state: Optimistic::new(VoteState::new(count)),
        }
    }

    #[must_use]
    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    #[must_use]
    pub fn state(&self) -> VoteState {
        self.state.get()
    }

    /// What a toggle would do right now.
    #[must_use]
    pub fn next_direction(&self) -> VoteDirection {
        if self.state().liked {
            VoteDirection::Unlike
        } else {
            VoteDirection::Like
        }
    }

    /// Takes the tally of a refetched post over whatever was guessed.
    pub fn refresh(&self, post: &PostWithVotes) {
        let liked = self.state().liked;
        self.state.set(VoteState {
            liked,
            count: post.votes,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("Please sign in to vote")]
    SignInRequired,
    #[error("Failed to vote")]
    Failed,
}

/// Casts votes optimistically and reconciles them with the server.
#[derive(Debug, Clone)]
pub struct VoteReconciler {
    app: App,
}

impl VoteReconciler {
    #[must_use]
    pub(crate) fn new(app: App) -> Self {
        Self { app }
    }

    /// Applies the vote locally without touching the network yet.
    ///
    /// Anonymous users are turned away right here.
    pub fn begin(&self, votes: &PostVotes, dir: VoteDirection) -> Result<PendingVote, VoteError> {
        if !self.app.session.is_authenticated() {
            self.app
                .notify(Notice::SignInRequired(SIGN_IN_TO_VOTE.into()));
            return Err(Report::new(VoteError::SignInRequired));
        }

        let change = votes.state.apply(|state| state.apply(dir));
        let vote = Vote {
            post_id: votes.post_id,
            dir,
        };
        debug!(post.id = %vote.post_id, dir = vote.dir.as_u8(), "applied vote optimistically");

        Ok(PendingVote {
            app: self.app.clone(),
            vote,
            change,
        })
    }

    pub fn begin_toggle(&self, votes: &PostVotes) -> Result<PendingVote, VoteError> {
        self.begin(votes, votes.next_direction())
    }

    pub async fn vote(&self, votes: &PostVotes, dir: VoteDirection) -> Result<(), VoteError> {
        self.begin(votes, dir)?.settle().await
    }

    pub async fn toggle(&self, votes: &PostVotes) -> Result<(), VoteError> {
        self.begin_toggle(votes)?.settle().await
    }
}

/// A vote that was applied locally and still has to reach the server.
#[derive(Debug)]
#[must_use = "a pending vote does nothing until settled"]
pub struct PendingVote {
    app: App,
    vote: Vote,
    change: Pending<VoteState>,
}

impl PendingVote {
    #[must_use]
    pub fn vote(&self) -> Vote {
        self.vote
    }

    /// Sends the vote. On success the cached tallies are invalidated so
    /// the next read brings the real count; on failure the count goes
    /// back to where it was and the post shows as not liked.
    #[tracing::instrument(skip_all, fields(post.id = %self.vote.post_id, dir = self.vote.dir.as_u8()))]
    pub async fn settle(self) -> Result<(), VoteError> {
        let Self { app, vote, change } = self;

        match app.api.vote(&vote).await {
            Ok(()) => {
                change.commit();
                app.cache.invalidate_post(vote.post_id).await;
                app.cache.invalidate_posts().await;
                Ok(())
            }
            Err(report) => {
                warn!(error = %report.current_context(), "vote was not accepted");
                app.handle_unauthorized(report.current_context(), Access::Mutation);

                let reverted = change.revert_with(|state, snapshot| {
                    state.count = snapshot.count;
                    state.liked = false;
                });
                if !reverted {
                    debug!("post is no longer shown, ignoring vote failure");
                }

                app.notify(Notice::error(VOTE_FAILED));
                Err(report.change_context(VoteError::Failed))
            }
        }
    }
}
