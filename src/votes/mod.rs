mod optimistic;
mod reconciler;

pub use self::optimistic::{Optimistic, Pending};
pub use self::reconciler::{PendingVote, PostVotes, VoteError, VoteReconciler, VoteState};
