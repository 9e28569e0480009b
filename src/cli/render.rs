use chrono::Utc;
use posthub::api::ApiError;
use posthub::types::PostWithVotes;
use posthub::votes::VoteState;

use super::CliError;

/// Turns a missing post into a message instead of a failure.
pub fn found<T>(
    result: error_stack::Result<T, ApiError>,
) -> error_stack::Result<Option<T>, CliError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(report) if report.current_context().is_not_found() => {
            println!("Post not found");
            Ok(None)
        }
        Err(report) => Err(report.change_context(CliError)),
    }
}

pub fn post_summary(post: &PostWithVotes) {
    let PostWithVotes { post, votes } = post;
    let draft = if post.published { "" } else { " [draft]" };
    println!(
        "#{} {}{draft} ({votes} likes) by {}, {}",
        post.id,
        post.title,
        post.owner.email,
        post.created_at.relative_to(Utc::now())
    );
}

pub fn post_detail(post: &PostWithVotes, editable: bool) {
    post_summary(post);
    println!();
    println!("{}", post.post.content);
    if editable {
        println!();
        println!("You can edit or delete this post");
    }
}

pub fn votes(state: &VoteState) {
    let liked = if state.liked { "liked" } else { "not liked" };
    println!("{} likes ({liked})", state.count);
}
