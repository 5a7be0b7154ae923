use crate::commands::CmdResult;
use crate::error::{FeedError, Result};
use crate::model::{Post, PostId};
use crate::store::{DocumentStore, FeedQuery};

use super::list::all_posts;

/// Finds the post `input` refers to: an exact id, or a prefix matching exactly one id.
pub fn resolve<'a>(posts: &'a [Post], input: &str) -> Result<&'a Post> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FeedError::PostNotFound(PostId::new(input)));
    }
    if let Some(post) = posts.iter().find(|p| p.id.as_str() == input) {
        return Ok(post);
    }

    let mut candidates = posts.iter().filter(|p| p.id.as_str().starts_with(input));
    match (candidates.next(), candidates.next()) {
        (Some(post), None) => Ok(post),
        (Some(_), Some(_)) => Err(FeedError::Validation(format!(
            "id prefix '{}' matches more than one post",
            input
        ))),
        (None, _) => Err(FeedError::PostNotFound(PostId::new(input))),
    }
}

pub fn run<S: DocumentStore>(store: S, query: FeedQuery, id: &str) -> Result<CmdResult> {
    let posts = all_posts(store, query)?;
    let post = resolve(&posts, id)?.clone();
    Ok(CmdResult::default().with_listed_posts(vec![post]))
}
