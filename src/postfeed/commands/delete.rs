use crate::commands::{CmdMessage, CmdResult, Confirm};
use crate::error::{FeedError, Result};
use crate::model::PostId;
use crate::store::DocumentStore;

/// Deletes one post after the user confirms.
///
/// The raw feed is deliberately not touched here: the post disappears from views
/// when the store pushes the next snapshot. The only local effect is clearing
/// `expanded` when it points at the deleted post.
pub fn run<S, C>(
    store: &mut S,
    collection: &str,
    id: &PostId,
    confirm: &mut C,
    expanded: &mut Option<PostId>,
) -> Result<CmdResult>
where
    S: DocumentStore + ?Sized,
    C: Confirm + ?Sized,
{
    let prompt = format!("Are you sure you want to delete post {}?", id);
    if !confirm.confirm(&prompt) {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Deletion cancelled.")));
    }

    store
        .delete_post(collection, id)
        .map_err(|e| FeedError::Mutation {
            id: id.clone(),
            reason: e.to_string(),
        })?;

    if expanded.as_ref() == Some(id) {
        *expanded = None;
    }

    Ok(CmdResult::default().with_message(CmdMessage::success(format!("Post deleted: {}", id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::DEFAULT_COLLECTION;

    #[test]
    fn declining_cancels_without_touching_the_store() {
        let mut store = StoreFixture::new().with_scenario().store;
        let mut expanded = Some(PostId::new("a"));
        let mut asked = Vec::new();

        let result = run(
            &mut store,
            DEFAULT_COLLECTION,
            &PostId::new("a"),
            &mut |prompt: &str| {
                asked.push(prompt.to_string());
                false
            },
            &mut expanded,
        )
        .unwrap();

        assert_eq!(asked.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Info);
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 2);
        assert_eq!(expanded, Some(PostId::new("a")));
    }

    #[test]
    fn confirmed_delete_clears_matching_expansion() {
        let mut store = StoreFixture::new().with_scenario().store;
        let mut expanded = Some(PostId::new("a"));

        run(
            &mut store,
            DEFAULT_COLLECTION,
            &PostId::new("a"),
            &mut |_: &str| true,
            &mut expanded,
        )
        .unwrap();

        assert_eq!(expanded, None);
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 1);
    }

    #[test]
    fn other_expansion_is_kept() {
        let mut store = StoreFixture::new().with_scenario().store;
        let mut expanded = Some(PostId::new("b"));

        run(
            &mut store,
            DEFAULT_COLLECTION,
            &PostId::new("a"),
            &mut |_: &str| true,
            &mut expanded,
        )
        .unwrap();

        assert_eq!(expanded, Some(PostId::new("b")));
    }

    #[test]
    fn store_failure_is_a_mutation_error_and_keeps_state() {
        let mut store = StoreFixture::new().with_scenario().store;
        store.reject_deletes("permission denied");
        let mut expanded = Some(PostId::new("a"));

        let err = run(
            &mut store,
            DEFAULT_COLLECTION,
            &PostId::new("a"),
            &mut |_: &str| true,
            &mut expanded,
        )
        .unwrap_err();

        match err {
            FeedError::Mutation { id, reason } => {
                assert_eq!(id, PostId::new("a"));
                assert!(reason.contains("permission denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(expanded, Some(PostId::new("a")));
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 2);
    }
}
