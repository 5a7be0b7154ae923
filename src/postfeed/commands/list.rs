use crate::commands::CmdResult;
use crate::error::{FeedError, Result};
use crate::filter::FilterCriteria;
use crate::model::Post;
use crate::session::{FeedSession, Phase};
use crate::store::{DocumentStore, FeedQuery};

/// Opens a session, waits for the first snapshot and closes it again.
pub fn snapshot<S: DocumentStore>(store: S, query: FeedQuery) -> Result<FeedSession<S>> {
    let mut session = FeedSession::new(store, query);
    session.open()?;
    session.poll()?;

    match session.phase() {
        Phase::Live => Ok(session),
        Phase::Error => Err(FeedError::Subscription(
            session.last_error().unwrap_or_default(),
        )),
        _ => Err(FeedError::Subscription("no snapshot received".into())),
    }
}

/// One-shot listing: the filtered view plus stats over the whole collection.
pub fn run<S: DocumentStore>(
    store: S,
    query: FeedQuery,
    criteria: FilterCriteria,
) -> Result<CmdResult> {
    let mut session = snapshot(store, query)?;
    session.set_criteria(criteria);
    let view = session.view();
    session.close();

    Ok(CmdResult::default()
        .with_listed_posts(view.filtered.clone())
        .with_stats(view.stats))
}

/// The whole collection, unfiltered.
pub fn all_posts<S: DocumentStore>(store: S, query: FeedQuery) -> Result<Vec<Post>> {
    let mut session = snapshot(store, query)?;
    let posts = session.raw().to_vec();
    session.close();
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TypeFilter;
    use crate::model::PostType;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn lists_filtered_posts_with_stats() {
        let mut store = StoreFixture::new().with_samples().store;
        let criteria = FilterCriteria::default().with_type(TypeFilter::Only(PostType::Article));

        let result = run(&mut store, FeedQuery::default(), criteria).unwrap();

        assert_eq!(result.listed_posts.len(), 2);
        let stats = result.stats.unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.questions, 3);
        assert_eq!(stats.articles, 2);
        assert_eq!(stats.filtered, 2);
    }

    #[test]
    fn listing_leaves_no_listener_behind() {
        let store = StoreFixture::new().with_scenario().store;
        run(store.clone(), FeedQuery::default(), FilterCriteria::default()).unwrap();
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn empty_collection_is_an_empty_list() {
        let store = StoreFixture::new().store;
        let result = run(store, FeedQuery::new("nothing-here"), FilterCriteria::default()).unwrap();
        assert!(result.listed_posts.is_empty());
        assert_eq!(result.stats.unwrap().total, 0);
    }

    #[test]
    fn subscription_failure_is_an_error() {
        let store = StoreFixture::new().with_scenario().store;
        store.reject_subscriptions("missing or insufficient permissions");

        let err = run(store, FeedQuery::default(), FilterCriteria::default()).unwrap_err();
        match err {
            FeedError::Subscription(reason) => assert!(reason.contains("insufficient")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
