use super::subscription::Listeners;
use super::{
    next_timestamp, validate_collection, DocumentStore, FeedQuery, OnError, OnSnapshot,
    Subscription,
};
use crate::error::{FeedError, Result};
use crate::model::{sort_newest_first, NewPost, Post, PostId};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// In-memory document store for testing and development.
/// Does NOT persist data.
///
/// Cloning yields another handle to the same store, so a test can keep one handle
/// to drive the event loop and inject failures while a session owns the other.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    collections: HashMap<String, Vec<Post>>,
    listeners: Listeners,
    changed: BTreeSet<String>,
    failures: Vec<PendingFailure>,
    last_stamp: Option<DateTime<Utc>>,
    reject_deletes: Option<String>,
    reject_subscriptions: Option<String>,
}

struct PendingFailure {
    collection: String,
    subscription: Option<u64>,
    reason: String,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fully-formed post as-is, keeping its id and timestamp.
    pub fn insert(&self, collection: &str, post: Post) {
        let mut inner = self.inner.borrow_mut();
        if inner.last_stamp.map_or(true, |last| last < post.created_at) {
            inner.last_stamp = Some(post.created_at);
        }
        let posts = inner.collections.entry(collection.to_string()).or_default();
        posts.retain(|p| p.id != post.id);
        posts.push(post);
        sort_newest_first(posts);
        inner.changed.insert(collection.to_string());
    }

    /// Current contents of a collection, newest first.
    pub fn posts(&self, collection: &str) -> Vec<Post> {
        self.inner
            .borrow()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow_mut().listeners.len()
    }

    /// Makes every following delete fail with `reason`, until [`Self::accept_deletes`].
    pub fn reject_deletes(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().reject_deletes = Some(reason.into());
    }

    pub fn accept_deletes(&self) {
        self.inner.borrow_mut().reject_deletes = None;
    }

    /// Makes every following subscription fail on its first poll.
    pub fn reject_subscriptions(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().reject_subscriptions = Some(reason.into());
    }

    /// Breaks every live feed of `collection` on the next poll.
    pub fn disconnect(&self, collection: &str, reason: impl Into<String>) {
        self.inner.borrow_mut().failures.push(PendingFailure {
            collection: collection.to_string(),
            subscription: None,
            reason: reason.into(),
        });
    }
}

impl DocumentStore for InMemoryStore {
    fn subscribe(
        &mut self,
        query: &FeedQuery,
        on_snapshot: OnSnapshot,
        on_error: OnError,
    ) -> Result<Subscription> {
        validate_collection(&query.collection)?;
        let mut inner = self.inner.borrow_mut();
        let subscription = inner
            .listeners
            .register(&query.collection, on_snapshot, on_error);

        if let Some(reason) = inner.reject_subscriptions.clone() {
            inner.failures.push(PendingFailure {
                collection: query.collection.clone(),
                subscription: Some(subscription.id()),
                reason,
            });
        }
        Ok(subscription)
    }

    fn poll(&mut self) -> Result<usize> {
        let mut delivered = 0;

        // Failures first: a broken feed must not receive one last snapshot.
        let failures = std::mem::take(&mut self.inner.borrow_mut().failures);
        for failure in failures {
            let targets = self
                .inner
                .borrow_mut()
                .listeners
                .targets(&failure.collection, failure.subscription);
            for target in targets {
                if target.fail(&failure.reason) {
                    delivered += 1;
                }
            }
        }

        // Writes made while callbacks run are delivered on the next poll.
        let (collections, changed) = {
            let mut inner = self.inner.borrow_mut();
            (inner.listeners.collections(), std::mem::take(&mut inner.changed))
        };
        for collection in collections {
            let (targets, posts) = {
                let mut inner = self.inner.borrow_mut();
                let changed = changed.contains(&collection);
                let targets = inner.listeners.snapshot_targets(&collection, changed);
                let posts = inner
                    .collections
                    .get(&collection)
                    .cloned()
                    .unwrap_or_default();
                (targets, posts)
            };
            // The store is not borrowed while callbacks run.
            for target in targets {
                if target.deliver(&posts) {
                    delivered += 1;
                }
            }
        }

        Ok(delivered)
    }

    fn create_post(&mut self, collection: &str, post: NewPost) -> Result<Post> {
        validate_collection(collection)?;
        let created_at = next_timestamp(self.inner.borrow().last_stamp);
        let post = post.into_post(PostId::generate(), created_at);
        self.insert(collection, post.clone());
        Ok(post)
    }

    fn delete_post(&mut self, collection: &str, id: &PostId) -> Result<()> {
        validate_collection(collection)?;
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = &inner.reject_deletes {
            return Err(FeedError::Store(reason.clone()));
        }
        let posts = inner
            .collections
            .get_mut(collection)
            .ok_or_else(|| FeedError::PostNotFound(id.clone()))?;
        let before = posts.len();
        posts.retain(|p| &p.id != id);
        if posts.len() == before {
            return Err(FeedError::PostNotFound(id.clone()));
        }
        inner.changed.insert(collection.to_string());
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::commands::seed::sample_posts as seed_drafts;
    use crate::model::PostType;
    use crate::store::DEFAULT_COLLECTION;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, hour, 0, 0).unwrap()
    }

    /// Two posts, newest first: a question "a" tagged react and an article "b" tagged css.
    pub fn scenario_posts() -> Vec<Post> {
        vec![
            NewPost::new(PostType::Question, "Hooks help", "useEffect cleanup")
                .with_tags(["react"])
                .into_post(PostId::new("a"), at(12)),
            NewPost::new(PostType::Article, "CSS Grid", "Layouts")
                .with_tags(["css"])
                .into_post(PostId::new("b"), at(11)),
        ]
    }

    /// The seed corpus with fixed ids (`p1`..`p5`) and timestamps, newest first.
    pub fn sample_posts() -> Vec<Post> {
        let mut posts: Vec<Post> = seed_drafts()
            .into_iter()
            .enumerate()
            .map(|(i, draft)| draft.into_post(PostId::new(format!("p{}", i + 1)), at(i as u32)))
            .collect();
        sort_newest_first(&mut posts);
        posts
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_posts(self, posts: Vec<Post>) -> Self {
            for post in posts {
                self.store.insert(DEFAULT_COLLECTION, post);
            }
            self
        }

        pub fn with_scenario(self) -> Self {
            self.with_posts(scenario_posts())
        }

        pub fn with_samples(self) -> Self {
            self.with_posts(sample_posts())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{scenario_posts, StoreFixture};
    use super::*;
    use crate::model::PostType;
    use crate::store::DEFAULT_COLLECTION;
    use std::cell::Cell;

    type Received = Rc<RefCell<Vec<Vec<Post>>>>;

    fn record(store: &mut InMemoryStore) -> (Subscription, Received, Rc<Cell<usize>>) {
        let received: Received = Rc::default();
        let errors = Rc::new(Cell::new(0));
        let (received0, errors0) = (Rc::clone(&received), Rc::clone(&errors));
        let sub = store
            .subscribe(
                &FeedQuery::default(),
                Box::new(move |posts| received0.borrow_mut().push(posts)),
                Box::new(move |_| errors0.set(errors0.get() + 1)),
            )
            .unwrap();
        (sub, received, errors)
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn first_snapshot_arrives_on_poll() {
        let mut store = StoreFixture::new().with_scenario().store;
        let (_sub, received, _) = record(&mut store);

        assert!(received.borrow().is_empty());
        assert_eq!(store.poll().unwrap(), 1);
        assert_eq!(ids(&received.borrow()[0]), vec!["a", "b"]);

        // Nothing changed: nothing delivered.
        assert_eq!(store.poll().unwrap(), 0);
    }

    #[test]
    fn every_change_pushes_the_whole_list() {
        let mut store = StoreFixture::new().with_scenario().store;
        let (_sub, received, _) = record(&mut store);
        store.poll().unwrap();

        let created = store
            .create_post(DEFAULT_COLLECTION, NewPost::new(PostType::Question, "New", ""))
            .unwrap();
        store.poll().unwrap();
        store.delete_post(DEFAULT_COLLECTION, &PostId::new("b")).unwrap();
        store.poll().unwrap();

        let received = received.borrow();
        assert_eq!(received.len(), 3);
        assert_eq!(ids(&received[1]), vec![created.id.as_str(), "a", "b"]);
        assert_eq!(ids(&received[2]), vec![created.id.as_str(), "a"]);
    }

    #[test]
    fn created_posts_are_stamped_after_existing_ones() {
        let mut store = StoreFixture::new().with_scenario().store;
        let newest = scenario_posts()[0].created_at;
        let post = store
            .create_post(DEFAULT_COLLECTION, NewPost::new(PostType::Article, "t", "d"))
            .unwrap();
        assert!(post.created_at >= newest);
        assert_eq!(store.posts(DEFAULT_COLLECTION)[0].id, post.id);
    }

    #[test]
    fn unsubscribed_listeners_get_nothing() {
        let mut store = StoreFixture::new().with_scenario().store;
        let (sub, received, _) = record(&mut store);
        sub.unsubscribe();
        sub.unsubscribe();

        store.poll().unwrap();
        assert!(received.borrow().is_empty());
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn deleting_unknown_post_fails() {
        let mut store = StoreFixture::new().with_scenario().store;
        let err = store
            .delete_post(DEFAULT_COLLECTION, &PostId::new("zzz"))
            .unwrap_err();
        assert!(matches!(err, FeedError::PostNotFound(_)));
    }

    #[test]
    fn rejected_deletes_leave_the_collection_alone() {
        let mut store = StoreFixture::new().with_scenario().store;
        store.reject_deletes("permission denied");
        assert!(store
            .delete_post(DEFAULT_COLLECTION, &PostId::new("a"))
            .is_err());
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 2);

        store.accept_deletes();
        store.delete_post(DEFAULT_COLLECTION, &PostId::new("a")).unwrap();
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 1);
    }

    #[test]
    fn rejected_subscription_reports_error_and_no_snapshot() {
        let mut store = StoreFixture::new().with_scenario().store;
        store.reject_subscriptions("missing permissions");
        let (sub, received, errors) = record(&mut store);

        store.poll().unwrap();
        assert_eq!(errors.get(), 1);
        assert!(received.borrow().is_empty());
        assert!(!sub.is_active());
    }

    #[test]
    fn disconnect_breaks_live_feeds() {
        let mut store = StoreFixture::new().with_scenario().store;
        let (_sub, received, errors) = record(&mut store);
        store.poll().unwrap();

        store.disconnect(DEFAULT_COLLECTION, "network lost");
        store.delete_post(DEFAULT_COLLECTION, &PostId::new("a")).unwrap();
        store.poll().unwrap();

        assert_eq!(errors.get(), 1);
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn invalid_collection_is_rejected_up_front() {
        let mut store = InMemoryStore::new();
        let result = store.subscribe(
            &FeedQuery::new(""),
            Box::new(|_| {}),
            Box::new(|_| {}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn writes_made_during_a_delivery_reach_the_next_poll() {
        let mut store = InMemoryStore::new();
        let mut writer = store.clone();
        let received: Received = Rc::default();
        let received0 = Rc::clone(&received);
        let _sub = store
            .subscribe(
                &FeedQuery::default(),
                Box::new(move |posts| {
                    if received0.borrow().is_empty() {
                        writer
                            .create_post(
                                DEFAULT_COLLECTION,
                                NewPost::new(PostType::Question, "Late", ""),
                            )
                            .unwrap();
                    }
                    received0.borrow_mut().push(posts);
                }),
                Box::new(|_| {}),
            )
            .unwrap();

        assert_eq!(store.poll().unwrap(), 1);
        assert_eq!(store.poll().unwrap(), 1);
        assert_eq!(store.poll().unwrap(), 0);

        let received = received.borrow();
        assert_eq!(received.len(), 2);
        assert!(received[0].is_empty());
        assert_eq!(received[1][0].title, "Late");
        assert_eq!(received[1], store.posts(DEFAULT_COLLECTION));
    }

    #[test]
    fn delete_rejects_invalid_collection_names() {
        let mut store = StoreFixture::new().with_scenario().store;
        let err = store
            .delete_post("../posts", &PostId::new("a"))
            .unwrap_err();
        assert!(matches!(err, FeedError::Store(_)));
        assert_eq!(store.posts(DEFAULT_COLLECTION).len(), 2);
    }
}
