//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the only entry point
//! a UI needs. It:
//!
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (id prefixes are resolved to full ids against a snapshot)
//! - **Applies configuration** (which collection, which default author)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and no prompting. Confirmation is passed in as a [`Confirm`].
//!
//! `FeedApi<S: DocumentStore>` is generic over the storage backend:
//! - Production: `FeedApi<FileStore>`
//! - Testing: `FeedApi<InMemoryStore>`

use crate::commands::{self, CmdResult, Confirm};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::model::Post;
use crate::session::FeedSession;
use crate::store::{DocumentStore, FeedQuery};
use std::path::{Path, PathBuf};

pub struct FeedApi<S: DocumentStore> {
    store: S,
    config: FeedConfig,
    config_dir: PathBuf,
}

impl<S: DocumentStore> FeedApi<S> {
    /// Creates the facade, loading configuration from `config_dir`.
    pub fn new(store: S, config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let config = FeedConfig::load(&config_dir)?;
        Ok(Self {
            store,
            config,
            config_dir,
        })
    }

    pub fn query(&self) -> FeedQuery {
        FeedQuery::new(self.config.collection.clone())
    }

    /// A live session over the configured collection, already subscribed.
    /// Nothing is delivered until the session is polled.
    pub fn open_session(&mut self) -> Result<FeedSession<&mut S>> {
        let query = self.query();
        let mut session = FeedSession::new(&mut self.store, query);
        session.open()?;
        Ok(session)
    }

    /// The whole collection as of one snapshot, unfiltered.
    pub fn snapshot(&mut self) -> Result<Vec<Post>> {
        let query = self.query();
        commands::list::all_posts(&mut self.store, query)
    }

    pub fn list_posts(&mut self, criteria: FilterCriteria) -> Result<CmdResult> {
        let query = self.query();
        commands::list::run(&mut self.store, query, criteria)
    }

    pub fn show_post(&mut self, id: &str) -> Result<CmdResult> {
        let query = self.query();
        commands::show::run(&mut self.store, query, id)
    }

    /// Deletes the post `id` refers to (full id or unique prefix) once `confirm` agrees.
    pub fn delete_post<C: Confirm + ?Sized>(
        &mut self,
        id: &str,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        let query = self.query();
        let mut session = commands::list::snapshot(&mut self.store, query)?;
        let post_id = {
            let raw = session.raw();
            commands::show::resolve(&raw, id)?.id.clone()
        };
        let result = session.delete_post(&post_id, confirm);
        session.close();
        result
    }

    pub fn create_post(&mut self, draft: commands::create::PostDraft) -> Result<CmdResult> {
        let collection = self.config.collection.clone();
        commands::create::run(&mut self.store, &collection, draft, &self.config.author)
    }

    pub fn seed(&mut self) -> Result<CmdResult> {
        let collection = self.config.collection.clone();
        commands::seed::run(&mut self.store, &collection)
    }

    pub fn config(&mut self, action: commands::config::ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.config_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn settings(&self) -> &FeedConfig {
        &self.config
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::ConfigAction;
    use crate::commands::create::PostDraft;
    use crate::commands::MessageLevel;
    use crate::error::FeedError;
    use crate::model::PostType;
    use crate::session::Phase;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn make_api(store: InMemoryStore) -> (TempDir, FeedApi<InMemoryStore>) {
        let temp = tempfile::tempdir().unwrap();
        let api = FeedApi::new(store, temp.path()).unwrap();
        (temp, api)
    }

    #[test]
    fn api_list_posts() {
        let (_temp, mut api) = make_api(StoreFixture::new().with_samples().store);
        let result = api
            .list_posts(FilterCriteria::default().with_tag("css"))
            .unwrap();
        assert_eq!(result.listed_posts.len(), 1);
        assert_eq!(result.stats.unwrap().total, 5);
    }

    #[test]
    fn api_delete_post() {
        let store = StoreFixture::new().with_samples().store;
        let (_temp, mut api) = make_api(store.clone());

        let result = api.delete_post("p2", &mut |_: &str| true).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(store.posts("posts").len(), 4);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn api_delete_unknown_post() {
        let (_temp, mut api) = make_api(StoreFixture::new().with_scenario().store);
        let err = api.delete_post("zzz", &mut |_: &str| true).unwrap_err();
        assert!(matches!(err, FeedError::PostNotFound(_)));
    }

    #[test]
    fn api_create_uses_configured_author_and_collection() {
        let store = InMemoryStore::new();
        let (_temp, mut api) = make_api(store.clone());
        api.config(ConfigAction::Set("author".into(), "Backend Developer".into()))
            .unwrap();
        api.config(ConfigAction::Set("collection".into(), "drafts".into()))
            .unwrap();

        api.create_post(PostDraft {
            post_type: PostType::Question,
            title: "PUT or PATCH?".into(),
            ..PostDraft::default()
        })
        .unwrap();

        let drafts = store.posts("drafts");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].author, "Backend Developer");
        assert!(store.posts("posts").is_empty());
    }

    #[test]
    fn api_seed_then_session() {
        let (_temp, mut api) = make_api(InMemoryStore::new());
        api.seed().unwrap();

        let mut session = api.open_session().unwrap();
        assert_eq!(session.phase(), Phase::Subscribing);
        session.poll().unwrap();
        assert_eq!(session.phase(), Phase::Live);
        assert_eq!(session.view().stats.total, 5);
    }

    #[test]
    fn api_snapshot_is_unfiltered_and_ordered() {
        let store = StoreFixture::new().with_samples().store;
        let (_temp, mut api) = make_api(store.clone());
        let posts = api.snapshot().unwrap();
        assert_eq!(posts, store.posts("posts"));
        assert_eq!(posts[0].id.as_str(), "p5");
    }

    #[test]
    fn api_loads_existing_config() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = FeedConfig::default();
        config.set("collection", "questions").unwrap();
        config.save(temp.path()).unwrap();

        let api = FeedApi::new(InMemoryStore::new(), temp.path()).unwrap();
        assert_eq!(api.query(), FeedQuery::new("questions"));
        assert_eq!(api.config_dir(), temp.path());
    }
}
