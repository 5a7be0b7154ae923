use super::subscription::Listeners;
use super::{
    next_timestamp, validate_collection, DocumentStore, FeedQuery, OnError, OnSnapshot,
    Subscription,
};
use crate::error::{FeedError, Result};
use crate::model::{sort_newest_first, NewPost, Post, PostId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed document store.
///
/// Each collection is a JSON array in `<root>/<collection>.json`. Every `poll`
/// re-reads the files that have live listeners, so writes made by another process
/// (another `postfeed` invocation, a text editor) reach subscribers too.
pub struct FileStore {
    root: PathBuf,
    listeners: Listeners,
    // Last state delivered per collection; a snapshot is pushed only when this differs.
    delivered: HashMap<String, Vec<Post>>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            listeners: Listeners::default(),
            delivered: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(FeedError::Io)?;
        }
        Ok(())
    }

    fn load(&self, collection: &str) -> Result<Vec<Post>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(FeedError::Io)?;
        let mut posts: Vec<Post> =
            serde_json::from_str(&content).map_err(FeedError::Serialization)?;
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    fn save(&self, collection: &str, posts: &[Post]) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(posts).map_err(FeedError::Serialization)?;

        // Readers in other processes only ever see a complete file.
        let tmp_file = self.root.join(format!(".{}-{}.tmp", collection, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(FeedError::Io)?;
        fs::rename(&tmp_file, self.collection_path(collection)).map_err(FeedError::Io)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn subscribe(
        &mut self,
        query: &FeedQuery,
        on_snapshot: OnSnapshot,
        on_error: OnError,
    ) -> Result<Subscription> {
        validate_collection(&query.collection)?;
        Ok(self
            .listeners
            .register(&query.collection, on_snapshot, on_error))
    }

    fn poll(&mut self) -> Result<usize> {
        let mut delivered = 0;

        for collection in self.listeners.collections() {
            match self.load(&collection) {
                Ok(posts) => {
                    let changed = self.delivered.get(&collection) != Some(&posts);
                    let targets = self.listeners.snapshot_targets(&collection, changed);
                    for target in targets {
                        if target.deliver(&posts) {
                            delivered += 1;
                        }
                    }
                    self.delivered.insert(collection, posts);
                }
                Err(e) => {
                    let reason = format!("cannot read '{}': {}", collection, e);
                    for target in self.listeners.targets(&collection, None) {
                        if target.fail(&reason) {
                            delivered += 1;
                        }
                    }
                    self.delivered.remove(&collection);
                }
            }
        }

        Ok(delivered)
    }

    fn create_post(&mut self, collection: &str, post: NewPost) -> Result<Post> {
        validate_collection(collection)?;
        let mut posts = self.load(collection)?;
        let newest = posts.iter().map(|p| p.created_at).max();
        let post = post.into_post(PostId::generate(), next_timestamp(newest));
        posts.push(post.clone());
        sort_newest_first(&mut posts);
        self.save(collection, &posts)?;
        log::debug!("created post {} in '{}'", post.id, collection);
        Ok(post)
    }

    fn delete_post(&mut self, collection: &str, id: &PostId) -> Result<()> {
        validate_collection(collection)?;
        let mut posts = self.load(collection)?;
        let before = posts.len();
        posts.retain(|p| &p.id != id);
        if posts.len() == before {
            return Err(FeedError::PostNotFound(id.clone()));
        }
        self.save(collection, &posts)?;
        log::debug!("deleted post {} from '{}'", id, collection);
        Ok(())
    }
}
