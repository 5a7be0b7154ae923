//! # Storage Layer
//!
//! This module defines the document store abstraction for postfeed. The
//! [`DocumentStore`] trait is the only way the rest of the crate talks to the
//! backing collection, so the feed pipeline can be exercised against a fake.
//!
//! ## Live Queries
//!
//! Reads are not one-shot fetches. [`DocumentStore::subscribe`] registers a pair of
//! callbacks for an ordered collection and returns a [`Subscription`] handle. On
//! every change the store pushes the **entire** ordered list to `on_snapshot`,
//! never a diff. If the feed breaks, `on_error` is called once and the listener is
//! dropped; there is no retry here.
//!
//! ## Event Loop
//!
//! Callbacks only ever run inside [`DocumentStore::poll`], on the caller's
//! thread. Mutations (`create_post`, `delete_post`) return as soon as the write is
//! done; the resulting snapshot shows up on a later `poll`. This is what makes a
//! delete "eventually" visible to a view.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: in-process fake with failure injection, for tests
//! - [`fs::FileStore`]: JSON file per collection; `poll` picks up writes made by
//!   other processes
//!
//! ## Ordering
//!
//! Snapshots are ordered by `created_at` descending (ties by id descending).
//! `created_at` is assigned by the store and never goes backwards.

use crate::error::{FeedError, Result};
use crate::model::{NewPost, Post, PostId};
use chrono::{DateTime, Duration, Utc};

pub mod fs;
pub mod memory;
pub mod subscription;

pub use subscription::Subscription;

pub const DEFAULT_COLLECTION: &str = "posts";

/// Receives the full ordered collection on every change.
pub type OnSnapshot = Box<dyn FnMut(Vec<Post>)>;

/// Receives the reason a live feed stopped.
pub type OnError = Box<dyn FnMut(FeedError)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
}

/// An ordered query over one named collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub collection: String,
    pub order: SortOrder,
}

impl FeedQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order: SortOrder::NewestFirst,
        }
    }
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION)
    }
}

pub trait DocumentStore {
    /// Open a live query. The first snapshot arrives on a later `poll`.
    fn subscribe(
        &mut self,
        query: &FeedQuery,
        on_snapshot: OnSnapshot,
        on_error: OnError,
    ) -> Result<Subscription>;

    /// Deliver pending notifications. Returns how many callbacks ran.
    fn poll(&mut self) -> Result<usize>;

    /// Insert a document. The store assigns its id and `created_at`.
    fn create_post(&mut self, collection: &str, post: NewPost) -> Result<Post>;

    /// Delete a single document by id.
    fn delete_post(&mut self, collection: &str, id: &PostId) -> Result<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &mut S {
    fn subscribe(
        &mut self,
        query: &FeedQuery,
        on_snapshot: OnSnapshot,
        on_error: OnError,
    ) -> Result<Subscription> {
        (**self).subscribe(query, on_snapshot, on_error)
    }

    fn poll(&mut self) -> Result<usize> {
        (**self).poll()
    }

    fn create_post(&mut self, collection: &str, post: NewPost) -> Result<Post> {
        (**self).create_post(collection, post)
    }

    fn delete_post(&mut self, collection: &str, id: &PostId) -> Result<()> {
        (**self).delete_post(collection, id)
    }
}

pub(crate) fn validate_collection(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FeedError::Store(format!("invalid collection name '{}'", name)))
    }
}

/// Next server timestamp: the current time, but always after `floor`.
pub(crate) fn next_timestamp(floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match floor {
        Some(floor) if floor >= now => floor + Duration::microseconds(1),
        _ => now,
    }
}
