//! Subscription handles and the listener registry shared by the store backends.
//!
//! A [`Subscription`] and the store-side listener share one `active` flag. Turning
//! it off from either side stops delivery: the handle does it on `unsubscribe`
//! (or drop), the store does it after reporting a feed failure.

use super::{OnError, OnSnapshot};
use crate::error::FeedError;
use crate::model::Post;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug)]
pub struct Subscription {
    id: u64,
    collection: String,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Stops all further callbacks. Returns `false` if it was already stopped.
    pub fn unsubscribe(&self) -> bool {
        let was_active = self.active.replace(false);
        if was_active {
            log::debug!("unsubscribed #{} from '{}'", self.id, self.collection);
        }
        was_active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A clone of a registered listener that can be invoked without borrowing the store.
#[derive(Clone)]
pub(crate) struct ListenerHandle {
    id: u64,
    active: Rc<Cell<bool>>,
    on_snapshot: Rc<RefCell<OnSnapshot>>,
    on_error: Rc<RefCell<OnError>>,
}

impl ListenerHandle {
    /// Returns whether the callback ran.
    pub(crate) fn deliver(&self, posts: &[Post]) -> bool {
        // The handle may have been dropped by an earlier callback in the same turn.
        if !self.active.get() {
            return false;
        }
        log::trace!("delivering {} posts to #{}", posts.len(), self.id);
        (self.on_snapshot.borrow_mut())(posts.to_vec());
        true
    }

    /// Reports a feed failure and deactivates the listener. Returns whether the callback ran.
    pub(crate) fn fail(&self, reason: &str) -> bool {
        if !self.active.replace(false) {
            return false;
        }
        log::warn!("subscription #{} failed: {}", self.id, reason);
        (self.on_error.borrow_mut())(FeedError::Subscription(reason.to_string()));
        true
    }
}

struct Listener {
    collection: String,
    primed: bool,
    handle: ListenerHandle,
}

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<Listener>,
}

impl Listeners {
    pub(crate) fn register(
        &mut self,
        collection: &str,
        on_snapshot: OnSnapshot,
        on_error: OnError,
    ) -> Subscription {
        self.next_id += 1;
        let active = Rc::new(Cell::new(true));
        self.entries.push(Listener {
            collection: collection.to_string(),
            primed: false,
            handle: ListenerHandle {
                id: self.next_id,
                active: Rc::clone(&active),
                on_snapshot: Rc::new(RefCell::new(on_snapshot)),
                on_error: Rc::new(RefCell::new(on_error)),
            },
        });
        log::debug!("subscribed #{} to '{}'", self.next_id, collection);
        Subscription {
            id: self.next_id,
            collection: collection.to_string(),
            active,
        }
    }

    /// Forgets listeners whose handle was unsubscribed or which already failed.
    pub(crate) fn prune(&mut self) {
        self.entries.retain(|l| l.handle.active.get());
    }

    /// Collections that currently have at least one live listener.
    pub(crate) fn collections(&mut self) -> Vec<String> {
        self.prune();
        let mut names: Vec<String> = self.entries.iter().map(|l| l.collection.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Listeners of `collection` that should receive the current state: every one of
    /// them if the collection changed, otherwise only those that never got a snapshot.
    pub(crate) fn snapshot_targets(&mut self, collection: &str, changed: bool) -> Vec<ListenerHandle> {
        self.prune();
        self.entries
            .iter_mut()
            .filter(|l| l.collection == collection && (changed || !l.primed))
            .map(|l| {
                l.primed = true;
                l.handle.clone()
            })
            .collect()
    }

    /// Live listeners of `collection`, optionally narrowed to one subscription id.
    pub(crate) fn targets(&mut self, collection: &str, only: Option<u64>) -> Vec<ListenerHandle> {
        self.prune();
        self.entries
            .iter()
            .filter(|l| l.collection == collection && only.map_or(true, |id| l.handle.id == id))
            .map(|l| l.handle.clone())
            .collect()
    }

    pub(crate) fn len(&mut self) -> usize {
        self.prune();
        self.entries.len()
    }
}
