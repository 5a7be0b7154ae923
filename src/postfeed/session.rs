//! # Feed Session
//!
//! A [`FeedSession`] is one live view of the feed: what a page showing the list
//! would own. It ties the pieces together:
//!
//! ```text
//!   DocumentStore ──snapshot──▶ raw list ──┐
//!                                          ├──▶ ViewCache ──▶ DerivedView
//!   user input ─────────────▶ criteria ────┘
//!
//!   delete ──▶ DocumentStore            (raw list changes only via the next snapshot)
//!         └──▶ expanded = None          (immediately, if it pointed at the post)
//! ```
//!
//! ## State Machine
//!
//! ```text
//!   Idle ──open──▶ Subscribing ──snapshot──▶ Live ◀─┐
//!                       │                     │  └──snapshot
//!                       └──────failure────────┴──▶ Error
//!   (any) ──close──▶ Unsubscribed
//! ```
//!
//! `Error` and `Unsubscribed` are terminal: a new session has to be created.
//!
//! ## Ownership
//!
//! The raw list and phase live in an `Rc<RefCell<_>>` shared with the store
//! callbacks. Each callback remembers the generation it was created for and ignores
//! deliveries once that generation is no longer the active one, so a late snapshot
//! never lands in a replaced or closed view. Everything runs on one thread, inside
//! [`FeedSession::poll`].

use crate::commands::{self, CmdMessage, CmdResult, Confirm};
use crate::error::{FeedError, Result};
use crate::filter::FilterCriteria;
use crate::model::{Post, PostId};
use crate::store::{DocumentStore, FeedQuery, Subscription};
use crate::view::{DerivedView, ViewCache, ViewKey};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Subscribing,
    Live,
    Error,
    Unsubscribed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Error | Phase::Unsubscribed)
    }
}

struct FeedState {
    phase: Phase,
    generation: u64,
    raw: Rc<Vec<Post>>,
    raw_version: u64,
    last_error: Option<String>,
    notices: Vec<CmdMessage>,
}

impl FeedState {
    fn replace_raw(&mut self, posts: Vec<Post>) {
        self.raw = Rc::new(posts);
        self.raw_version += 1;
    }

    fn fail(&mut self, reason: String) {
        self.phase = Phase::Error;
        self.notices
            .push(CmdMessage::error(format!("Failed to fetch posts: {}", reason)));
        self.last_error = Some(reason);
    }
}

fn failure_reason(err: FeedError) -> String {
    match err {
        FeedError::Subscription(reason) => reason,
        other => other.to_string(),
    }
}

pub struct FeedSession<S: DocumentStore> {
    // Declared first so the subscription is released before the rest is dropped.
    subscription: Option<Subscription>,
    store: S,
    query: FeedQuery,
    state: Rc<RefCell<FeedState>>,
    criteria: FilterCriteria,
    criteria_version: u64,
    expanded: Option<PostId>,
    cache: ViewCache,
}

impl<S: DocumentStore> FeedSession<S> {
    pub fn new(store: S, query: FeedQuery) -> Self {
        Self {
            subscription: None,
            store,
            query,
            state: Rc::new(RefCell::new(FeedState {
                phase: Phase::Idle,
                generation: 0,
                raw: Rc::new(Vec::new()),
                raw_version: 0,
                last_error: None,
                notices: Vec::new(),
            })),
            criteria: FilterCriteria::default(),
            criteria_version: 0,
            expanded: None,
            cache: ViewCache::new(),
        }
    }

    /// Starts (or restarts) the live feed. Any previous subscription is released first,
    /// so a session never receives duplicate deliveries.
    pub fn open(&mut self) -> Result<()> {
        if self.phase().is_terminal() {
            return Err(FeedError::SessionClosed);
        }
        self.release();

        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.phase = Phase::Subscribing;
            state.replace_raw(Vec::new());
            state.generation
        };

        let on_snapshot = {
            let state = Rc::clone(&self.state);
            Box::new(move |posts: Vec<Post>| {
                let mut state = state.borrow_mut();
                if state.generation != generation || state.phase.is_terminal() {
                    log::trace!("dropping snapshot for stale subscription (gen {})", generation);
                    return;
                }
                state.replace_raw(posts);
                state.phase = Phase::Live;
            })
        };
        let on_error = {
            let state = Rc::clone(&self.state);
            Box::new(move |err: FeedError| {
                let mut state = state.borrow_mut();
                if state.generation != generation || state.phase.is_terminal() {
                    return;
                }
                state.fail(failure_reason(err));
            })
        };

        match self.store.subscribe(&self.query, on_snapshot, on_error) {
            Ok(subscription) => {
                log::debug!(
                    "feed session opened on '{}' (gen {})",
                    self.query.collection,
                    generation
                );
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                self.state.borrow_mut().fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Runs one turn of the event loop. Returns how many notifications were delivered.
    pub fn poll(&mut self) -> Result<usize> {
        if self.phase() == Phase::Unsubscribed {
            return Ok(0);
        }
        self.store.poll()
    }

    /// Tears the view down: unsubscribes, then discards the raw list.
    pub fn close(&mut self) {
        self.release();
        let mut state = self.state.borrow_mut();
        state.phase = Phase::Unsubscribed;
        state.replace_raw(Vec::new());
        self.cache.invalidate();
        self.expanded = None;
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// The latest snapshot, exactly as pushed by the store.
    pub fn raw(&self) -> Rc<Vec<Post>> {
        Rc::clone(&self.state.borrow().raw)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.criteria_version += 1;
        }
    }

    /// Filtered list and stats for the current raw list and criteria.
    pub fn view(&mut self) -> Rc<DerivedView> {
        let (raw, raw_version) = {
            let state = self.state.borrow();
            (Rc::clone(&state.raw), state.raw_version)
        };
        let key = ViewKey {
            raw_version,
            criteria_version: self.criteria_version,
        };
        self.cache.get_or_derive(key, &raw, &self.criteria)
    }

    pub fn expanded(&self) -> Option<&PostId> {
        self.expanded.as_ref()
    }

    /// Expands `id`, or collapses it if it is already the expanded post.
    pub fn toggle_expanded(&mut self, id: &PostId) {
        if self.expanded.as_ref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.clone());
        }
    }

    /// Deletes a post after confirmation. On failure a notice is recorded and nothing
    /// local changes; on success only the expanded selection may change.
    pub fn delete_post<C: Confirm + ?Sized>(
        &mut self,
        id: &PostId,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        let result = commands::delete::run(
            &mut self.store,
            &self.query.collection,
            id,
            confirm,
            &mut self.expanded,
        );
        if let Err(e) = &result {
            self.state
                .borrow_mut()
                .notices
                .push(CmdMessage::error(e.to_string()));
        }
        result
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Drains user-facing notices (feed failures, failed deletes).
    pub fn take_notices(&mut self) -> Vec<CmdMessage> {
        std::mem::take(&mut self.state.borrow_mut().notices)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: DocumentStore> Drop for FeedSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}
