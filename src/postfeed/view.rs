//! # Derived View
//!
//! The view shown to the user is computed purely from two inputs: the latest raw
//! snapshot and the current [`FilterCriteria`]. Nothing here is stored
//! independently of those inputs.
//!
//! [`derive_view`] is the pure function. [`ViewCache`] memoizes its last result,
//! keyed by the version of each input, so repeated reads between changes do not
//! refilter the list. A new key evicts the previous entry; a stale view is never
//! returned once either input has moved on.

use crate::filter::{matches_in, FilterCriteria};
use crate::model::{Post, PostType};
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::rc::Rc;

/// Counts over the whole corpus plus the size of the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub total: usize,
    pub questions: usize,
    pub articles: usize,
    pub filtered: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    pub filtered: Vec<Post>,
    pub stats: FeedStats,
}

pub fn derive_view(raw: &[Post], criteria: &FilterCriteria) -> DerivedView {
    derive_view_in(raw, criteria, &Local)
}

pub fn derive_view_in<Tz: TimeZone>(raw: &[Post], criteria: &FilterCriteria, tz: &Tz) -> DerivedView {
    let filtered: Vec<Post> = raw
        .iter()
        .filter(|post| matches_in(post, criteria, tz))
        .cloned()
        .collect();

    let questions = raw
        .iter()
        .filter(|p| p.post_type == PostType::Question)
        .count();

    let stats = FeedStats {
        total: raw.len(),
        questions,
        articles: raw.len() - questions,
        filtered: filtered.len(),
    };

    DerivedView { filtered, stats }
}

/// Identifies one combination of inputs. Each side is bumped whenever that input is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewKey {
    pub raw_version: u64,
    pub criteria_version: u64,
}

#[derive(Debug, Default)]
pub struct ViewCache {
    entry: Option<(ViewKey, Rc<DerivedView>)>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for `key`, recomputing only if the key differs from the cached one.
    pub fn get_or_derive(
        &mut self,
        key: ViewKey,
        raw: &[Post],
        criteria: &FilterCriteria,
    ) -> Rc<DerivedView> {
        if let Some((cached_key, view)) = &self.entry {
            if *cached_key == key {
                return Rc::clone(view);
            }
        }

        log::trace!(
            "recomputing view (raw v{}, criteria v{})",
            key.raw_version,
            key.criteria_version
        );
        let view = Rc::new(derive_view(raw, criteria));
        self.entry = Some((key, Rc::clone(&view)));
        view
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
