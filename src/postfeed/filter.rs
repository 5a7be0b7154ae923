//! # Filter Predicate
//!
//! Decides whether a single [`Post`] belongs in the current view. Each criterion is
//! independent and an empty criterion selects everything, so the default
//! [`FilterCriteria`] matches every post. The overall decision is the AND of all
//! criteria.
//!
//! All comparisons are case-insensitive substring checks except the post type
//! (exact) and the date (calendar-day equality in a time zone).

use crate::error::{FeedError, Result};
use crate::model::{Post, PostType};
use chrono::{Local, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(PostType),
}

impl TypeFilter {
    pub fn accepts(&self, post_type: PostType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == post_type,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse::<PostType>()
            .map(TypeFilter::Only)
            .map_err(FeedError::InvalidCriteria)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("all"),
            TypeFilter::Only(t) => write!(f, "{}", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterCriteria {
    /// Matched against title and description.
    pub text: String,
    /// Matched against every tag of a post.
    pub tag: String,
    pub post_type: TypeFilter,
    pub date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_type(mut self, post_type: TypeFilter) -> Self {
        self.post_type = post_type;
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.tag.is_empty()
            && self.post_type == TypeFilter::All
            && self.date.is_none()
    }

    /// Parses a `YYYY-MM-DD` day. An empty (or blank) input means "no date filter".
    pub fn parse_date(input: &str) -> Result<Option<NaiveDate>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| FeedError::InvalidCriteria(format!("date '{}': {}", input, e)))
    }
}

/// Returns whether `post` passes every criterion, comparing days in local time.
pub fn matches(post: &Post, criteria: &FilterCriteria) -> bool {
    matches_in(post, criteria, &Local)
}

/// Same as [`matches`], with the time zone used for the calendar-day check made explicit.
pub fn matches_in<Tz: TimeZone>(post: &Post, criteria: &FilterCriteria, tz: &Tz) -> bool {
    matches_text(post, &criteria.text)
        && matches_tag(post, &criteria.tag)
        && criteria.post_type.accepts(post.post_type)
        && matches_day(post, criteria.date, tz)
}

fn matches_text(post: &Post, text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let needle = text.to_lowercase();
    post.title.to_lowercase().contains(&needle)
        || post.description.to_lowercase().contains(&needle)
}

fn matches_tag(post: &Post, tag: &str) -> bool {
    if tag.is_empty() {
        return true;
    }
    let needle = tag.to_lowercase();
    post.tags
        .iter()
        .any(|t| t.to_lowercase().contains(&needle))
}

fn matches_day<Tz: TimeZone>(post: &Post, date: Option<NaiveDate>, tz: &Tz) -> bool {
    match date {
        None => true,
        Some(day) => post.created_at.with_timezone(tz).date_naive() == day,
    }
}
