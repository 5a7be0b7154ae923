//! # Command Layer
//!
//! Business logic for each user-facing operation. Commands operate on domain types
//! and a [`DocumentStore`](crate::store::DocumentStore), and return a structured
//! [`CmdResult`] instead of printing anything.
//!
//! Commands avoid terminal concerns entirely. When an operation needs the user's
//! consent (deleting a post), the caller passes a [`Confirm`] implementation and the
//! UI decides how to ask.
//!
//! - [`list`]: take one snapshot of the feed and derive the filtered view
//! - [`show`]: one post, for the expanded view
//! - [`delete`]: confirmed delete, clearing the local expanded selection
//! - [`create`]: build a post from authoring input and insert it
//! - [`seed`]: insert the sample corpus
//! - [`config`]: read and change configuration

use crate::config::FeedConfig;
use crate::model::Post;
use crate::view::FeedStats;

pub mod config;
pub mod create;
pub mod delete;
pub mod list;
pub mod seed;
pub mod show;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_posts: Vec<Post>,
    pub listed_posts: Vec<Post>,
    pub stats: Option<FeedStats>,
    pub config: Option<FeedConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_affected_posts(mut self, posts: Vec<Post>) -> Self {
        self.affected_posts = posts;
        self
    }

    pub fn with_listed_posts(mut self, posts: Vec<Post>) -> Self {
        self.listed_posts = posts;
        self
    }

    pub fn with_stats(mut self, stats: FeedStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_config(mut self, config: FeedConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Asks the user to approve a destructive operation. Returning `false` cancels it.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}
