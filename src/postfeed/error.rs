use crate::model::PostId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Failed to delete post {id}: {reason}")]
    Mutation { id: PostId, reason: String },

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Invalid post: {0}")]
    Validation(String),

    #[error("Invalid filter: {0}")]
    InvalidCriteria(String),

    #[error("Feed view is closed and must be recreated")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
