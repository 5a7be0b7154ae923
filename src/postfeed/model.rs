use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Question,
    Article,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Question => "question",
            PostType::Article => "article",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "question" => Ok(PostType::Question),
            "article" => Ok(PostType::Article),
            other => Err(format!("unknown post type '{}'", other)),
        }
    }
}

/// Syntax highlighting mode for a post's code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Python,
    Xml,
    Css,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Xml => "xml",
            Language::Css => "css",
        }
    }

    /// Maps a file extension (without the dot) to the editor mode used for it.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "ts" | "tsx" => Some(Language::Javascript),
            "py" => Some(Language::Python),
            "html" => Some(Language::Xml),
            "css" => Some(Language::Css),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" => Ok(Language::Javascript),
            "python" => Ok(Language::Python),
            "xml" => Ok(Language::Xml),
            "css" => Ok(Language::Css),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Active,
}

/// Metadata about a file attached at authoring time. File contents are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// The create payload: a post without the fields the store assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    pub abstract_text: Option<String>,
    pub code: Option<String>,
    pub language: Option<Language>,
    pub tags: Vec<String>,
    pub author: String,
    pub status: PostStatus,
    pub attachments: Vec<Attachment>,
}

impl NewPost {
    pub fn new(post_type: PostType, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            post_type,
            title: title.into(),
            description: description.into(),
            abstract_text: None,
            code: None,
            language: None,
            tags: Vec::new(),
            author: String::new(),
            status: PostStatus::Active,
            attachments: Vec::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>, language: Language) -> Self {
        self.code = Some(code.into());
        self.language = Some(language);
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Materializes the stored document once the store has picked an id and timestamp.
    pub fn into_post(self, id: PostId, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            post_type: self.post_type,
            title: self.title,
            description: self.description,
            abstract_text: self.abstract_text,
            code: self.code,
            language: self.language,
            tags: self.tags,
            created_at,
            author: self.author,
            status: self.status,
            attachments: self.attachments,
        }
    }
}

/// Orders posts the way the feed query does: newest first, ties by id descending.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_document_field_names() {
        let post = NewPost::new(PostType::Article, "CSS Grid", "Layouts")
            .with_abstract("Short")
            .into_post(PostId::new("b"), Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "article");
        assert_eq!(json["abstract"], "Short");
        assert_eq!(json["status"], "active");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn missing_optional_fields_deserialize_to_defaults() {
        let json = r#"{"id":"x","type":"question","title":"T","description":"D","createdAt":"2024-01-01T00:00:00Z"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.tags.is_empty());
        assert!(post.attachments.is_empty());
        assert_eq!(post.status, PostStatus::Active);
        assert_eq!(post.language, None);
    }

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_extension("TSX"), Some(Language::Javascript));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("html"), Some(Language::Xml));
        assert_eq!(Language::from_extension("go"), None);
    }

    #[test]
    fn sorts_newest_first_with_id_tiebreak() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = t + chrono::Duration::seconds(5);
        let mut posts = vec![
            NewPost::new(PostType::Question, "a", "").into_post("a".into(), t),
            NewPost::new(PostType::Question, "b", "").into_post("b".into(), t),
            NewPost::new(PostType::Question, "c", "").into_post("c".into(), later),
        ];
        sort_newest_first(&mut posts);
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
