//! Post authoring.
//!
//! Turns form-style input into a [`NewPost`]: tags arrive as one comma-separated
//! string, the abstract only applies to articles, and code may come from an attached
//! source file. Attached files are recorded as metadata only.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FeedError, Result};
use crate::model::{Attachment, Language, NewPost, PostStatus, PostType};
use crate::store::DocumentStore;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted as code attachments.
pub const CODE_EXTENSIONS: [&str; 13] = [
    "js", "jsx", "ts", "tsx", "py", "html", "css", "java", "cpp", "c", "php", "rb", "go",
];

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    pub abstract_text: String,
    pub code: String,
    /// Explicit choice; otherwise detected from the first attachment, else javascript.
    pub language: Option<Language>,
    /// Comma-separated, e.g. `"react, hooks"`.
    pub tags: String,
    pub files: Vec<PathBuf>,
    pub author: Option<String>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            post_type: PostType::Article,
            title: String::new(),
            description: String::new(),
            abstract_text: String::new(),
            code: String::new(),
            language: None,
            tags: String::new(),
            files: Vec::new(),
            author: None,
        }
    }
}

pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_code_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.as_str()))
}

fn mime_type(ext: &str) -> &'static str {
    match ext {
        "js" | "jsx" => "text/javascript",
        "ts" | "tsx" => "text/x-typescript",
        "py" => "text/x-python",
        "html" => "text/html",
        "css" => "text/css",
        "java" => "text/x-java",
        "c" | "cpp" => "text/x-c",
        "php" => "application/x-httpd-php",
        "rb" => "text/x-ruby",
        _ => "text/plain",
    }
}

fn attachment_for(path: &Path) -> Result<Attachment> {
    let meta = fs::metadata(path).map_err(FeedError::Io)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension(path).unwrap_or_default();
    Ok(Attachment {
        name,
        size: meta.len(),
        mime_type: mime_type(&ext).to_string(),
    })
}

/// Validates the draft and produces the document to insert, plus any warnings.
pub fn build(draft: PostDraft, default_author: &str) -> Result<(NewPost, Vec<CmdMessage>)> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(FeedError::Validation("Title cannot be empty".into()));
    }

    let mut warnings = Vec::new();
    let mut code_files = Vec::new();
    for path in &draft.files {
        if is_code_file(path) {
            code_files.push(path.as_path());
        } else {
            warnings.push(CmdMessage::warning(format!(
                "Skipped {}: not a supported code file",
                path.display()
            )));
        }
    }

    let mut code = draft.code.trim().to_string();
    let mut language = draft.language;
    if code.is_empty() {
        if let Some(first) = code_files.first() {
            code = fs::read_to_string(first).map_err(FeedError::Io)?.trim().to_string();
            if language.is_none() {
                language = extension(first).and_then(|ext| Language::from_extension(&ext));
            }
        }
    }

    let attachments = code_files
        .iter()
        .map(|path| attachment_for(path))
        .collect::<Result<Vec<_>>>()?;

    let abstract_text = match draft.post_type {
        PostType::Article => Some(draft.abstract_text.trim().to_string()),
        PostType::Question => None,
    };

    let (code, language) = if code.is_empty() {
        (None, None)
    } else {
        (Some(code), Some(language.unwrap_or_default()))
    };

    let author = draft
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(default_author)
        .to_string();

    let post = NewPost {
        post_type: draft.post_type,
        title: title.to_string(),
        description: draft.description.trim().to_string(),
        abstract_text,
        code,
        language,
        tags: parse_tags(&draft.tags),
        author,
        status: PostStatus::Active,
        attachments,
    };
    Ok((post, warnings))
}

pub fn run<S: DocumentStore + ?Sized>(
    store: &mut S,
    collection: &str,
    draft: PostDraft,
    default_author: &str,
) -> Result<CmdResult> {
    let (new_post, warnings) = build(draft, default_author)?;
    let post = store.create_post(collection, new_post)?;

    let mut result = CmdResult::default();
    for warning in warnings {
        result.add_message(warning);
    }
    result.add_message(CmdMessage::success(format!(
        "Post created ({}): {}",
        post.id, post.title
    )));
    Ok(result.with_affected_posts(vec![post]))
}
