use clap::{Args, Parser, Subcommand};
use postfeed::commands::create::PostDraft;
use postfeed::error::{FeedError, Result};
use postfeed::filter::{FilterCriteria, TypeFilter};
use postfeed::model::{Language, PostType};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2026-10-16 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "postfeed", bin_name = "postfeed", version = get_version())]
#[command(about = "Live feed of developer questions and articles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Search and filter options shared by `list` and `watch`.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Text to look for in titles and descriptions
    #[arg(short, long)]
    pub search: Option<String>,

    /// Text to look for in tags
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Post type: all, question or article
    #[arg(long = "type", value_name = "TYPE", default_value = "all")]
    pub post_type: String,

    /// Only posts created on this day (YYYY-MM-DD, local time)
    #[arg(long)]
    pub date: Option<String>,
}

impl Default for FilterArgs {
    fn default() -> Self {
        Self {
            search: None,
            tag: None,
            post_type: "all".to_string(),
            date: None,
        }
    }
}

impl FilterArgs {
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let post_type: TypeFilter = self.post_type.parse()?;
        let date = FilterCriteria::parse_date(self.date.as_deref().unwrap_or(""))?;
        Ok(FilterCriteria::default()
            .with_text(self.search.clone().unwrap_or_default())
            .with_tag(self.tag.clone().unwrap_or_default())
            .with_type(post_type)
            .with_date(date))
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the post
    #[arg(long)]
    pub title: String,

    /// question or article
    #[arg(long = "type", value_name = "TYPE", default_value = "article")]
    pub post_type: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Short summary, articles only
    #[arg(long = "abstract", default_value = "")]
    pub abstract_text: String,

    /// Comma-separated tags, e.g. "react, hooks"
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Code snippet
    #[arg(long, default_value = "")]
    pub code: String,

    /// Language of the snippet: javascript, python, xml or css
    #[arg(long)]
    pub language: Option<String>,

    /// Attach a source file (repeatable). The first code file supplies the snippet
    /// when --code is not given.
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Overrides the configured author
    #[arg(long)]
    pub author: Option<String>,
}

impl CreateArgs {
    pub fn into_draft(self) -> Result<PostDraft> {
        let post_type: PostType = self.post_type.parse().map_err(FeedError::Validation)?;
        let language = self
            .language
            .map(|l| l.parse::<Language>().map_err(FeedError::Validation))
            .transpose()?;
        Ok(PostDraft {
            post_type,
            title: self.title,
            description: self.description,
            abstract_text: self.abstract_text,
            code: self.code,
            language,
            tags: self.tags,
            files: self.files,
            author: self.author,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List posts, newest first
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show one post in full
    #[command(alias = "v")]
    Show {
        /// Post id (or a unique prefix of it)
        id: String,
    },

    /// Keep the list on screen and refresh it whenever the collection changes
    Watch {
        #[command(flatten)]
        filters: FilterArgs,

        /// Stop after the first snapshot
        #[arg(long)]
        once: bool,
    },

    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        /// Post id (or a unique prefix of it)
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a question or an article
    #[command(alias = "n")]
    Create(CreateArgs),

    /// Insert the sample posts
    Seed,

    /// Get or set configuration
    Config {
        /// Configuration key (collection, author, watch-interval-ms)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "postfeed", "list", "-s", "grid", "--tag", "css", "--type", "article",
        ])
        .unwrap();
        let Some(Commands::List { filters }) = cli.command else {
            panic!("expected list");
        };
        let criteria = filters.to_criteria().unwrap();
        assert_eq!(criteria.text, "grid");
        assert_eq!(criteria.tag, "css");
        assert_eq!(criteria.post_type, TypeFilter::Only(PostType::Article));
        assert_eq!(criteria.date, None);
    }

    #[test]
    fn bad_filter_values_are_errors() {
        let filters = FilterArgs {
            post_type: "poll".into(),
            ..FilterArgs::default()
        };
        assert!(filters.to_criteria().is_err());

        let filters = FilterArgs {
            date: Some("14/03/2024".into()),
            ..FilterArgs::default()
        };
        assert!(filters.to_criteria().is_err());
    }

    #[test]
    fn default_filters_select_everything() {
        assert!(FilterArgs::default().to_criteria().unwrap().is_empty());
    }

    #[test]
    fn parses_create() {
        let cli = Cli::try_parse_from([
            "postfeed",
            "create",
            "--title",
            "Grid",
            "--type",
            "question",
            "--tags",
            "css, grid",
            "--language",
            "css",
            "--file",
            "a.css",
            "--file",
            "b.md",
        ])
        .unwrap();
        let Some(Commands::Create(args)) = cli.command else {
            panic!("expected create");
        };
        let draft = args.into_draft().unwrap();
        assert_eq!(draft.post_type, PostType::Question);
        assert_eq!(draft.language, Some(Language::Css));
        assert_eq!(draft.files.len(), 2);
        assert_eq!(draft.tags, "css, grid");
    }

    #[test]
    fn delete_requires_an_id() {
        assert!(Cli::try_parse_from(["postfeed", "delete"]).is_err());
        let cli = Cli::try_parse_from(["postfeed", "rm", "abc", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Delete { ref id, yes: true }) if id == "abc"
        ));
    }
}
