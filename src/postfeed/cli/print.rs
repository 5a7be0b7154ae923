use chrono::{DateTime, Local, TimeZone, Utc};
use colored::Colorize;
use postfeed::commands::{CmdMessage, MessageLevel};
use postfeed::model::{Post, PostType};
use postfeed::view::FeedStats;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const PREVIEW_CHARS: usize = 200;
const MAX_TAGS: usize = 5;
const INDENT: &str = "    ";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_stats(stats: &FeedStats) {
    println!(
        "{} posts: {} questions, {} articles. Showing {}.",
        stats.total.to_string().bold(),
        stats.questions,
        stats.articles,
        stats.filtered.to_string().bold()
    );
}

pub(super) fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts found.");
        return;
    }

    for post in posts {
        println!();
        print_post_header(post);

        let preview = description_preview(&post.description);
        if !preview.is_empty() {
            println!("{}{}", INDENT, preview);
        }

        let tags = tag_line(&post.tags);
        if !tags.is_empty() {
            println!("{}{}", INDENT, tags.blue());
        }

        println!(
            "{}{}",
            INDENT,
            format!(
                "{} · {} · {}",
                post.author,
                format_date(post.created_at),
                post.id
            )
            .dimmed()
        );
    }
}

fn print_post_header(post: &Post) {
    let marker = type_marker(post.post_type);
    let marker_width = marker.width() + 1;
    let available = LINE_WIDTH.saturating_sub(marker_width + TIME_WIDTH);

    let title = truncate_to_width(&post.title, available);
    let padding = available.saturating_sub(title.width());

    let marker = match post.post_type {
        PostType::Question => marker.blue(),
        PostType::Article => marker.green(),
    };
    println!(
        "{} {}{}{}",
        marker,
        title.bold(),
        " ".repeat(padding),
        format_time_ago(post.created_at).dimmed()
    );
}

/// Prints everything about one post: the expanded view.
pub(super) fn print_full_post(post: &Post) {
    print_post_header(post);
    println!(
        "{}",
        format!(
            "{} · {} · {} · {}",
            post.post_type,
            post.author,
            format_date(post.created_at),
            post.id
        )
        .dimmed()
    );

    if let Some(abstract_text) = post.abstract_text.as_deref().filter(|a| !a.is_empty()) {
        println!();
        println!("{}", abstract_text.italic());
    }

    println!();
    if post.description.is_empty() {
        println!("{}", "No description.".dimmed());
    } else {
        println!("{}", post.description);
    }

    if !post.tags.is_empty() {
        println!();
        println!("{} {}", format!("Tags ({}):", post.tags.len()).bold(), post.tags.join(", "));
    }

    if let Some(code) = &post.code {
        let language = post.language.unwrap_or_default();
        println!();
        println!("{}", format!("Code ({}):", language).bold());
        println!("{}", "--------------------------------".dimmed());
        println!("{}", code);
        println!("{}", "--------------------------------".dimmed());
    }

    if !post.attachments.is_empty() {
        println!();
        println!("{}", "Attachments:".bold());
        for attachment in &post.attachments {
            println!(
                "{}{} {}",
                INDENT,
                attachment.name,
                format!("({}, {})", format_size(attachment.size), attachment.mime_type).dimmed()
            );
        }
    }
}

fn type_marker(post_type: PostType) -> &'static str {
    match post_type {
        PostType::Question => "[Q]",
        PostType::Article => "[A]",
    }
}

/// First 200 characters of the description, with `...` when cut.
fn description_preview(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars
        .by_ref()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Up to five `#tags`, then `+N more`.
fn tag_line(tags: &[String]) -> String {
    let mut parts: Vec<String> = tags
        .iter()
        .take(MAX_TAGS)
        .map(|tag| format!("#{}", tag))
        .collect();
    if tags.len() > MAX_TAGS {
        parts.push(format!("+{} more", tags.len() - MAX_TAGS));
    }
    parts.join(" ")
}

fn format_date(timestamp: DateTime<Utc>) -> String {
    format_date_in(timestamp, &Local)
}

fn format_date_in<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%-d %b %Y, %H:%M")
        .to_string()
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
