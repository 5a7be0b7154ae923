//! - `run()`: main dispatch logic (called by `main.rs`)
//! - `init_context()`: builds `AppContext` with the API over the data directory
//! - `handle_*()`: per-command handlers that call the API and print the result

use super::print::{print_full_post, print_messages, print_posts, print_stats};
use super::setup::{Cli, Commands, CreateArgs, FilterArgs};
use clap::Parser;
use console::Term;
use directories::ProjectDirs;
use postfeed::api::FeedApi;
use postfeed::commands::config::ConfigAction;
use postfeed::config::FeedConfig;
use postfeed::error::{FeedError, Result};
use postfeed::session::Phase;
use postfeed::store::fs::FileStore;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Overrides the data directory (store files and `config.json`).
pub const DATA_DIR_ENV: &str = "POSTFEED_DATA";

struct AppContext {
    api: FeedApi<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    postfeed::init_logger(cli.verbose);

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List { filters }) => handle_list(&mut ctx, filters),
        Some(Commands::Show { id }) => handle_show(&mut ctx, id),
        Some(Commands::Watch { filters, once }) => handle_watch(&mut ctx, filters, once),
        Some(Commands::Delete { id, yes }) => handle_delete(&mut ctx, id, yes),
        Some(Commands::Create(args)) => handle_create(&mut ctx, args),
        Some(Commands::Seed) => handle_seed(&mut ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&mut ctx, FilterArgs::default()),
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "postfeed", "postfeed")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| FeedError::Store("could not determine a data directory".into()))
}

fn init_context() -> Result<AppContext> {
    let dir = data_dir()?;
    log::debug!("using data directory {}", dir.display());
    let api = FeedApi::new(FileStore::new(dir.clone()), dir)?;
    Ok(AppContext { api })
}

fn handle_list(ctx: &mut AppContext, filters: FilterArgs) -> Result<()> {
    let criteria = filters.to_criteria()?;
    let result = ctx.api.list_posts(criteria)?;
    if let Some(stats) = &result.stats {
        print_stats(stats);
    }
    print_posts(&result.listed_posts);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &mut AppContext, id: String) -> Result<()> {
    let result = ctx.api.show_post(&id)?;
    for post in &result.listed_posts {
        print_full_post(post);
    }
    Ok(())
}

fn handle_watch(ctx: &mut AppContext, filters: FilterArgs, once: bool) -> Result<()> {
    let criteria = filters.to_criteria()?;
    let interval = Duration::from_millis(ctx.api.settings().watch_interval_ms);
    let term = Term::stdout();

    let mut session = ctx.api.open_session()?;
    session.set_criteria(criteria);

    loop {
        let delivered = session.poll()?;
        let notices = session.take_notices();

        if session.phase() == Phase::Error {
            return Err(FeedError::Subscription(
                session.last_error().unwrap_or_default(),
            ));
        }
        print_messages(&notices);

        if delivered > 0 && session.phase() == Phase::Live {
            if term.is_term() && !once {
                let _ = term.clear_screen();
            }
            let view = session.view();
            print_stats(&view.stats);
            print_posts(&view.filtered);
            if once {
                break;
            }
        }
        thread::sleep(interval);
    }

    session.close();
    Ok(())
}

fn confirm_on_terminal(prompt: &str) -> bool {
    let term = Term::stderr();
    if term.write_str(&format!("{} [y/N] ", prompt)).is_err() {
        return false;
    }
    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn handle_delete(ctx: &mut AppContext, id: String, yes: bool) -> Result<()> {
    let result = if yes {
        ctx.api.delete_post(&id, &mut |_: &str| true)?
    } else {
        ctx.api.delete_post(&id, &mut confirm_on_terminal)?
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_create(ctx: &mut AppContext, args: CreateArgs) -> Result<()> {
    let draft = args.into_draft()?;
    let result = ctx.api.create_post(draft)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_seed(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.seed()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in FeedConfig::KEYS {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}
