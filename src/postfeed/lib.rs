//! # Postfeed Architecture
//!
//! Postfeed is a **live feed library** for a collection of developer posts (questions and
//! articles). It keeps a client-side view of the collection in sync with a document store,
//! filters it, and dispatches mutations back. The `postfeed` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, formats output                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and sessions                   │
//! │  - Resolves id prefixes, applies configuration              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command + Session Layer (commands/*.rs, session.rs)        │
//! │  - Live view state machine, filtering, mutations            │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DocumentStore trait with live subscriptions              │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! The store pushes the whole ordered collection on every change. A
//! [`session::FeedSession`] keeps that raw list as-is and derives what is shown from it
//! and the current [`filter::FilterCriteria`] ([`view::derive_view`]). Deleting a post
//! never edits the local list: the post disappears when the next snapshot arrives.
//!
//! Nothing here is threaded. Store callbacks run inside `poll`, on the caller's thread.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`session`]: One live view of the feed (subscription, raw list, criteria, expansion)
//! - [`commands`]: Business logic for each command
//! - [`store`]: Document store abstraction and implementations
//! - [`filter`]: The filter predicate
//! - [`view`]: Derived view and stats, with memoization
//! - [`model`]: Core data types (`Post`, `PostType`, `Language`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod session;
pub mod store;
pub mod view;

use std::io::Write;

/// Sets up `env_logger`. `RUST_LOG` takes precedence; otherwise `verbose` selects
/// `debug` for this crate and everything else stays at `warn`.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "warn,postfeed=debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();
}
