//! # CLI Behavior
//!
//! This is **one possible UI client** for postfeed, not the application itself.
//! The CLI is the only place that knows about terminal I/O, prompts, exit codes and
//! output formatting. For the overall architecture, see the crate-level documentation.
//!
//! ### Naked Execution (`postfeed`)
//!
//! Running `postfeed` with no arguments defaults to `postfeed list`.
//!
//! ### Watching
//!
//! `postfeed watch` is the long-lived client: it keeps one session subscribed and
//! redraws the filtered list every time the store pushes a snapshot. Changes made by
//! another `postfeed` process (a `create` or `delete`) show up on the next poll.
//!
//! ### Deleting
//!
//! `postfeed delete <id>` asks for confirmation on the terminal. `--yes` skips the
//! prompt. When stdin is not a terminal and `--yes` is missing, the delete is cancelled.
//!
//! ## Module Structure
//!
//! - `commands`: per-command handlers that call the API and print the result
//! - `print`: output formatting (colors, previews, dates)
//! - `setup`: argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;
