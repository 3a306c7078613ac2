//! game-updater - keep a game install in sync with its GitHub repository
//!
//! The game's files live in a GitHub repository. The updater remembers which
//! revision is installed, asks GitHub for the head of the tracked branch, and
//! when the two differ (and the user agrees) downloads every file of the new
//! revision into the install directory, skipping the host's own files.
//!
//! # Architecture Overview
//!
//! - A small JSON version record (`version.json`) stores the installed revision
//! - [`update::UpdateOrchestrator`] runs the check -> confirm -> apply state machine
//! - Collaborators are injected: the remote ([`update::RemoteRepository`]), the
//!   record's storage ([`update::PersistentStore`]) and the file destination
//!   ([`update::FileWriter`])
//! - [`config::HostMode`] picks those collaborators once: `native` writes files,
//!   `sandboxed` keeps state in a keyed store and only logs files
//!
//! # Core Modules
//!
//! - [`cli`] - `check`, `apply` and `status` subcommands
//! - [`config`] - `~/.game-updater/config.toml`
//! - [`constants`] - defaults, timeouts and well-known names
//! - [`core`] - error types and user-facing error formatting
//! - [`update`] - the update engine
//! - [`utils`] - atomic file writes, JSON I/O and progress bars
//!
//! # Command-Line Usage
//!
//! ```bash
//! game-updater check              # Is a newer revision available?
//! game-updater apply              # Check, confirm, download and restart
//! game-updater apply --yes        # Same, without the prompt
//! game-updater status             # Show the installed revision
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # ~/.game-updater/config.toml
//! owner = "snirsnir"
//! repo = "dave"
//! branch = "main"
//! install_dir = "~/Games/dave"
//! launch_command = ["~/Games/dave/dave"]
//! ```
//!
//! `GITHUB_TOKEN` is sent to the API when set, which raises the rate limit.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod update;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
