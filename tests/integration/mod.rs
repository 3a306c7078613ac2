//! Integration test suite for game-updater
//!
//! End-to-end tests against a local `wiremock` server standing in for the
//! GitHub API and the raw content host.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: mock GitHub server and configuration helpers
//! - **remote_contract**: request format and response handling of `GitHubClient`
//! - **update_flow**: check/apply against the mock with real files on disk
//! - **cli**: the `game-updater` binary
//! - **config_env**: configuration resolution through environment variables

mod common;

mod cli;
mod config_env;
mod remote_contract;
mod update_flow;
