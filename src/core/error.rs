//! Error handling for the game updater
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`UpdaterError`]) for precise handling inside the library
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for the CLI
//!
//! # Error Categories
//!
//! - **Network**: [`UpdaterError::Network`], [`UpdaterError::HttpStatus`]. A check or
//!   listing step that hits one of these stops; persisted state is never touched.
//! - **Local I/O**: [`UpdaterError::Io`], [`UpdaterError::FileOperation`],
//!   [`UpdaterError::InvalidPath`]. Per-file write failures are logged and do not stop
//!   a batch.
//! - **Data**: [`UpdaterError::Parse`] for malformed remote payloads or stored records.
//! - **Flow**: [`UpdaterError::NoPendingUpdate`] when apply is requested without a
//!   successful check.
//! - **Configuration**: [`UpdaterError::Config`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use game_updater::core::{UpdaterError, user_friendly_error};
//!
//! let err = UpdaterError::HttpStatus {
//!     operation: "fetch latest commit".to_string(),
//!     url: "https://api.github.com/repos/o/r/commits/main".to_string(),
//!     status: 403,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use crate::core::file_error::FileOperationError;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for updater operations.
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// Transport-level failure (DNS, connect, TLS, timeout, body read).
    #[error("Network error during {operation}: {reason}")]
    Network {
        /// What the updater was doing (e.g. "fetch latest commit")
        operation: String,
        /// The URL that was requested
        url: String,
        /// Underlying transport error message
        reason: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} during {operation} ({url})")]
    HttpStatus {
        /// What the updater was doing
        operation: String,
        /// The URL that was requested
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// A remote payload or stored record could not be decoded.
    #[error("Failed to parse {what}: {reason}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Decoder error message
        reason: String,
    },

    /// Apply was requested but no update is pending.
    #[error("No update is pending; run a check first")]
    NoPendingUpdate,

    /// A remote path would resolve outside the install directory.
    #[error("Refusing to write outside the install directory: {path}")]
    InvalidPath {
        /// The offending relative path
        path: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// File operation failed with captured context
    #[error(transparent)]
    FileOperation(#[from] FileOperationError),

    /// Plain I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdaterError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, rate limiting and server errors are transient;
    /// other 4xx answers are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn network(
        operation: impl Into<String>,
        url: impl Into<String>,
        source: &reqwest::Error,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            url: url.into(),
            reason: source.to_string(),
        }
    }
}

/// Error wrapper carrying a user-facing suggestion and details.
///
/// The CLI renders it with colors: error in red, details in yellow,
/// suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message shown first
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context from any displayable error.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            message: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(updater_error) = error.downcast_ref::<UpdaterError>() {
        return create_error_context(updater_error, &error);
    }

    if let Some(file_error) = error.downcast_ref::<FileOperationError>() {
        return ErrorContext::new(&error).with_details(file_error.user_message());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(&error)
            .with_suggestion("Check that the install directory is writable by the current user");
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(&error)
            .with_suggestion("Check the TOML syntax of the updater configuration file");
    }

    let mut context = ErrorContext::new(&error);
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        context = context.with_details(chain.join("\n  caused by: "));
    }
    context
}

fn create_error_context(error: &UpdaterError, full: &anyhow::Error) -> ErrorContext {
    let context = ErrorContext::new(full);
    match error {
        UpdaterError::Network { url, .. } => context
            .with_details(format!("Request to {url} did not complete"))
            .with_suggestion("Check your internet connection and try the check again"),
        UpdaterError::HttpStatus { status: 403 | 429, .. } => context
            .with_details("GitHub rejected the request, most likely because of API rate limiting")
            .with_suggestion("Wait a while or set GITHUB_TOKEN to use an authenticated rate limit"),
        UpdaterError::HttpStatus { status: 404, .. } => context
            .with_suggestion("Check the owner, repo and branch in the updater configuration"),
        UpdaterError::HttpStatus { .. } => {
            context.with_suggestion("The remote service returned an error; try again later")
        }
        UpdaterError::NoPendingUpdate => {
            context.with_suggestion("Run `game-updater check` before applying an update")
        }
        UpdaterError::Config { .. } => {
            context.with_suggestion("Fix the updater configuration file or pass --config")
        }
        UpdaterError::FileOperation(file_error) => context.with_details(file_error.user_message()),
        UpdaterError::Parse { .. } | UpdaterError::InvalidPath { .. } | UpdaterError::Io(_) => {
            context
        }
    }
}
