//! Global constants used throughout the updater.
//!
//! Timeouts, retry parameters, file names and defaults that are used by
//! more than one module live here so magic numbers stay discoverable.

use std::time::Duration;

/// File name of the version record inside the install directory.
pub const VERSION_FILE_NAME: &str = "version.json";

/// Key under which the version record lives in a keyed store.
pub const VERSION_STORE_KEY: &str = "gameVersion";

/// Semantic version written into a freshly created version record.
pub const DEFAULT_SEMANTIC_VERSION: &str = "1.0.0";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default base URL for raw file content.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Default repository owner.
pub const DEFAULT_OWNER: &str = "snirsnir";

/// Default repository name.
pub const DEFAULT_REPO: &str = "dave";

/// Default branch tracked for updates.
pub const DEFAULT_BRANCH: &str = "main";

/// User agent sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("game-updater/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to each HTTP request (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of retries for transient API failures.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Exponential base for retry backoff. Combined with [`RETRY_BACKOFF_FACTOR`]
/// the delays are 200ms, 400ms, 800ms and so on.
pub const RETRY_BACKOFF_BASE_MS: u64 = 2;

/// Multiplier applied to each backoff step.
pub const RETRY_BACKOFF_FACTOR: u64 = 100;

/// Maximum backoff delay between retries (2 seconds).
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

/// Pause after completion before the restart countdown is announced.
pub const COMPLETION_PAUSE: Duration = Duration::from_secs(2);

/// Default delay between the restart announcement and the restart itself.
pub const DEFAULT_RESTART_DELAY_SECS: u64 = 3;

/// Number of characters of a revision id shown to users.
pub const SHORT_REVISION_LEN: usize = 8;
