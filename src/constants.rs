//! Global constants used throughout the vndr codebase.
//!
//! File names, concurrency limits and retry parameters shared by several
//! modules live here so the numbers that shape a run are easy to find.

use std::time::Duration;

/// Name of the vendor directory, relative to the project root.
pub const VENDOR_DIR: &str = "vendor";

/// Name of the declared-dependency file, relative to the project root.
pub const CONFIG_FILE: &str = "vendor.conf";

/// Suffix appended to [`CONFIG_FILE`] for the suggested-fix file written when
/// validation finds misrooted or conflicting entries.
pub const SUGGESTION_SUFFIX: &str = ".tmp";

/// Maximum number of fetch operations running at the same time.
///
/// A worker keeps its slot for its whole retry sequence, so a dependency that
/// keeps failing occupies one slot for up to
/// `FETCH_ATTEMPTS * FETCH_RETRY_DELAY`.
pub const MAX_CONCURRENT_FETCHES: usize = 16;

/// Number of times a single dependency fetch is attempted before giving up.
pub const FETCH_ATTEMPTS: usize = 20;

/// Fixed pause between two attempts of the same dependency fetch.
pub const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Timeout for the `?go-get=1` HTTP lookup used to discover repository roots
/// of import paths on unknown hosts.
pub const GO_IMPORT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single Git invocation (clone, checkout, rev-parse).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);
