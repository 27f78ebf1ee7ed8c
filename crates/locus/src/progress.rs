//! Progress events emitted while collecting.
//!
//! The library never renders progress itself; callers pass an optional
//! [`ProgressCallback`] and decide how to display each event.

use std::path::PathBuf;

/// Progress events emitted by the collectors and the pipeline.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CollectProgress {
    /// Starting the user search.
    SearchingUsers {
        /// The search query sent to the API.
        query: String,
    },

    /// Processed one page of search results.
    FetchedUserPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of items on the page.
        count: usize,
        /// Users collected so far.
        total_so_far: usize,
    },

    /// A user's profile was collected.
    UserCollected { login: String },

    /// A user's profile lookup failed; the user is left out.
    UserSkipped { login: String, reason: String },

    /// The user search ended.
    UsersComplete { total: usize },

    /// Starting to list one user's repositories.
    FetchingRepos {
        login: String,
        /// Position of this user in the run (1-indexed).
        index: usize,
        /// Number of users in the run.
        of: usize,
    },

    /// Fetched one page of a user's repositories.
    FetchedRepoPage {
        login: String,
        page: u32,
        count: usize,
    },

    /// Finished listing one user's repositories.
    ReposComplete { login: String, total: usize },

    /// A table was written to disk.
    TableWritten { path: PathBuf, rows: usize },

    /// A recoverable problem (failed page, malformed item).
    Warning { message: String },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(CollectProgress) + Send + Sync>;

/// Helper to emit progress events if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: CollectProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
