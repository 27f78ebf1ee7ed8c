//! Collectors for the two entity types.
//!
//! - [`UserCollector`] pages through the user search and looks up every hit.
//! - [`RepositoryCollector`] pages through one user's repository listing.
//!
//! The two collectors deliberately end pagination under different rules:
//! the user search stops only on an empty page, while the repository listing
//! also stops on a short page.

mod repositories;
mod users;

use crate::client::{ApiError, ApiResponse};

pub use repositories::RepositoryCollector;
pub use users::{UserCollector, search_query};

/// Page size requested from every paginated endpoint.
pub const PAGE_SIZE: usize = 100;

/// Describe a failed request for logs and progress events.
fn failure_reason(result: &Result<ApiResponse, ApiError>) -> String {
    match result {
        Ok(response) => match response.message() {
            Some(message) => format!("HTTP {}: {}", response.status, message),
            None => format!("HTTP {}", response.status),
        },
        Err(e) => short_error_message(e),
    }
}

/// First line of an error message.
///
/// Transport errors from reqwest can span several lines; logs and progress
/// events only need the first.
fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}
