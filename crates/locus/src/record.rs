//! Row types for the two output tables.
//!
//! Field order is the column order of the CSV files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of `users.csv`.
pub const USER_COLUMNS: [&str; 11] = [
    "login",
    "name",
    "company",
    "location",
    "email",
    "hireable",
    "bio",
    "public_repos",
    "followers",
    "following",
    "created_at",
];

/// Column names of `repositories.csv`.
pub const REPOSITORY_COLUMNS: [&str; 9] = [
    "login",
    "full_name",
    "created_at",
    "stargazers_count",
    "watchers_count",
    "language",
    "has_projects",
    "has_wiki",
    "license_name",
];

/// One user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub name: Option<String>,
    /// Normalized company; empty when the profile has none.
    pub company: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Hireable flag with "unknown" read as `false`.
    #[inline]
    pub fn is_hireable(&self) -> bool {
        self.hireable.unwrap_or(false)
    }
}

/// One repository owned by a collected user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Login of the user whose listing produced this row.
    pub login: String,
    pub full_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    /// License short key; empty when the repository has no license.
    pub license_name: String,
}

/// Collected users in collection order.
pub type UserTable = Vec<UserRecord>;

/// Collected repositories of all users, in user collection order.
pub type RepositoryTable = Vec<RepositoryRecord>;
