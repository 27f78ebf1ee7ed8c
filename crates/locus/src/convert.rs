//! Conversion from API JSON into table rows.
//!
//! All absence handling happens here, once. Downstream code can rely on:
//! optional text is `None` rather than empty, counts default to zero,
//! `company` and `license_name` are empty strings when absent, and a
//! timestamp that cannot be parsed is `None` while the rest of the row
//! survives.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::record::{RepositoryRecord, UserRecord};

/// Normalize a company name: trim, drop leading `@` handles, upper-case.
///
/// Absent input yields an empty string. Leading `@` and whitespace are
/// stripped together so that the function is idempotent.
///
/// ```
/// use locus::normalize_company;
///
/// assert_eq!(normalize_company(Some("@Acme ")), "ACME");
/// assert_eq!(normalize_company(None), "");
/// ```
pub fn normalize_company(company: Option<&str>) -> String {
    match company {
        Some(raw) => raw
            .trim_start_matches(|c: char| c == '@' || c.is_whitespace())
            .trim_end()
            .to_uppercase(),
        None => String::new(),
    }
}

/// License short key of a repository object, or an empty string.
pub fn license_key(repo: &Value) -> String {
    repo.get("license")
        .and_then(|license| license.get("key"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

fn count(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn flag(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

/// Parse an RFC 3339 timestamp field.
///
/// A present but malformed value degrades to `None` and is logged; it never
/// discards the surrounding record.
pub fn timestamp(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = value.get(key)?;
    if raw.is_null() {
        return None;
    }
    let parsed = raw
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if parsed.is_none() {
        tracing::debug!(field = key, value = %raw, "Unparseable timestamp, storing as missing");
    }
    parsed
}

/// Build a [`UserRecord`] from a `/users/{login}` body.
///
/// Returns `None` when the body has no `login` string.
pub fn user_from_profile(profile: &Value) -> Option<UserRecord> {
    let login = profile.get("login").and_then(Value::as_str)?.to_string();

    Some(UserRecord {
        login,
        name: text(profile, "name"),
        company: normalize_company(profile.get("company").and_then(Value::as_str)),
        location: text(profile, "location"),
        email: text(profile, "email"),
        hireable: flag(profile, "hireable"),
        bio: text(profile, "bio"),
        public_repos: count(profile, "public_repos"),
        followers: count(profile, "followers"),
        following: count(profile, "following"),
        created_at: timestamp(profile, "created_at"),
    })
}

/// Build a [`RepositoryRecord`] for `login` from one repository object.
pub fn repository_from_api(login: &str, repo: &Value) -> RepositoryRecord {
    RepositoryRecord {
        login: login.to_string(),
        full_name: repo
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at: timestamp(repo, "created_at"),
        stargazers_count: count(repo, "stargazers_count"),
        watchers_count: count(repo, "watchers_count"),
        language: text(repo, "language"),
        has_projects: flag(repo, "has_projects").unwrap_or(false),
        has_wiki: flag(repo, "has_wiki").unwrap_or(false),
        license_name: license_key(repo),
    }
}
