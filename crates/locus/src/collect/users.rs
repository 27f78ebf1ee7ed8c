use serde_json::Value;

use crate::client::RateLimitedClient;
use crate::convert::user_from_profile;
use crate::progress::{CollectProgress, ProgressCallback, emit};
use crate::record::UserRecord;

use super::{PAGE_SIZE, failure_reason};

/// Build the search query for users in `location` with more than
/// `min_followers` followers.
///
/// A location containing whitespace is quoted so the search treats it as one
/// term.
pub fn search_query(location: &str, min_followers: u64) -> String {
    let location = location.trim();
    if location.chars().any(char::is_whitespace) {
        format!("location:\"{location}\" followers:>{min_followers}")
    } else {
        format!("location:{location} followers:>{min_followers}")
    }
}

/// Collects user profiles from the user search endpoint.
pub struct UserCollector<'a> {
    client: &'a RateLimitedClient,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a> UserCollector<'a> {
    pub fn new(client: &'a RateLimitedClient) -> Self {
        Self {
            client,
            on_progress: None,
        }
    }

    /// Report progress through `on_progress`.
    pub fn with_progress(mut self, on_progress: Option<&'a ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Collect every user matching `location` with more than `min_followers`.
    ///
    /// Pages are requested from 1 upward until a page comes back with no
    /// items. A failed search page ends the search and whatever was gathered
    /// so far is returned. A failed profile lookup only drops that user.
    /// Logins are not de-duplicated.
    pub async fn collect(&self, location: &str, min_followers: u64) -> Vec<UserRecord> {
        let query = search_query(location, min_followers);
        let per_page = PAGE_SIZE.to_string();
        let mut users: Vec<UserRecord> = Vec::new();
        let mut page = 1u32;

        tracing::debug!(query = %query, "Searching users");
        emit(
            self.on_progress,
            CollectProgress::SearchingUsers {
                query: query.clone(),
            },
        );

        loop {
            let page_param = page.to_string();
            let result = self
                .client
                .get(
                    "/search/users",
                    &[
                        ("q", query.as_str()),
                        ("per_page", per_page.as_str()),
                        ("page", page_param.as_str()),
                    ],
                )
                .await;

            let response = match result {
                Ok(response) if response.is_ok() => response,
                failed => {
                    let reason = failure_reason(&failed);
                    tracing::debug!(page, reason = %reason, "User search failed, ending search");
                    emit(
                        self.on_progress,
                        CollectProgress::Warning {
                            message: format!("user search page {page} failed: {reason}"),
                        },
                    );
                    break;
                }
            };

            let items = match response.body.get("items").and_then(Value::as_array) {
                Some(items) if !items.is_empty() => items,
                _ => {
                    tracing::debug!(page, "Empty search page, no more users");
                    break;
                }
            };

            for item in items {
                let Some(login) = item.get("login").and_then(Value::as_str) else {
                    tracing::debug!(page, "Search item without a login, skipping");
                    emit(
                        self.on_progress,
                        CollectProgress::Warning {
                            message: format!("search page {page} has an item without a login"),
                        },
                    );
                    continue;
                };

                match self.fetch_profile(login).await {
                    Ok(user) => {
                        tracing::debug!(login = %user.login, "User fetched");
                        emit(
                            self.on_progress,
                            CollectProgress::UserCollected {
                                login: user.login.clone(),
                            },
                        );
                        users.push(user);
                    }
                    Err(reason) => {
                        tracing::debug!(login = %login, reason = %reason, "Skipping user");
                        emit(
                            self.on_progress,
                            CollectProgress::UserSkipped {
                                login: login.to_string(),
                                reason,
                            },
                        );
                    }
                }
            }

            tracing::debug!(page, count = items.len(), total = users.len(), "Search page processed");
            emit(
                self.on_progress,
                CollectProgress::FetchedUserPage {
                    page,
                    count: items.len(),
                    total_so_far: users.len(),
                },
            );
            page += 1;
        }

        tracing::debug!(total = users.len(), "User search complete");
        emit(
            self.on_progress,
            CollectProgress::UsersComplete { total: users.len() },
        );
        users
    }

    /// Look up the full profile of `login`.
    async fn fetch_profile(&self, login: &str) -> Result<UserRecord, String> {
        let result = self.client.get(&format!("/users/{login}"), &[]).await;
        match result {
            Ok(response) if response.is_ok() => user_from_profile(&response.body)
                .ok_or_else(|| "profile has no login".to_string()),
            failed => Err(failure_reason(&failed)),
        }
    }
}
