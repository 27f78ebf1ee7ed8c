use crate::client::RateLimitedClient;
use crate::convert::repository_from_api;
use crate::progress::{CollectProgress, ProgressCallback, emit};
use crate::record::RepositoryRecord;

use super::{PAGE_SIZE, failure_reason};

/// Lists the repositories owned by one user.
pub struct RepositoryCollector<'a> {
    client: &'a RateLimitedClient,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a> RepositoryCollector<'a> {
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

    /// Collect every repository listed for `login`.
    ///
    /// A page with fewer than [`PAGE_SIZE`] entries is the last one, so a
    /// listing of 237 repositories takes exactly three requests. A failed
    /// page ends the listing and keeps the repositories gathered before it.
    pub async fn collect(&self, login: &str) -> Vec<RepositoryRecord> {
        let path = format!("/users/{login}/repos");
        let per_page = PAGE_SIZE.to_string();
        let mut repos: Vec<RepositoryRecord> = Vec::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let result = self
                .client
                .get(
                    &path,
                    &[
                        ("per_page", per_page.as_str()),
                        ("page", page_param.as_str()),
                    ],
                )
                .await;

            let response = match result {
                Ok(response) if response.is_ok() => response,
                failed => {
                    let reason = failure_reason(&failed);
                    tracing::debug!(login = %login, page, reason = %reason, "Repository listing failed");
                    emit(
                        self.on_progress,
                        CollectProgress::Warning {
                            message: format!("repositories of {login}, page {page}: {reason}"),
                        },
                    );
                    break;
                }
            };

            let Some(items) = response.body.as_array() else {
                tracing::debug!(login = %login, page, "Repository listing is not an array");
                emit(
                    self.on_progress,
                    CollectProgress::Warning {
                        message: format!("repositories of {login}, page {page}: unexpected body"),
                    },
                );
                break;
            };

            repos.extend(items.iter().map(|repo| repository_from_api(login, repo)));
            emit(
                self.on_progress,
                CollectProgress::FetchedRepoPage {
                    login: login.to_string(),
                    page,
                    count: items.len(),
                },
            );

            if items.len() < PAGE_SIZE {
                tracing::debug!(login = %login, page, count = items.len(), "Last repository page");
                break;
            }
            page += 1;
        }

        tracing::debug!(login = %login, total = repos.len(), "Repositories collected");
        emit(
            self.on_progress,
            CollectProgress::ReposComplete {
                login: login.to_string(),
                total: repos.len(),
            },
        );
        repos
    }
}
