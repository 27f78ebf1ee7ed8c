//! Integration tests for a full collection run.
//!
//! A scripted transport stands in for the API so the run can be checked
//! end to end: requests issued, CSV files written, and the report computed
//! from the files read back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use locus::http::{HttpRequest, HttpResponse};
use locus::table::{self, REPOSITORIES_FILE, USERS_FILE};
use locus::{
    ClientOptions, HttpError, HttpTransport, Pipeline, PipelineOptions, RateLimitedClient, Report,
    RetryConfig,
};
use serde_json::{Value, json};

const API: &str = "https://forge.example";

/// Answers each URL with a fixed JSON body and records what was asked.
#[derive(Default)]
struct ScriptedApi {
    routes: HashMap<String, (u16, Value)>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn route(mut self, path: &str, status: u16, body: Value) -> Self {
        self.routes.insert(format!("{API}{path}"), (status, body));
        self
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedApi {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.seen.lock().unwrap().push(request.url.clone());
        let (status, body) = self
            .routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| HttpError::Transport(format!("no route for {}", request.url)))?;
        Ok(HttpResponse {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        })
    }
}

fn client(api: Arc<ScriptedApi>) -> RateLimitedClient {
    let options = ClientOptions {
        api_url: API.to_string(),
        request_delay: Duration::from_millis(250),
        timeout: Duration::from_secs(5),
        retry: RetryConfig::new(Duration::from_millis(1), Duration::from_millis(1), 0),
    };
    RateLimitedClient::new_with_transport("token", options, api)
}

fn search(page: u32) -> String {
    format!("/search/users?q=location%3A%22New+York%22+followers%3A%3E50&per_page=100&page={page}")
}

fn scripted_run() -> ScriptedApi {
    ScriptedApi::default()
        .route("/user", 200, json!({"login": "me"}))
        .route(
            &search(1),
            200,
            json!({"items": [{"login": "grace"}, {"login": "linus"}, {"login": "gone"}]}),
        )
        .route(&search(2), 200, json!({"items": []}))
        .route(
            "/users/grace",
            200,
            json!({
                "login": "grace",
                "name": "Grace Hopper",
                "company": " @Navy ",
                "hireable": true,
                "email": "grace@example.com",
                "bio": "compilers, \"bugs\", and COBOL",
                "public_repos": 2,
                "followers": 900,
                "following": 2,
                "created_at": "2009-12-09T10:00:00Z"
            }),
        )
        .route(
            "/users/linus",
            200,
            json!({
                "login": "linus",
                "name": "Linus Torvalds",
                "company": "Linux Foundation",
                "hireable": null,
                "public_repos": 7,
                "followers": 200000,
                "following": 0,
                "created_at": "2011-09-03T15:26:22Z"
            }),
        )
        .route("/users/gone", 404, json!({"message": "Not Found"}))
        .route(
            "/users/grace/repos?per_page=100&page=1",
            200,
            json!([
                {
                    "full_name": "grace/flow-matic",
                    "created_at": "2020-02-01T09:00:00Z",
                    "stargazers_count": 12,
                    "watchers_count": 12,
                    "language": "COBOL",
                    "has_projects": true,
                    "has_wiki": true,
                    "license": {"key": "mit", "name": "MIT License"}
                }
            ]),
        )
        .route(
            "/users/linus/repos?per_page=100&page=1",
            200,
            json!([
                {
                    "full_name": "linus/linux",
                    "created_at": "2011-09-04T22:48:12Z",
                    "stargazers_count": 170000,
                    "watchers_count": 170000,
                    "language": "C",
                    "has_projects": true,
                    "has_wiki": false,
                    "license": {"key": "other"}
                },
                {
                    "full_name": "linus/subsurface",
                    "created_at": "not a date",
                    "stargazers_count": 10,
                    "language": "C++",
                    "license": null
                }
            ]),
        )
}

#[tokio::test(start_paused = true)]
async fn collect_run_writes_tables_that_feed_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(scripted_run());
    let client = client(Arc::clone(&api));
    let options = PipelineOptions {
        location: "New York".to_string(),
        min_followers: 50,
        output_dir: dir.path().to_path_buf(),
        verify_credentials: true,
    };

    let (users, repos) = Pipeline::new(&client, options).run().await.unwrap();

    let logins: Vec<_> = users.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["grace", "linus"]);
    assert_eq!(users[0].company, "NAVY");
    assert_eq!(users[1].company, "LINUX FOUNDATION");
    assert_eq!(repos.len(), 3);
    assert_eq!(repos[2].created_at, None);
    assert_eq!(repos[2].license_name, "");

    let seen = api.seen();
    assert_eq!(seen.first().map(String::as_str), Some("https://forge.example/user"));
    assert_eq!(seen.len(), 8);

    let users_back = table::read_users(&dir.path().join(USERS_FILE)).unwrap();
    let repos_back = table::read_repositories(&dir.path().join(REPOSITORIES_FILE)).unwrap();
    assert_eq!(users_back, users);
    assert_eq!(repos_back, repos);

    let report = Report::build(&users_back, &repos_back);
    assert_eq!(report.top_followed, vec!["linus", "grace"]);
    assert_eq!(report.earliest_registered, vec!["grace", "linus"]);
    assert_eq!(report.top_licenses, vec!["mit", "other"]);
    assert_eq!(report.top_language.as_deref(), Some("COBOL"));
    assert_eq!(report.common_surnames, vec!["Hopper", "Torvalds"]);
    assert_eq!(report.hireable_email_share_difference, Some(1.0));
}

#[tokio::test(start_paused = true)]
async fn rejected_token_leaves_no_tables_behind() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(ScriptedApi::default().route(
        "/user",
        401,
        json!({"message": "Bad credentials"}),
    ));
    let client = client(Arc::clone(&api));
    let options = PipelineOptions {
        output_dir: dir.path().join("out"),
        ..PipelineOptions::default()
    };

    let err = Pipeline::new(&client, options).run().await.unwrap_err();

    assert!(matches!(
        err,
        locus::PipelineError::Credentials { status: 401 }
    ));
    assert_eq!(api.seen().len(), 1);
    assert!(!dir.path().join("out").exists());
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_the_configured_delay() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        ScriptedApi::default()
            .route(
                "/search/users?q=location%3ABerlin+followers%3A%3E100&per_page=100&page=1",
                200,
                json!({"items": []}),
            ),
    );
    let client = client(Arc::clone(&api));
    let options = PipelineOptions {
        location: "Berlin".to_string(),
        output_dir: dir.path().to_path_buf(),
        verify_credentials: false,
        ..PipelineOptions::default()
    };

    let start = tokio::time::Instant::now();
    Pipeline::new(&client, options).run().await.unwrap();

    assert_eq!(api.seen().len(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}
